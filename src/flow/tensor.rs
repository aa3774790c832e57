use serde::{Deserialize, Serialize};

use crate::{
    color::lab::{LabRaster, to_lab},
    filters::{gaussian::blur_plane, sobel::sobel5},
    foundation::{
        error::{PainterlyError, PainterlyResult},
        raster::{FloatRaster, Raster},
    },
};

/// Parameters of the structure-tensor flow estimator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowParams {
    /// Gaussian sigma used to aggregate the tensor products.
    pub tensor_sigma: f32,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self { tensor_sigma: 2.0 }
    }
}

impl FlowParams {
    /// Reject non-finite or negative sigmas.
    pub fn validate(&self) -> PainterlyResult<()> {
        if !self.tensor_sigma.is_finite() || self.tensor_sigma < 0.0 {
            return Err(PainterlyError::validation(
                "tensor_sigma must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// One symmetric 2x2 tensor `[[xx, xy], [xy, yy]]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tensor2 {
    /// Smoothed `Ix * Ix`.
    pub xx: f32,
    /// Smoothed `Ix * Iy`.
    pub xy: f32,
    /// Smoothed `Iy * Iy`.
    pub yy: f32,
}

impl Tensor2 {
    /// Eigenvalues in ascending order `(minor, major)`.
    pub fn eigenvalues(self) -> (f64, f64) {
        let (a, b, c) = (f64::from(self.xx), f64::from(self.xy), f64::from(self.yy));
        let mean = 0.5 * (a + c);
        let disc = (0.25 * (a - c) * (a - c) + b * b).sqrt();
        (mean - disc, mean + disc)
    }

    /// Eigenvalue gap `sqrt((xx - yy)^2 + 4 xy^2)`; zero for isotropic structure.
    pub fn edge_weight(self) -> f32 {
        let d = self.xx - self.yy;
        (d * d + 4.0 * self.xy * self.xy).sqrt()
    }
}

/// Gaussian-smoothed gradient products of the Lab lightness channel.
#[derive(Clone, Debug)]
pub struct StructureTensorField {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    jxx: FloatRaster,
    jxy: FloatRaster,
    jyy: FloatRaster,
}

impl StructureTensorField {
    /// Build the tensor field of an 8-bit raster.
    pub fn compute(raster: &Raster, params: &FlowParams) -> PainterlyResult<Self> {
        Self::from_lab(&to_lab(raster), params)
    }

    /// Build the tensor field from an existing Lab conversion.
    pub fn from_lab(lab: &LabRaster, params: &FlowParams) -> PainterlyResult<Self> {
        params.validate()?;
        let l = FloatRaster::from_raw(lab.width, lab.height, lab.lightness())?;
        let grad = sobel5(&l)?;

        let products = |f: fn(f32, f32) -> f32| -> PainterlyResult<FloatRaster> {
            let data = grad
                .gx
                .data
                .iter()
                .zip(&grad.gy.data)
                .map(|(&dx, &dy)| f(dx, dy))
                .collect();
            blur_plane(
                &FloatRaster::from_raw(lab.width, lab.height, data)?,
                params.tensor_sigma,
            )
        };

        Ok(Self {
            width: lab.width,
            height: lab.height,
            jxx: products(|dx, _| dx * dx)?,
            jxy: products(|dx, dy| dx * dy)?,
            jyy: products(|_, dy| dy * dy)?,
        })
    }

    /// Tensor at `(x, y)`.
    #[inline]
    pub fn at(&self, x: u32, y: u32) -> Tensor2 {
        Tensor2 {
            xx: self.jxx.get(x, y),
            xy: self.jxy.get(x, y),
            yy: self.jyy.get(x, y),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/flow/tensor.rs"]
mod tests;
