//! Flow-aligned anisotropic blur and the relief (height / normal map) path.
//!
//! The blur kernel is laid out in each pixel's tangent/normal frame rather
//! than along image axes, so lightness is smeared along the local flow. The
//! result is normalized by its own maximum and read as a height field.

use kurbo::{Point, Vec2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    color::lab::LabRaster,
    filters::{gaussian::kernel_radius, sobel::sobel3},
    flow::field::FlowField,
    foundation::{
        error::{PainterlyError, PainterlyResult},
        math::{EPSILON, round_to_u8},
        raster::{FloatRaster, PixelLayout, Raster},
    },
};

/// Parameters of the directional blur and normal-map derivation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliefParams {
    /// Gaussian sigma along the tangent.
    pub sigma_t: f32,
    /// Gaussian sigma along the normal.
    pub sigma_n: f32,
    /// Height-to-slope multiplier used by [`normal_map`].
    pub normal_strength: f32,
}

impl Default for ReliefParams {
    fn default() -> Self {
        Self {
            sigma_t: 4.0,
            sigma_n: 1.0,
            normal_strength: 1.0,
        }
    }
}

impl ReliefParams {
    /// Both sigmas must be finite and positive.
    pub fn validate(&self) -> PainterlyResult<()> {
        for (name, v) in [("sigma_t", self.sigma_t), ("sigma_n", self.sigma_n)] {
            if !v.is_finite() || v <= 0.0 {
                return Err(PainterlyError::validation(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        if !self.normal_strength.is_finite() {
            return Err(PainterlyError::validation("normal_strength must be finite"));
        }
        Ok(())
    }
}

struct OrientedTap {
    along: f64,
    across: f64,
    weight: f32,
}

fn oriented_taps(sigma_t: f32, sigma_n: f32) -> Vec<OrientedTap> {
    let rt = kernel_radius(sigma_t) as i32;
    let rn = kernel_radius(sigma_n) as i32;
    let (st2, sn2) = (sigma_t * sigma_t, sigma_n * sigma_n);
    let mut taps = Vec::with_capacity(((2 * rt + 1) * (2 * rn + 1)) as usize);
    for i in -rt..=rt {
        for j in -rn..=rn {
            let (fi, fj) = (i as f32, j as f32);
            taps.push(OrientedTap {
                along: f64::from(i),
                across: f64::from(j),
                weight: (-0.5 * (fi * fi / st2 + fj * fj / sn2)).exp(),
            });
        }
    }
    taps
}

/// Blur Lab lightness along the flow and normalize the result by its maximum.
#[tracing::instrument(skip_all, fields(w = lab.width, h = lab.height))]
pub fn blur_along_flow(
    lab: &LabRaster,
    flow: &FlowField,
    params: &ReliefParams,
) -> PainterlyResult<FloatRaster> {
    params.validate()?;
    if lab.width != flow.width || lab.height != flow.height {
        return Err(PainterlyError::validation(format!(
            "flow field is {}x{}, image is {}x{}",
            flow.width, flow.height, lab.width, lab.height
        )));
    }

    let lightness = FloatRaster::from_raw(lab.width, lab.height, lab.lightness())?;
    let taps = oriented_taps(params.sigma_t, params.sigma_n);
    let w = lab.width as usize;
    let mut out = FloatRaster::new(lab.width, lab.height)?;
    if w > 0 {
        out.data.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
            for (x, dst) in row.iter_mut().enumerate() {
                let s = flow.sample(x as u32, y as u32);
                let t = s.tangent;
                let n = Vec2::new(-t.y, t.x);
                let p = Point::new(x as f64, y as f64);
                let mut acc = 0.0f32;
                for tap in &taps {
                    let q = p + t * tap.along + n * tap.across;
                    acc += tap.weight * lightness.get_clamped(q.x.floor() as i64, q.y.floor() as i64);
                }
                *dst = acc;
            }
        });
    }
    Ok(out.normalized_by_max())
}

/// Encode unit surface normals of a height field as RGB (`n * 0.5 + 0.5`).
pub fn normal_map(height: &FloatRaster, strength: f32) -> PainterlyResult<Raster> {
    let grad = sobel3(height)?;
    let mut out = Raster::new(height.width, height.height, PixelLayout::Rgb8)?;
    let scale = strength / 8.0;
    for (i, px) in out.data.chunks_exact_mut(3).enumerate() {
        let dzdx = grad.gx.data[i] * scale;
        let dzdy = grad.gy.data[i] * scale;
        let len = (dzdx * dzdx + dzdy * dzdy + 1.0).sqrt().max(EPSILON);
        let n = [-dzdx / len, -dzdy / len, 1.0 / len];
        for (c, v) in px.iter_mut().zip(n) {
            *c = round_to_u8((v * 0.5 + 0.5) * 255.0);
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/flow/relief.rs"]
mod tests;
