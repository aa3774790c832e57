use kurbo::{Point, Vec2};
use rayon::prelude::*;

use crate::{
    flow::tensor::{FlowParams, StructureTensorField, Tensor2},
    foundation::{
        error::PainterlyResult,
        math::EPSILON,
        raster::{FloatRaster, Raster},
    },
};

/// Direction used where the tensor carries no orientation.
pub const DEFAULT_TANGENT: Vec2 = Vec2::new(1.0, 0.0);

/// Per-pixel flow orientation and strength.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowSample {
    /// Unit tangent: eigenvector of the minor eigenvalue (runs along edges).
    pub tangent: Vec2,
    /// Major eigenvalue; grows with local contrast, 0 on flat regions.
    pub intensity: f32,
    /// Minor eigenvalue.
    pub minor: f32,
    /// `true` when the tensor had no energy and `tangent` is [`DEFAULT_TANGENT`].
    pub degenerate: bool,
}

impl FlowSample {
    /// Tangent angle in degrees, in `[0, 360)` (image coordinates, y down).
    pub fn angle_deg(&self) -> f64 {
        self.tangent.y.atan2(self.tangent.x).to_degrees().rem_euclid(360.0)
    }

    fn from_tensor(t: Tensor2) -> Self {
        let (minor, major) = t.eigenvalues();
        let trace = f64::from(t.xx) + f64::from(t.yy);
        if !trace.is_finite() || trace <= f64::from(EPSILON) {
            return Self {
                tangent: DEFAULT_TANGENT,
                intensity: 0.0,
                minor: 0.0,
                degenerate: true,
            };
        }

        let (a, b, c) = (f64::from(t.xx), f64::from(t.xy), f64::from(t.yy));
        let v1 = Vec2::new(b, minor - a);
        let v2 = Vec2::new(minor - c, b);
        let v = if v1.hypot2() >= v2.hypot2() { v1 } else { v2 };
        let tangent = if v.hypot() > 1e-12 {
            canonical(v.normalize())
        } else {
            DEFAULT_TANGENT
        };

        Self {
            tangent,
            intensity: major.max(0.0) as f32,
            minor: minor as f32,
            degenerate: false,
        }
    }
}

// Eigenvectors are sign-ambiguous; pin them to the right half plane.
fn canonical(v: Vec2) -> Vec2 {
    if v.x < 0.0 || (v.x == 0.0 && v.y < 0.0) {
        -v
    } else {
        v
    }
}

/// Immutable per-pixel flow field derived from a structure tensor.
#[derive(Clone, Debug)]
pub struct FlowField {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    samples: Vec<FlowSample>,
}

impl FlowField {
    /// Eigen-decompose every tensor of `tensor`.
    pub fn from_tensor(tensor: &StructureTensorField) -> Self {
        let w = tensor.width as usize;
        let mut samples = vec![
            FlowSample {
                tangent: DEFAULT_TANGENT,
                intensity: 0.0,
                minor: 0.0,
                degenerate: true,
            };
            w * tensor.height as usize
        ];
        if w > 0 {
            samples.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
                for (x, out) in row.iter_mut().enumerate() {
                    *out = FlowSample::from_tensor(tensor.at(x as u32, y as u32));
                }
            });
        }
        Self {
            width: tensor.width,
            height: tensor.height,
            samples,
        }
    }

    /// Sample at integer coordinates.
    #[inline]
    pub fn sample(&self, x: u32, y: u32) -> &FlowSample {
        &self.samples[y as usize * self.width as usize + x as usize]
    }

    /// Sample at the floored, edge-clamped position of `p`.
    pub fn sample_at(&self, p: Point) -> &FlowSample {
        let x = (p.x.floor() as i64).clamp(0, i64::from(self.width) - 1) as u32;
        let y = (p.y.floor() as i64).clamp(0, i64::from(self.height) - 1) as u32;
        self.sample(x, y)
    }

    /// All samples in row-major order.
    pub fn samples(&self) -> &[FlowSample] {
        &self.samples
    }

    /// Eigenvalue gap (`major - minor`) normalized by its maximum.
    pub fn edge_weight(&self) -> PainterlyResult<FloatRaster> {
        let data = self
            .samples
            .iter()
            .map(|s| (s.intensity - s.minor).max(0.0))
            .collect();
        Ok(FloatRaster::from_raw(self.width, self.height, data)?.normalized_by_max())
    }

    /// Gray preview of [`edge_weight`](Self::edge_weight).
    pub fn edge_weight_preview(&self) -> PainterlyResult<Raster> {
        Ok(self.edge_weight()?.to_gray8())
    }
}

/// Lab conversion, 5-tap Sobel, smoothed structure tensor, eigen-decomposition.
#[tracing::instrument(skip_all, fields(w = raster.width, h = raster.height))]
pub fn compute_flow(raster: &Raster, params: &FlowParams) -> PainterlyResult<FlowField> {
    let tensor = StructureTensorField::compute(raster, params)?;
    let field = FlowField::from_tensor(&tensor);
    tracing::debug!(
        degenerate = field.samples.iter().filter(|s| s.degenerate).count(),
        "flow field ready"
    );
    Ok(field)
}

#[cfg(test)]
#[path = "../../tests/unit/flow/field.rs"]
mod tests;
