use serde::{Deserialize, Serialize};

use crate::foundation::error::{PainterlyError, PainterlyResult};

/// Brush sizes ordered coarse to fine: positive, even, strictly descending.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct BrushSizes(Vec<u32>);

impl BrushSizes {
    /// Validate and sort `sizes` descending, dropping duplicates.
    ///
    /// Fails with [`PainterlyError::InvalidBrushSize`] on the first zero or odd size.
    pub fn new(sizes: &[u32]) -> PainterlyResult<Self> {
        if sizes.is_empty() {
            return Err(PainterlyError::validation(
                "at least one brush size is required",
            ));
        }
        if let Some(&bad) = sizes.iter().find(|&&s| s == 0 || s % 2 == 1) {
            return Err(PainterlyError::InvalidBrushSize(bad));
        }
        let mut v = sizes.to_vec();
        v.sort_unstable_by(|a, b| b.cmp(a));
        v.dedup();
        Ok(Self(v))
    }

    /// Sizes, coarsest first.
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// The first (largest) size.
    pub fn coarsest(&self) -> u32 {
        self.0[0]
    }
}

impl Default for BrushSizes {
    fn default() -> Self {
        Self(vec![32, 16, 8, 4])
    }
}

impl TryFrom<Vec<u32>> for BrushSizes {
    type Error = PainterlyError;

    fn try_from(v: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(&v)
    }
}

impl From<BrushSizes> for Vec<u32> {
    fn from(s: BrushSizes) -> Self {
        s.0
    }
}

/// How the canvas is seeded before the first pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasInit {
    /// The source blurred at the coarsest brush size.
    Blurred,
    /// A solid colour; only the raster's channel count is used.
    Solid([u8; 4]),
}

/// Tunables of the layered paint compositor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintParams {
    /// Brush sizes, coarse to fine.
    pub brush_sizes: BrushSizes,
    /// Reference blur sigma as a fraction of the brush size.
    pub blur_factor: f32,
    /// Mean per-pixel Lab distance above which a tile is repainted after the first pass.
    pub refresh_threshold: f32,
    /// Number of precomputed stencil orientations.
    pub num_directions: usize,
    /// Maximum stamps per stroke.
    pub pastes_per_stroke: usize,
    /// A stroke stops once `ln(intensity)` exceeds this value.
    pub coherence_threshold: f32,
    /// Stamp spacing is `size / step_divisor`.
    pub step_divisor: u32,
    /// Orientation of stencil bucket 0, degrees.
    pub base_angle_deg: f64,
    /// Canvas seed.
    pub canvas_init: CanvasInit,
}

impl Default for PaintParams {
    fn default() -> Self {
        Self {
            brush_sizes: BrushSizes::default(),
            blur_factor: 0.5,
            refresh_threshold: 5.0,
            num_directions: 16,
            pastes_per_stroke: 8,
            coherence_threshold: 12.0,
            step_divisor: 4,
            base_angle_deg: 0.0,
            canvas_init: CanvasInit::Blurred,
        }
    }
}

impl PaintParams {
    /// Replace the brush sizes (`setBrushSizes`).
    pub fn set_brush_sizes(&mut self, sizes: &[u32]) -> PainterlyResult<()> {
        self.brush_sizes = BrushSizes::new(sizes)?;
        Ok(())
    }

    /// Check every field; called before any painting starts.
    pub fn validate(&self) -> PainterlyResult<()> {
        if !self.blur_factor.is_finite() || self.blur_factor < 0.0 {
            return Err(PainterlyError::validation(
                "blur_factor must be finite and >= 0",
            ));
        }
        if !self.refresh_threshold.is_finite() || self.refresh_threshold < 0.0 {
            return Err(PainterlyError::validation(
                "refresh_threshold must be finite and >= 0",
            ));
        }
        if self.num_directions == 0 {
            return Err(PainterlyError::validation("num_directions must be >= 1"));
        }
        if self.pastes_per_stroke == 0 {
            return Err(PainterlyError::validation("pastes_per_stroke must be >= 1"));
        }
        if !self.coherence_threshold.is_finite() {
            return Err(PainterlyError::validation(
                "coherence_threshold must be finite",
            ));
        }
        if self.step_divisor == 0 {
            return Err(PainterlyError::validation("step_divisor must be >= 1"));
        }
        if !self.base_angle_deg.is_finite() {
            return Err(PainterlyError::validation("base_angle_deg must be finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/params.rs"]
mod tests;
