use std::path::Path;

use image::{GrayImage, imageops::FilterType};
use kurbo::{Affine, Point};

use crate::foundation::{
    error::{PainterlyError, PainterlyResult},
    math::round_to_u8,
};

/// Square 8-bit alpha mask, centred on the paste position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stencil {
    /// Edge length in pixels.
    pub size: u32,
    /// `size * size` alpha values, row-major.
    pub alpha: Vec<u8>,
}

impl Stencil {
    /// Alpha at `(x, y)`.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.alpha[(y * self.size + x) as usize]
    }

    /// Number of pixels with non-zero alpha.
    pub fn coverage(&self) -> usize {
        self.alpha.iter().filter(|&&a| a != 0).count()
    }

    fn sample_bilinear(&self, x: f64, y: f64) -> f32 {
        // Pixel centres sit at integer + 0.5; outside the mask is transparent.
        let fx = x - 0.5;
        let fy = y - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = (fx - x0) as f32;
        let ty = (fy - y0) as f32;
        let tap = |xi: f64, yi: f64| -> f32 {
            if xi < 0.0 || yi < 0.0 || xi >= f64::from(self.size) || yi >= f64::from(self.size) {
                0.0
            } else {
                f32::from(self.get(xi as u32, yi as u32))
            }
        };
        let top = tap(x0, y0) * (1.0 - tx) + tap(x0 + 1.0, y0) * tx;
        let bottom = tap(x0, y0 + 1.0) * (1.0 - tx) + tap(x0 + 1.0, y0 + 1.0) * tx;
        top * (1.0 - ty) + bottom * ty
    }

    /// Rotate about the centre by `angle_deg` (clockwise on screen, y down), bilinear.
    pub fn rotated(&self, angle_deg: f64) -> Stencil {
        let half = f64::from(self.size) / 2.0;
        let center = Point::new(half, half);
        let inverse = Affine::rotate_about(-angle_deg.to_radians(), center);
        let mut alpha = Vec::with_capacity(self.alpha.len());
        for y in 0..self.size {
            for x in 0..self.size {
                let src = inverse * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                alpha.push(round_to_u8(self.sample_bilinear(src.x, src.y)));
            }
        }
        Stencil {
            size: self.size,
            alpha,
        }
    }
}

/// Rotated variants of one scaled stencil, evenly spaced over 360 degrees.
#[derive(Clone, Debug)]
pub struct StencilSet {
    /// Edge length shared by every variant.
    pub size: u32,
    /// Angle of bucket 0, degrees.
    pub base_angle_deg: f64,
    stencils: Vec<Stencil>,
}

impl StencilSet {
    /// Number of direction buckets.
    pub fn len(&self) -> usize {
        self.stencils.len()
    }

    /// `true` when the set has no buckets (never for sets built by [`BrushAsset`]).
    pub fn is_empty(&self) -> bool {
        self.stencils.is_empty()
    }

    /// Angular width of one bucket, degrees.
    pub fn bucket_width_deg(&self) -> f64 {
        360.0 / self.stencils.len().max(1) as f64
    }

    /// Bucket index for a direction: `floor((angle - base) / (360 / n))`, wrapped.
    pub fn bucket_for_angle(&self, angle_deg: f64) -> usize {
        let n = self.stencils.len().max(1);
        let a = (angle_deg - self.base_angle_deg).rem_euclid(360.0);
        ((a / self.bucket_width_deg()).floor() as usize) % n
    }

    /// Stencil for `bucket`.
    pub fn get(&self, bucket: usize) -> &Stencil {
        &self.stencils[bucket % self.stencils.len()]
    }
}

/// A grayscale brush bitmap from which stencils are derived.
#[derive(Clone, Debug)]
pub struct BrushAsset {
    base: GrayImage,
}

impl BrushAsset {
    /// Load a stencil file; colour images are reduced to luminance.
    pub fn load(path: impl AsRef<Path>) -> PainterlyResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PainterlyError::AssetNotFound(path.to_path_buf()));
        }
        let img = image::open(path).map_err(|e| {
            PainterlyError::decode(format!("brush '{}': {e}", path.display()))
        })?;
        Self::from_gray(img.to_luma8())
    }

    /// Wrap an in-memory bitmap.
    pub fn from_gray(base: GrayImage) -> PainterlyResult<Self> {
        if base.width() == 0 || base.height() == 0 {
            return Err(PainterlyError::validation("brush bitmap is empty"));
        }
        Ok(Self { base })
    }

    /// Round brush with a linear falloff over the outer quarter of its radius.
    pub fn soft_disc(diameter: u32) -> PainterlyResult<Self> {
        if diameter == 0 {
            return Err(PainterlyError::InvalidBrushSize(diameter));
        }
        let r = diameter as f32 / 2.0;
        let feather = (r * 0.25).max(1.0);
        Self::from_gray(GrayImage::from_fn(diameter, diameter, |x, y| {
            let d = (x as f32 + 0.5 - r).hypot(y as f32 + 0.5 - r);
            image::Luma([round_to_u8((r - d) / feather * 255.0)])
        }))
    }

    /// Dimensions of the source bitmap.
    pub fn dimensions(&self) -> (u32, u32) {
        self.base.dimensions()
    }

    /// Resample to `size x size` with a linear filter.
    pub fn scale(&self, size: u32) -> PainterlyResult<Stencil> {
        if size == 0 {
            return Err(PainterlyError::InvalidBrushSize(size));
        }
        let scaled = image::imageops::resize(&self.base, size, size, FilterType::Triangle);
        Ok(Stencil {
            size,
            alpha: scaled.into_raw(),
        })
    }

    /// `n` rotated copies of the scaled stencil at `base + i * 360 / n` degrees.
    pub fn rotated_set(
        &self,
        size: u32,
        base_angle_deg: f64,
        num_directions: usize,
    ) -> PainterlyResult<StencilSet> {
        if num_directions == 0 {
            return Err(PainterlyError::validation("num_directions must be >= 1"));
        }
        let scaled = self.scale(size)?;
        let step = 360.0 / num_directions as f64;
        let stencils = (0..num_directions)
            .map(|i| scaled.rotated(base_angle_deg + i as f64 * step))
            .collect();
        Ok(StencilSet {
            size,
            base_angle_deg,
            stencils,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/brush/stencil.rs"]
mod tests;
