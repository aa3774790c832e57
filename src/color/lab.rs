//! Approximate sRGB <-> CIELAB conversion.
//!
//! The transform is the usual piecewise sRGB gamma, the sRGB D65 matrix and the
//! CIE `f(t)` nonlinearity with the linear toe below `0.008856`. It is meant for
//! relative perceptual distances, not colorimetry.

use rayon::prelude::*;

use crate::foundation::{
    error::PainterlyResult,
    math::round_to_u8,
    raster::{PixelLayout, Raster},
};

const XN: f32 = 95.047;
const YN: f32 = 100.0;
const ZN: f32 = 108.883;

const F_THRESHOLD: f32 = 0.008856;
const F_SLOPE: f32 = 7.787;
const F_OFFSET: f32 = 16.0 / 116.0;

/// A CIELAB colour triple.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Lab {
    /// Lightness, roughly `[0, 100]`.
    pub l: f32,
    /// Green-red axis.
    pub a: f32,
    /// Blue-yellow axis.
    pub b: f32,
}

impl Lab {
    /// Construct from components.
    pub const fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Convert an 8-bit sRGB triple.
    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        let r = srgb_to_linear(f32::from(rgb[0]) / 255.0) * 100.0;
        let g = srgb_to_linear(f32::from(rgb[1]) / 255.0) * 100.0;
        let b = srgb_to_linear(f32::from(rgb[2]) / 255.0) * 100.0;

        let x = r * 0.4124 + g * 0.3576 + b * 0.1805;
        let y = r * 0.2126 + g * 0.7152 + b * 0.0722;
        let z = r * 0.0193 + g * 0.1192 + b * 0.9505;

        let fx = lab_f(x / XN);
        let fy = lab_f(y / YN);
        let fz = lab_f(z / ZN);

        Self {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }

    /// Convert back to 8-bit sRGB, clamping out-of-gamut values.
    pub fn to_rgb(self) -> [u8; 3] {
        let fy = (self.l + 16.0) / 116.0;
        let fx = fy + self.a / 500.0;
        let fz = fy - self.b / 200.0;

        let x = lab_f_inv(fx) * XN / 100.0;
        let y = lab_f_inv(fy) * YN / 100.0;
        let z = lab_f_inv(fz) * ZN / 100.0;

        let r = x * 3.2406 + y * -1.5372 + z * -0.4986;
        let g = x * -0.9689 + y * 1.8758 + z * 0.0415;
        let b = x * 0.0557 + y * -0.2040 + z * 1.0570;

        [
            round_to_u8(linear_to_srgb(r) * 255.0),
            round_to_u8(linear_to_srgb(g) * 255.0),
            round_to_u8(linear_to_srgb(b) * 255.0),
        ]
    }

    /// Euclidean distance (CIE76 delta E).
    #[inline]
    pub fn distance(self, other: Self) -> f32 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        (dl * dl + da * da + db * db).sqrt()
    }
}

/// Per-pixel Lab values of a raster; read-only once built.
#[derive(Clone, Debug, PartialEq)]
pub struct LabRaster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major samples.
    pub data: Vec<Lab>,
}

impl LabRaster {
    #[inline]
    /// Sample at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Lab {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Lightness channel as a flat row-major vector.
    pub fn lightness(&self) -> Vec<f32> {
        self.data.iter().map(|lab| lab.l).collect()
    }
}

/// Convert every pixel of `raster` to Lab. Alpha is ignored; gray is treated as neutral.
pub fn to_lab(raster: &Raster) -> LabRaster {
    let w = raster.width as usize;
    let mut data = vec![Lab::default(); w * raster.height as usize];
    if w > 0 {
        data.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                *out = Lab::from_rgb(raster.rgb(x as u32, y as u32));
            }
        });
    }
    LabRaster {
        width: raster.width,
        height: raster.height,
        data,
    }
}

/// Convert a Lab raster back to RGB8.
pub fn from_lab(lab: &LabRaster) -> PainterlyResult<Raster> {
    let mut out = Raster::new(lab.width, lab.height, PixelLayout::Rgb8)?;
    for (px, sample) in out.data.chunks_exact_mut(3).zip(&lab.data) {
        px.copy_from_slice(&sample.to_rgb());
    }
    Ok(out)
}

fn srgb_to_linear(v: f32) -> f32 {
    if v > 0.04045 {
        ((v + 0.055) / 1.055).powf(2.4)
    } else {
        v / 12.92
    }
}

fn linear_to_srgb(v: f32) -> f32 {
    if v > 0.0031308 {
        1.055 * v.max(0.0).powf(1.0 / 2.4) - 0.055
    } else {
        12.92 * v
    }
}

fn lab_f(t: f32) -> f32 {
    if t > F_THRESHOLD {
        t.cbrt()
    } else {
        F_SLOPE * t + F_OFFSET
    }
}

fn lab_f_inv(f: f32) -> f32 {
    let cube = f * f * f;
    if cube > F_THRESHOLD {
        cube
    } else {
        (f - F_OFFSET) / F_SLOPE
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/lab.rs"]
mod tests;
