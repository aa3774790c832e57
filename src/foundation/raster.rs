use serde::{Deserialize, Serialize};

use crate::foundation::{
    error::{PainterlyError, PainterlyResult},
    math::guarded_div,
};

/// Channel layout of an 8-bit [`Raster`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelLayout {
    /// Single-channel intensity.
    Gray8,
    /// Interleaved red, green, blue.
    Rgb8,
    /// Interleaved red, green, blue, straight (non-premultiplied) alpha.
    Rgba8,
}

impl PixelLayout {
    /// Number of interleaved bytes per pixel.
    pub const fn channels(self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// Axis-aligned pixel rectangle, always the valid intersection with its raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    /// Left edge (inclusive).
    pub x: u32,
    /// Top edge (inclusive).
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl TileRect {
    /// Number of pixels covered.
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// `true` when the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Iterate `(x, y)` in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.y..self.y + self.height)
            .flat_map(move |y| (self.x..self.x + self.width).map(move |x| (x, y)))
    }
}

/// Owned 8-bit raster with interleaved channels in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channel layout of `data`.
    pub layout: PixelLayout,
    /// `width * height * layout.channels()` bytes.
    pub data: Vec<u8>,
}

pub(crate) fn byte_len(width: u32, height: u32, channels: usize) -> PainterlyResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(channels))
        .ok_or_else(|| PainterlyError::evaluation("raster buffer size overflow"))
}

impl Raster {
    /// Zero-filled raster.
    pub fn new(width: u32, height: u32, layout: PixelLayout) -> PainterlyResult<Self> {
        let len = byte_len(width, height, layout.channels())?;
        Ok(Self {
            width,
            height,
            layout,
            data: vec![0; len],
        })
    }

    /// Raster with every pixel set to `px` (`px.len()` must equal the channel count).
    pub fn filled(width: u32, height: u32, layout: PixelLayout, px: &[u8]) -> PainterlyResult<Self> {
        if px.len() != layout.channels() {
            return Err(PainterlyError::validation(format!(
                "fill pixel has {} channels, layout {:?} expects {}",
                px.len(),
                layout,
                layout.channels()
            )));
        }
        let pixels = byte_len(width, height, 1)?;
        Ok(Self {
            width,
            height,
            layout,
            data: px.repeat(pixels),
        })
    }

    /// Wrap an existing buffer, checking its length.
    pub fn from_raw(
        width: u32,
        height: u32,
        layout: PixelLayout,
        data: Vec<u8>,
    ) -> PainterlyResult<Self> {
        let expected = byte_len(width, height, layout.channels())?;
        if data.len() != expected {
            return Err(PainterlyError::validation(format!(
                "raster data has {} bytes, expected {expected} for {width}x{height} {layout:?}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// Bytes per pixel.
    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    /// `true` for a raster without pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Byte offset of pixel `(x, y)`.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels()
    }

    /// Channel bytes of pixel `(x, y)`.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let i = self.index(x, y);
        &self.data[i..i + self.channels()]
    }

    /// Mutable channel bytes of pixel `(x, y)`.
    #[inline]
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        let i = self.index(x, y);
        let c = self.channels();
        &mut self.data[i..i + c]
    }

    /// Colour of pixel `(x, y)` as RGB; gray is replicated, alpha dropped.
    #[inline]
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let px = self.pixel(x, y);
        match self.layout {
            PixelLayout::Gray8 => [px[0], px[0], px[0]],
            PixelLayout::Rgb8 | PixelLayout::Rgba8 => [px[0], px[1], px[2]],
        }
    }

    /// `true` when `other` has the same width and height.
    pub fn same_size(&self, other: &Raster) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// The `size x size` grid tile at `(x, y)`, cropped to the raster bounds.
    pub fn tile(&self, x: u32, y: u32, size: u32) -> TileRect {
        let x0 = x.min(self.width);
        let y0 = y.min(self.height);
        let x1 = x.saturating_add(size).min(self.width);
        let y1 = y.saturating_add(size).min(self.height);
        TileRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// Per-channel rounded mean over `rect`. Unused trailing slots are 255.
    pub fn mean_color(&self, rect: TileRect) -> [u8; 4] {
        let c = self.channels();
        let mut out = [255u8; 4];
        if rect.is_empty() {
            return out;
        }
        let mut acc = [0u64; 4];
        for (x, y) in rect.pixels() {
            for (a, &v) in acc.iter_mut().zip(self.pixel(x, y)) {
                *a += u64::from(v);
            }
        }
        let n = rect.area() as u64;
        for ch in 0..c {
            out[ch] = ((acc[ch] + n / 2) / n).min(255) as u8;
        }
        out
    }
}

/// Owned single-channel `f32` plane in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatRaster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height` samples.
    pub data: Vec<f32>,
}

impl FloatRaster {
    /// Zero-initialized plane.
    pub fn new(width: u32, height: u32) -> PainterlyResult<Self> {
        let len = byte_len(width, height, 1)?;
        Ok(Self {
            width,
            height,
            data: vec![0.0; len],
        })
    }

    /// Wrap an existing buffer, checking its length.
    pub fn from_raw(width: u32, height: u32, data: Vec<f32>) -> PainterlyResult<Self> {
        let expected = byte_len(width, height, 1)?;
        if data.len() != expected {
            return Err(PainterlyError::validation(format!(
                "plane data has {} samples, expected {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    /// Sample at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    /// Sample with edge clamping for out-of-range coordinates.
    pub fn get_clamped(&self, x: i64, y: i64) -> f32 {
        let cx = x.clamp(0, i64::from(self.width) - 1) as u32;
        let cy = y.clamp(0, i64::from(self.height) - 1) as u32;
        self.get(cx, cy)
    }

    #[inline]
    /// Overwrite the sample at `(x, y)`.
    pub fn set(&mut self, x: u32, y: u32, v: f32) {
        let i = y as usize * self.width as usize + x as usize;
        self.data[i] = v;
    }

    /// Largest sample, or 0 for an empty plane.
    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(0.0f32, f32::max)
    }

    /// Divide every sample by the plane maximum (clamped to [`EPSILON`](crate::EPSILON)).
    pub fn normalized_by_max(&self) -> Self {
        let m = self.max();
        Self {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| guarded_div(v, m)).collect(),
        }
    }

    /// Quantize `[0, 1]` samples to a gray raster.
    pub fn to_gray8(&self) -> Raster {
        Raster {
            width: self.width,
            height: self.height,
            layout: PixelLayout::Gray8,
            data: self
                .data
                .iter()
                .map(|&v| crate::foundation::math::round_to_u8(v * 255.0))
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/raster.rs"]
mod tests;
