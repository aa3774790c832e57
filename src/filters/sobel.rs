//! Separable Sobel derivatives on float planes.
//!
//! Both operators correlate with a derivative taps row and a smoothing taps
//! column, clamping at the borders. The 5-tap operator matches the usual
//! `ksize = 5` Sobel (`[-1, -2, 0, 2, 1] x [1, 4, 6, 4, 1]`); it is unnormalized,
//! so a unit ramp yields a response of 128.

use crate::foundation::{error::PainterlyResult, raster::FloatRaster};

const DERIV_5: [f32; 5] = [-1.0, -2.0, 0.0, 2.0, 1.0];
const SMOOTH_5: [f32; 5] = [1.0, 4.0, 6.0, 4.0, 1.0];

const DERIV_3: [f32; 3] = [-1.0, 0.0, 1.0];
const SMOOTH_3: [f32; 3] = [1.0, 2.0, 1.0];

/// Horizontal and vertical derivative planes.
#[derive(Clone, Debug)]
pub struct Gradients {
    /// d/dx (positive when intensity grows to the right).
    pub gx: FloatRaster,
    /// d/dy (positive when intensity grows downwards).
    pub gy: FloatRaster,
}

/// 5x5 Sobel derivatives.
pub fn sobel5(src: &FloatRaster) -> PainterlyResult<Gradients> {
    Ok(Gradients {
        gx: separable(src, &DERIV_5, &SMOOTH_5)?,
        gy: separable(src, &SMOOTH_5, &DERIV_5)?,
    })
}

/// 3x3 Sobel derivatives.
pub fn sobel3(src: &FloatRaster) -> PainterlyResult<Gradients> {
    Ok(Gradients {
        gx: separable(src, &DERIV_3, &SMOOTH_3)?,
        gy: separable(src, &SMOOTH_3, &DERIV_3)?,
    })
}

fn separable(src: &FloatRaster, row_taps: &[f32], col_taps: &[f32]) -> PainterlyResult<FloatRaster> {
    let mut tmp = FloatRaster::new(src.width, src.height)?;
    let mut out = FloatRaster::new(src.width, src.height)?;
    if src.data.is_empty() {
        return Ok(out);
    }
    let rr = (row_taps.len() / 2) as i64;
    let rc = (col_taps.len() / 2) as i64;

    for y in 0..i64::from(src.height) {
        for x in 0..i64::from(src.width) {
            let acc: f32 = row_taps
                .iter()
                .enumerate()
                .map(|(k, &t)| t * src.get_clamped(x + k as i64 - rr, y))
                .sum();
            tmp.set(x as u32, y as u32, acc);
        }
    }
    for y in 0..i64::from(src.height) {
        for x in 0..i64::from(src.width) {
            let acc: f32 = col_taps
                .iter()
                .enumerate()
                .map(|(k, &t)| t * tmp.get_clamped(x, y + k as i64 - rc))
                .sum();
            out.set(x as u32, y as u32, acc);
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/filters/sobel.rs"]
mod tests;
