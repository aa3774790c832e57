use crate::foundation::{
    error::{PainterlyError, PainterlyResult},
    raster::{FloatRaster, Raster},
};

/// Kernel half-width covering three standard deviations.
pub fn kernel_radius(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    (3.0 * sigma).ceil() as u32
}

/// Separable Gaussian blur of an 8-bit raster with edge clamping.
///
/// Every channel (alpha included) is filtered independently with a Q16
/// fixed-point kernel. `sigma <= 0` returns an unmodified copy.
pub fn blur_raster(src: &Raster, sigma: f32) -> PainterlyResult<Raster> {
    if sigma.is_nan() {
        return Err(PainterlyError::validation("blur sigma must not be NaN"));
    }
    let radius = kernel_radius(sigma);
    if radius == 0 || src.is_empty() {
        return Ok(src.clone());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; src.data.len()];
    let mut out = vec![0u8; src.data.len()];
    let c = src.channels();

    separable_pass(&src.data, &mut tmp, src.width, src.height, c, &kernel, Axis::Horizontal);
    separable_pass(&tmp, &mut out, src.width, src.height, c, &kernel, Axis::Vertical);
    Raster::from_raw(src.width, src.height, src.layout, out)
}

/// Separable Gaussian blur of a float plane with edge clamping.
pub fn blur_plane(src: &FloatRaster, sigma: f32) -> PainterlyResult<FloatRaster> {
    if sigma.is_nan() {
        return Err(PainterlyError::validation("blur sigma must not be NaN"));
    }
    let radius = kernel_radius(sigma);
    if radius == 0 || src.data.is_empty() {
        return Ok(src.clone());
    }

    let kernel = gaussian_kernel_f32(radius, sigma)?;
    let mut tmp = vec![0.0f32; src.data.len()];
    let mut out = vec![0.0f32; src.data.len()];

    separable_pass(&src.data, &mut tmp, src.width, src.height, 1, &kernel, Axis::Horizontal);
    separable_pass(&tmp, &mut out, src.width, src.height, 1, &kernel, Axis::Vertical);
    FloatRaster::from_raw(src.width, src.height, out)
}

fn gaussian_weights(radius: u32, sigma: f32) -> PainterlyResult<Vec<f64>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(PainterlyError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(PainterlyError::evaluation("gaussian kernel sum is zero"));
    }
    for w in &mut weights {
        *w /= sum;
    }
    Ok(weights)
}

fn gaussian_kernel_f32(radius: u32, sigma: f32) -> PainterlyResult<Vec<f32>> {
    Ok(gaussian_weights(radius, sigma)?
        .into_iter()
        .map(|w| w as f32)
        .collect())
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> PainterlyResult<Vec<u32>> {
    let weights_f = gaussian_weights(radius, sigma)?;

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = (wf * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Push the rounding residue into the centre tap so flat input stays flat.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

#[derive(Clone, Copy, Debug)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Sample type a kernel pass can accumulate.
trait Tap: Copy {
    type Weight: Copy;
    type Acc: Copy + Default;

    fn accumulate(acc: Self::Acc, weight: Self::Weight, sample: Self) -> Self::Acc;
    fn finish(acc: Self::Acc) -> Self;
}

impl Tap for u8 {
    type Weight = u32;
    type Acc = u64;

    #[inline]
    fn accumulate(acc: u64, weight: u32, sample: u8) -> u64 {
        acc + u64::from(weight) * u64::from(sample)
    }

    #[inline]
    fn finish(acc: u64) -> u8 {
        q16_to_u8(acc)
    }
}

impl Tap for f32 {
    type Weight = f32;
    type Acc = f32;

    #[inline]
    fn accumulate(acc: f32, weight: f32, sample: f32) -> f32 {
        acc + weight * sample
    }

    #[inline]
    fn finish(acc: f32) -> f32 {
        acc
    }
}

/// One 1-D kernel pass over interleaved `c`-channel rows, clamping at the edges.
fn separable_pass<T: Tap>(
    src: &[T],
    dst: &mut [T],
    width: u32,
    height: u32,
    c: usize,
    k: &[T::Weight],
    axis: Axis,
) {
    let radius = (k.len() / 2) as i64;
    let w = i64::from(width);
    let h = i64::from(height);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [T::Acc::default(); 4];
            for (ki, &kw) in k.iter().enumerate() {
                let offset = ki as i64 - radius;
                let (sx, sy) = match axis {
                    Axis::Horizontal => ((x + offset).clamp(0, w - 1), y),
                    Axis::Vertical => (x, (y + offset).clamp(0, h - 1)),
                };
                let idx = ((sy * w + sx) as usize) * c;
                for ch in 0..c {
                    acc[ch] = T::accumulate(acc[ch], kw, src[idx + ch]);
                }
            }
            let out_idx = ((y * w + x) as usize) * c;
            for ch in 0..c {
                dst[out_idx + ch] = T::finish(acc[ch]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/filters/gaussian.rs"]
mod tests;
