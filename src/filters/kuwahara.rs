use crate::foundation::{
    error::PainterlyResult,
    math::round_to_u8,
    raster::{Raster, TileRect},
};

/// Summed-area table with a zero guard row/column.
struct Integral {
    stride: usize,
    data: Vec<f64>,
}

impl Integral {
    fn build(width: u32, height: u32, sample: impl Fn(u32, u32) -> f64) -> Self {
        let stride = width as usize + 1;
        let mut data = vec![0.0f64; stride * (height as usize + 1)];
        for y in 0..height {
            let mut row_sum = 0.0f64;
            for x in 0..width {
                row_sum += sample(x, y);
                let i = (y as usize + 1) * stride + x as usize + 1;
                data[i] = data[i - stride] + row_sum;
            }
        }
        Self { stride, data }
    }

    fn sum(&self, r: TileRect) -> f64 {
        let (x0, y0) = (r.x as usize, r.y as usize);
        let (x1, y1) = (x0 + r.width as usize, y0 + r.height as usize);
        self.data[y1 * self.stride + x1] - self.data[y0 * self.stride + x1]
            - self.data[y1 * self.stride + x0]
            + self.data[y0 * self.stride + x0]
    }
}

fn luma(rgb: [u8; 3]) -> f64 {
    0.299 * f64::from(rgb[0]) + 0.587 * f64::from(rgb[1]) + 0.114 * f64::from(rgb[2])
}

/// Classic four-quadrant Kuwahara filter.
///
/// Each output pixel takes the mean colour of whichever of its four
/// `(radius + 1)^2` quadrants has the lowest luminance variance. Quadrants are
/// cropped at the raster edge. `radius == 0` returns a copy.
#[tracing::instrument(skip(src), fields(w = src.width, h = src.height))]
pub fn kuwahara(src: &Raster, radius: u32) -> PainterlyResult<Raster> {
    if radius == 0 || src.is_empty() {
        return Ok(src.clone());
    }
    // Quadrants are clipped to the raster, so larger radii change nothing.
    let radius = radius.min(src.width.max(src.height));

    let c = src.channels();
    let channel_sat: Vec<Integral> = (0..c)
        .map(|ch| Integral::build(src.width, src.height, |x, y| f64::from(src.pixel(x, y)[ch])))
        .collect();
    let luma_sat = Integral::build(src.width, src.height, |x, y| luma(src.rgb(x, y)));
    let luma_sq_sat = Integral::build(src.width, src.height, |x, y| {
        let l = luma(src.rgb(x, y));
        l * l
    });

    let mut out = Raster::new(src.width, src.height, src.layout)?;
    for y in 0..src.height {
        for x in 0..src.width {
            let x0 = x.saturating_sub(radius);
            let y0 = y.saturating_sub(radius);
            let quadrants = [
                span(x0, x, y0, y),
                span(x, x.saturating_add(radius), y0, y),
                span(x0, x, y, y.saturating_add(radius)),
                span(x, x.saturating_add(radius), y, y.saturating_add(radius)),
            ];

            let mut best: Option<(f64, TileRect)> = None;
            for q in quadrants {
                let q = clip(q, src.width, src.height);
                if q.is_empty() {
                    continue;
                }
                let n = q.area() as f64;
                let mean = luma_sat.sum(q) / n;
                let var = (luma_sq_sat.sum(q) / n - mean * mean).max(0.0);
                if best.is_none_or(|(bv, _)| var < bv) {
                    best = Some((var, q));
                }
            }

            if let Some((_, q)) = best {
                let n = q.area() as f64;
                let px = out.pixel_mut(x, y);
                for (ch, sat) in channel_sat.iter().enumerate() {
                    px[ch] = round_to_u8((sat.sum(q) / n) as f32);
                }
            }
        }
    }
    Ok(out)
}

fn span(x0: u32, x1: u32, y0: u32, y1: u32) -> TileRect {
    TileRect {
        x: x0,
        y: y0,
        width: (x1 - x0).saturating_add(1),
        height: (y1 - y0).saturating_add(1),
    }
}

fn clip(r: TileRect, width: u32, height: u32) -> TileRect {
    let x1 = r.x.saturating_add(r.width).min(width);
    let y1 = r.y.saturating_add(r.height).min(height);
    TileRect {
        x: r.x,
        y: r.y,
        width: x1.saturating_sub(r.x),
        height: y1.saturating_sub(r.y),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filters/kuwahara.rs"]
mod tests;
