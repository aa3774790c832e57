//! Simple linear iterative clustering over Lab colour and position.

use serde::{Deserialize, Serialize};

use crate::{
    color::lab::{Lab, to_lab},
    foundation::{
        error::{PainterlyError, PainterlyResult},
        math::Fnv1a64,
        raster::{PixelLayout, Raster},
    },
};

/// SLIC tunables.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlicParams {
    /// Spacing `S` of the initial centre lattice, pixels.
    pub grid_step: u32,
    /// Assignment/update rounds.
    pub iterations: u32,
    /// Colour normaliser `m`; larger values give more compact segments.
    pub compactness: f32,
}

impl Default for SlicParams {
    fn default() -> Self {
        Self {
            grid_step: 32,
            iterations: 10,
            compactness: 10.0,
        }
    }
}

impl SlicParams {
    /// Reject a zero step and non-positive compactness.
    pub fn validate(&self) -> PainterlyResult<()> {
        if self.grid_step == 0 {
            return Err(PainterlyError::validation("slic grid_step must be >= 1"));
        }
        if !self.compactness.is_finite() || self.compactness <= 0.0 {
            return Err(PainterlyError::validation(
                "slic compactness must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// Cluster centre in Lab colour and image position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusterCenter {
    /// Mean colour of the members.
    pub lab: Lab,
    /// Mean column.
    pub x: f32,
    /// Mean row.
    pub y: f32,
}

/// Label raster plus final cluster centres.
#[derive(Clone, Debug)]
pub struct Segmentation {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major cluster index per pixel.
    pub labels: Vec<u32>,
    /// One entry per cluster.
    pub centers: Vec<ClusterCenter>,
}

impl Segmentation {
    /// Cluster index at `(x, y)`.
    #[inline]
    pub fn label(&self, x: u32, y: u32) -> u32 {
        self.labels[y as usize * self.width as usize + x as usize]
    }

    /// Each segment filled with a pseudo-random colour derived from `seed` and its index.
    pub fn random_colors(&self, seed: u64) -> PainterlyResult<Raster> {
        let palette: Vec<[u8; 3]> = (0..self.centers.len() as u32)
            .map(|k| {
                let mut h = Fnv1a64::new(Fnv1a64::OFFSET_BASIS);
                h.write_u64(seed);
                h.write_u32(k);
                let [r, g, b, ..] = h.finish().to_le_bytes();
                [r, g, b]
            })
            .collect();

        let mut out = Raster::new(self.width, self.height, PixelLayout::Rgb8)?;
        for (px, &k) in out.data.chunks_exact_mut(3).zip(&self.labels) {
            px.copy_from_slice(&palette[k as usize]);
        }
        Ok(out)
    }

    /// Each segment filled with the `src` colour found at its integer centroid.
    pub fn fill_with_center_colors(&self, src: &Raster) -> PainterlyResult<Raster> {
        if src.width != self.width || src.height != self.height {
            return Err(PainterlyError::validation(format!(
                "segmentation is {}x{}, raster is {}x{}",
                self.width, self.height, src.width, src.height
            )));
        }
        let n = self.centers.len();
        let mut sums = vec![(0u64, 0u64, 0u64); n];
        for y in 0..self.height {
            for x in 0..self.width {
                let s = &mut sums[self.label(x, y) as usize];
                s.0 += u64::from(x);
                s.1 += u64::from(y);
                s.2 += 1;
            }
        }
        let colors: Vec<Option<Vec<u8>>> = sums
            .iter()
            .map(|&(sx, sy, count)| {
                (count > 0).then(|| src.pixel((sx / count) as u32, (sy / count) as u32).to_vec())
            })
            .collect();

        let mut out = src.clone();
        for y in 0..self.height {
            for x in 0..self.width {
                if let Some(c) = &colors[self.label(x, y) as usize] {
                    out.pixel_mut(x, y).copy_from_slice(c);
                }
            }
        }
        Ok(out)
    }
}

fn lattice(extent: u32, step: u32) -> Vec<u32> {
    let v: Vec<u32> = (step / 2..extent).step_by(step as usize).collect();
    if v.is_empty() && extent > 0 {
        vec![extent / 2]
    } else {
        v
    }
}

/// Segment `raster` into roughly `grid_step`-sized superpixels.
///
/// Centres start on a `grid_step` lattice offset by half a step. Each round
/// assigns every pixel inside a centre's `±grid_step` window to the centre
/// minimising `sqrt((dc / m)^2 + (ds / S)^2)`, then moves centres to the
/// mean of their members. Empty clusters stay put.
#[tracing::instrument(skip(raster), fields(w = raster.width, h = raster.height))]
pub fn slic(raster: &Raster, params: &SlicParams) -> PainterlyResult<Segmentation> {
    params.validate()?;
    let (w, h) = (raster.width, raster.height);
    let lab = to_lab(raster);
    let step = params.grid_step;
    let s = step as f32;
    let m = params.compactness;

    let mut centers: Vec<ClusterCenter> = lattice(h, step)
        .into_iter()
        .flat_map(|y| lattice(w, step).into_iter().map(move |x| (x, y)))
        .map(|(x, y)| ClusterCenter {
            lab: lab.get(x, y),
            x: x as f32,
            y: y as f32,
        })
        .collect();

    let len = w as usize * h as usize;
    let mut labels = vec![0u32; len];
    let mut distances = vec![f32::INFINITY; len];

    for _ in 0..params.iterations {
        distances.fill(f32::INFINITY);
        for (k, c) in centers.iter().enumerate() {
            let x0 = (c.x - s).max(0.0) as u32;
            let y0 = (c.y - s).max(0.0) as u32;
            let x1 = ((c.x + s).max(0.0) as u32).min(w);
            let y1 = ((c.y + s).max(0.0) as u32).min(h);
            for y in y0..y1 {
                for x in x0..x1 {
                    let dc = lab.get(x, y).distance(c.lab);
                    let ds = (x as f32 - c.x).hypot(y as f32 - c.y);
                    let d = ((dc / m).powi(2) + (ds / s).powi(2)).sqrt();
                    let i = y as usize * w as usize + x as usize;
                    if d < distances[i] {
                        distances[i] = d;
                        labels[i] = k as u32;
                    }
                }
            }
        }

        let mut acc = vec![(0.0f64, 0.0f64, 0.0f64, 0.0f64, 0.0f64, 0u64); centers.len()];
        for y in 0..h {
            for x in 0..w {
                let i = y as usize * w as usize + x as usize;
                let p = lab.data[i];
                let a = &mut acc[labels[i] as usize];
                a.0 += f64::from(p.l);
                a.1 += f64::from(p.a);
                a.2 += f64::from(p.b);
                a.3 += f64::from(x);
                a.4 += f64::from(y);
                a.5 += 1;
            }
        }
        for (c, a) in centers.iter_mut().zip(&acc) {
            if a.5 == 0 {
                continue;
            }
            let n = a.5 as f64;
            *c = ClusterCenter {
                lab: Lab::new((a.0 / n) as f32, (a.1 / n) as f32, (a.2 / n) as f32),
                x: (a.3 / n) as f32,
                y: (a.4 / n) as f32,
            };
        }
    }

    tracing::debug!(clusters = centers.len(), "slic done");
    Ok(Segmentation {
        width: w,
        height: h,
        labels,
        centers,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/segment/slic.rs"]
mod tests;
