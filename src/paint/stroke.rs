use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

use crate::{
    brush::stencil::{Stencil, StencilSet},
    flow::field::FlowField,
    foundation::{
        math::{EPSILON, lerp_u8},
        raster::{Raster, TileRect},
    },
};

/// One stencil paste: centre pixel and direction bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    /// Centre column.
    pub x: u32,
    /// Centre row.
    pub y: u32,
    /// Rotated stencil index.
    pub bucket: usize,
}

/// Geometry and colour of one stroke, in paint order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeRecord {
    /// Zero-based brush-size pass.
    pub pass: usize,
    /// Brush size of the pass.
    pub size: u32,
    /// Grid tile that triggered the stroke.
    pub tile: TileRect,
    /// Worst-error pixel of the tile; the first stamp sits here.
    pub seed: (u32, u32),
    /// Primary paste colour (reference tile mean).
    pub color: [u8; 4],
    /// Stamps in paste order, at least one.
    pub stamps: Vec<Stamp>,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Walk {
    pub(crate) pastes: usize,
    pub(crate) step: f64,
    pub(crate) coherence_threshold: f32,
}

impl Walk {
    /// Follow the flow from `seed`, one stamp per step.
    ///
    /// The walk stops after `pastes` stamps, when the local intensity is
    /// coherent enough, or when the next centre would leave the raster.
    pub(crate) fn trace(&self, flow: &FlowField, set: &StencilSet, seed: (u32, u32)) -> Vec<Stamp> {
        let mut stamps = Vec::with_capacity(self.pastes);
        let mut pos = Point::new(f64::from(seed.0), f64::from(seed.1));
        let mut prev: Option<Vec2> = None;

        for _ in 0..self.pastes {
            let (cx, cy) = (pos.x.round() as u32, pos.y.round() as u32);
            let sample = flow.sample(cx, cy);
            let mut tangent = sample.tangent;
            if prev.is_some_and(|p| p.dot(tangent) < 0.0) {
                tangent = -tangent;
            }
            let angle = tangent.y.atan2(tangent.x).to_degrees().rem_euclid(360.0);
            stamps.push(Stamp {
                x: cx,
                y: cy,
                bucket: set.bucket_for_angle(angle),
            });

            if sample.intensity.max(EPSILON).ln() > self.coherence_threshold {
                break;
            }
            let next = pos + tangent * self.step;
            if !inside(next, flow.width, flow.height) {
                break;
            }
            pos = next;
            prev = Some(tangent);
        }
        stamps
    }
}

fn inside(p: Point, width: u32, height: u32) -> bool {
    let (x, y) = (p.x.round(), p.y.round());
    x >= 0.0 && y >= 0.0 && x < f64::from(width) && y < f64::from(height)
}

/// Alpha-blend `color` through `stencil` centred on `(cx, cy)`, clipped to the raster.
pub(crate) fn paste(canvas: &mut Raster, stencil: &Stencil, cx: u32, cy: u32, color: [u8; 4]) {
    let half = i64::from(stencil.size / 2);
    let left = i64::from(cx) - half;
    let top = i64::from(cy) - half;
    let channels = canvas.channels();

    for sy in 0..stencil.size {
        let y = top + i64::from(sy);
        if y < 0 || y >= i64::from(canvas.height) {
            continue;
        }
        for sx in 0..stencil.size {
            let x = left + i64::from(sx);
            if x < 0 || x >= i64::from(canvas.width) {
                continue;
            }
            let a = stencil.get(sx, sy);
            if a == 0 {
                continue;
            }
            let px = canvas.pixel_mut(x as u32, y as u32);
            for (d, &s) in px.iter_mut().zip(&color[..channels]) {
                *d = lerp_u8(*d, s, a);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/stroke.rs"]
mod tests;
