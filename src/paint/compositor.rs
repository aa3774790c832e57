use crate::{
    brush::{cache::StencilCache, stencil::BrushAsset},
    color::lab::{Lab, LabRaster, to_lab},
    filters::gaussian::blur_raster,
    flow::field::FlowField,
    foundation::{
        error::{PainterlyError, PainterlyResult},
        raster::{Raster, TileRect},
    },
    paint::{
        params::{CanvasInit, PaintParams},
        stroke::{StrokeRecord, Walk, paste},
    },
};

/// Output of a paint run.
#[derive(Clone, Debug)]
pub struct Painting {
    /// Painted primary canvas.
    pub canvas: Raster,
    /// Painted secondary canvas, when one was supplied.
    pub secondary: Option<Raster>,
    /// Every stroke in paint order.
    pub strokes: Vec<StrokeRecord>,
}

impl Painting {
    /// Total number of stencil pastes.
    pub fn stamp_count(&self) -> usize {
        self.strokes.iter().map(|s| s.stamps.len()).sum()
    }
}

/// Coarse-to-fine, flow-guided stroke compositor.
///
/// Each brush size is one pass over an `S x S` tile grid. On the first pass
/// every tile is stroked; afterwards only tiles whose mean Lab distance from
/// the blurred reference exceeds `refresh_threshold`. A stroke starts at the
/// tile's worst pixel and walks along the flow tangent.
#[derive(Debug)]
pub struct LayeredPainter {
    params: PaintParams,
    stencils: StencilCache,
}

impl LayeredPainter {
    /// Validate `params` and prepare a stencil cache for `brush`.
    pub fn new(params: PaintParams, brush: BrushAsset) -> PainterlyResult<Self> {
        params.validate()?;
        let stencils = StencilCache::new(brush, params.base_angle_deg, params.num_directions)?;
        Ok(Self { params, stencils })
    }

    /// Parameters in use.
    pub fn params(&self) -> &PaintParams {
        &self.params
    }

    /// Paint `image`, orienting strokes with `flow`.
    #[tracing::instrument(skip_all, fields(w = image.width, h = image.height))]
    pub fn paint(&mut self, image: &Raster, flow: &FlowField) -> PainterlyResult<Painting> {
        self.run(image, flow, None)
    }

    /// Paint `image` and replay every stroke onto `secondary` with its own colours.
    #[tracing::instrument(skip_all, fields(w = image.width, h = image.height))]
    pub fn paint_with_secondary(
        &mut self,
        image: &Raster,
        flow: &FlowField,
        secondary: &Raster,
    ) -> PainterlyResult<Painting> {
        self.run(image, flow, Some(secondary))
    }

    fn run(
        &mut self,
        image: &Raster,
        flow: &FlowField,
        secondary: Option<&Raster>,
    ) -> PainterlyResult<Painting> {
        if flow.width != image.width || flow.height != image.height {
            return Err(PainterlyError::validation(format!(
                "flow field is {}x{}, image is {}x{}",
                flow.width, flow.height, image.width, image.height
            )));
        }
        if let Some(sec) = secondary
            && !sec.same_size(image)
        {
            return Err(PainterlyError::validation(format!(
                "secondary raster is {}x{}, image is {}x{}",
                sec.width, sec.height, image.width, image.height
            )));
        }

        let mut canvas = self.initial_canvas(image)?;
        let mut sec_canvas = secondary.map(|s| self.initial_canvas(s)).transpose()?;
        let mut strokes = Vec::new();
        if image.is_empty() {
            return Ok(Painting {
                canvas,
                secondary: sec_canvas,
                strokes,
            });
        }

        let sizes = self.params.brush_sizes.as_slice().to_vec();
        for (pass, &size) in sizes.iter().enumerate() {
            let sigma = size as f32 * self.params.blur_factor;
            let reference = blur_raster(image, sigma)?;
            let reference_lab = to_lab(&reference);
            let sec_reference = secondary.map(|s| blur_raster(s, sigma)).transpose()?;
            let set = self.stencils.get_or_build(size)?;
            let walk = Walk {
                pastes: self.params.pastes_per_stroke,
                step: f64::from(size) / f64::from(self.params.step_divisor),
                coherence_threshold: self.params.coherence_threshold,
            };
            let refresh = pass == 0;

            let mut tiles = 0usize;
            let first_stroke = strokes.len();
            for ty in (0..image.height).step_by(size as usize) {
                for tx in (0..image.width).step_by(size as usize) {
                    let tile = image.tile(tx, ty, size);
                    tiles += 1;
                    let (error, seed) = tile_error(&canvas, &reference_lab, tile);
                    if !refresh && error <= self.params.refresh_threshold {
                        continue;
                    }

                    let color = reference.mean_color(tile);
                    let stamps = walk.trace(flow, &set, seed);
                    for s in &stamps {
                        paste(&mut canvas, set.get(s.bucket), s.x, s.y, color);
                    }
                    if let (Some(sc), Some(sr)) = (sec_canvas.as_mut(), sec_reference.as_ref()) {
                        let sec_color = sr.mean_color(tile);
                        for s in &stamps {
                            paste(sc, set.get(s.bucket), s.x, s.y, sec_color);
                        }
                    }
                    tracing::trace!(
                        pass,
                        size,
                        seed_x = seed.0,
                        seed_y = seed.1,
                        error,
                        stamps = stamps.len(),
                        "stroke"
                    );
                    strokes.push(StrokeRecord {
                        pass,
                        size,
                        tile,
                        seed,
                        color,
                        stamps,
                    });
                }
            }

            let issued = &strokes[first_stroke..];
            tracing::debug!(
                pass,
                size,
                tiles,
                strokes = issued.len(),
                stamps = issued.iter().map(|s| s.stamps.len()).sum::<usize>(),
                "brush pass done"
            );
        }

        Ok(Painting {
            canvas,
            secondary: sec_canvas,
            strokes,
        })
    }

    fn initial_canvas(&self, src: &Raster) -> PainterlyResult<Raster> {
        match self.params.canvas_init {
            CanvasInit::Blurred => blur_raster(
                src,
                self.params.brush_sizes.coarsest() as f32 * self.params.blur_factor,
            ),
            CanvasInit::Solid(px) => {
                Raster::filled(src.width, src.height, src.layout, &px[..src.channels()])
            }
        }
    }
}

/// Mean Lab distance between canvas and reference over `tile`, and the
/// first pixel of maximum distance.
fn tile_error(canvas: &Raster, reference: &LabRaster, tile: TileRect) -> (f32, (u32, u32)) {
    let mut sum = 0.0f64;
    let mut worst = -1.0f32;
    let mut seed = (tile.x, tile.y);
    for (x, y) in tile.pixels() {
        let d = Lab::from_rgb(canvas.rgb(x, y)).distance(reference.get(x, y));
        sum += f64::from(d);
        if d > worst {
            worst = d;
            seed = (x, y);
        }
    }
    let mean = if tile.is_empty() {
        0.0
    } else {
        (sum / tile.area() as f64) as f32
    };
    (mean, seed)
}

#[cfg(test)]
#[path = "../../tests/unit/paint/compositor.rs"]
mod tests;
