use std::{collections::HashMap, sync::Arc};

use crate::{
    brush::stencil::{BrushAsset, StencilSet},
    foundation::error::{PainterlyError, PainterlyResult},
};

/// Per-size memo of rotated stencil sets for one brush.
///
/// Sets are built on first request and shared afterwards, so the stroke loop
/// only does `(size, bucket)` lookups.
#[derive(Debug)]
pub struct StencilCache {
    brush: BrushAsset,
    base_angle_deg: f64,
    num_directions: usize,
    sets: HashMap<u32, Arc<StencilSet>>,
}

impl StencilCache {
    /// Empty cache for `brush` with `num_directions` buckets starting at `base_angle_deg`.
    pub fn new(
        brush: BrushAsset,
        base_angle_deg: f64,
        num_directions: usize,
    ) -> PainterlyResult<Self> {
        if num_directions == 0 {
            return Err(PainterlyError::validation("num_directions must be >= 1"));
        }
        Ok(Self {
            brush,
            base_angle_deg,
            num_directions,
            sets: HashMap::new(),
        })
    }

    /// Rotated set for `size`, building it on first use.
    pub fn get_or_build(&mut self, size: u32) -> PainterlyResult<Arc<StencilSet>> {
        if let Some(set) = self.sets.get(&size) {
            return Ok(Arc::clone(set));
        }
        let set = Arc::new(
            self.brush
                .rotated_set(size, self.base_angle_deg, self.num_directions)?,
        );
        tracing::debug!(size, directions = self.num_directions, "built stencil set");
        self.sets.insert(size, Arc::clone(&set));
        Ok(set)
    }

    /// Number of cached sizes.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// `true` when nothing has been built yet.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/brush/cache.rs"]
mod tests;
