//! Painterly is a set of non-photorealistic image filters.
//!
//! The centre of the crate is a flow-guided layered paint renderer: brush
//! strokes are stamped coarse to fine, oriented along the structure-tensor
//! flow of the source image, wherever the canvas still differs from a blurred
//! reference.
//!
//! # Pipeline overview
//!
//! 1. **Convert**: `Raster -> LabRaster` ([`to_lab`])
//! 2. **Estimate flow**: `Raster -> FlowField` ([`compute_flow`])
//! 3. **Paint**: `Raster + FlowField -> Painting` ([`LayeredPainter`]), optionally
//!    replaying every stroke onto a secondary raster such as a normal map
//! 4. **Relief** (independent of painting): `LabRaster + FlowField -> height -> normals`
//!    ([`blur_along_flow`], [`normal_map`])
//!
//! [`slic`] superpixels and the [`kuwahara`] filter sit beside the pipeline.
//!
//! Every stage allocates its own output; only the paint canvas is mutated, and
//! only by the compositor loop.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod brush;
mod color;
mod filters;
mod flow;
mod foundation;
mod paint;
mod segment;

pub use assets::io::{load_params, load_raster, output_path, save_raster};
pub use brush::cache::StencilCache;
pub use brush::stencil::{BrushAsset, Stencil, StencilSet};
pub use color::lab::{Lab, LabRaster, from_lab, to_lab};
pub use filters::gaussian::{blur_plane, blur_raster, kernel_radius};
pub use filters::kuwahara::kuwahara;
pub use filters::sobel::{Gradients, sobel3, sobel5};
pub use flow::field::{DEFAULT_TANGENT, FlowField, FlowSample, compute_flow};
pub use flow::relief::{ReliefParams, blur_along_flow, normal_map};
pub use flow::tensor::{FlowParams, StructureTensorField, Tensor2};
pub use foundation::error::{PainterlyError, PainterlyResult};
pub use foundation::math::EPSILON;
pub use foundation::raster::{FloatRaster, PixelLayout, Raster, TileRect};
pub use paint::compositor::{LayeredPainter, Painting};
pub use paint::params::{BrushSizes, CanvasInit, PaintParams};
pub use paint::stroke::{Stamp, StrokeRecord};
pub use segment::slic::{ClusterCenter, Segmentation, SlicParams, slic};
