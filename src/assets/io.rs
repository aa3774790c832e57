use std::path::{Path, PathBuf};

use anyhow::Context;
use image::{ColorType, DynamicImage, ExtendedColorType};

use crate::{
    foundation::{
        error::{PainterlyError, PainterlyResult},
        raster::{PixelLayout, Raster},
    },
    paint::params::PaintParams,
};

/// Decode an image file. Gray stays gray, alpha is kept, everything else becomes RGB8.
pub fn load_raster(path: impl AsRef<Path>) -> PainterlyResult<Raster> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(PainterlyError::FileNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    let img = image::load_from_memory(&bytes)
        .map_err(|e| PainterlyError::decode(format!("'{}': {e}", path.display())))?;
    from_dynamic(img)
}

fn from_dynamic(img: DynamicImage) -> PainterlyResult<Raster> {
    let (w, h) = (img.width(), img.height());
    let layout = match img.color() {
        ColorType::L8 | ColorType::L16 => PixelLayout::Gray8,
        c if c.has_alpha() => PixelLayout::Rgba8,
        _ => PixelLayout::Rgb8,
    };
    let data = match layout {
        PixelLayout::Gray8 => img.into_luma8().into_raw(),
        PixelLayout::Rgb8 => img.into_rgb8().into_raw(),
        PixelLayout::Rgba8 => img.into_rgba8().into_raw(),
    };
    Raster::from_raw(w, h, layout, data)
}

/// Encode `raster` to `path`, creating parent directories. The format follows the extension.
pub fn save_raster(raster: &Raster, path: impl AsRef<Path>) -> PainterlyResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let color = match raster.layout {
        PixelLayout::Gray8 => ExtendedColorType::L8,
        PixelLayout::Rgb8 => ExtendedColorType::Rgb8,
        PixelLayout::Rgba8 => ExtendedColorType::Rgba8,
    };
    image::save_buffer(path, &raster.data, raster.width, raster.height, color)
        .with_context(|| format!("write '{}'", path.display()))?;
    Ok(())
}

/// Parse a JSON parameter file; missing fields take their defaults.
pub fn load_params(path: impl AsRef<Path>) -> PainterlyResult<PaintParams> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(PainterlyError::FileNotFound(path.to_path_buf()));
    }
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read '{}'", path.display()))?;
    serde_json::from_str(&text)
        .map_err(|e| PainterlyError::serde(format!("'{}': {e}", path.display())))
}

/// `<out_dir>/<input stem>_<suffix>.png`.
pub fn output_path(out_dir: impl AsRef<Path>, input: impl AsRef<Path>, suffix: &str) -> PathBuf {
    let stem = input
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_owned());
    out_dir.as_ref().join(format!("{stem}_{suffix}.png"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/io.rs"]
mod tests;
