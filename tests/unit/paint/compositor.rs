use image::GrayImage;

use super::*;
use crate::{
    flow::{field::compute_flow, tensor::FlowParams},
    foundation::raster::PixelLayout,
};

fn disc_brush() -> BrushAsset {
    BrushAsset::from_gray(GrayImage::from_fn(16, 16, |x, y| {
        let dx = x as f32 - 7.5;
        let dy = y as f32 - 7.5;
        image::Luma([if dx * dx + dy * dy <= 56.0 { 255 } else { 0 }])
    }))
    .unwrap()
}

fn gradient(w: u32, h: u32) -> Raster {
    let mut r = Raster::new(w, h, PixelLayout::Rgb8).unwrap();
    for y in 0..h {
        for x in 0..w {
            r.pixel_mut(x, y)
                .copy_from_slice(&[(x * 7 % 256) as u8, (y * 5 % 256) as u8, 120]);
        }
    }
    r
}

#[test]
fn tile_error_finds_worst_pixel() {
    let reference = gradient(8, 8);
    let mut canvas = reference.clone();
    let tile = canvas.tile(0, 0, 8);
    let (mean, seed) = tile_error(&canvas, &to_lab(&reference), tile);
    assert_eq!(mean, 0.0);
    assert_eq!(seed, (0, 0));

    canvas.pixel_mut(5, 3).copy_from_slice(&[255, 0, 255]);
    let (mean, seed) = tile_error(&canvas, &to_lab(&reference), tile);
    assert!(mean > 0.0);
    assert_eq!(seed, (5, 3));
}

#[test]
fn mismatched_flow_is_rejected() {
    let img = gradient(16, 16);
    let flow = compute_flow(&gradient(8, 8), &FlowParams::default()).unwrap();
    let mut painter = LayeredPainter::new(PaintParams::default(), disc_brush()).unwrap();
    assert!(matches!(
        painter.paint(&img, &flow),
        Err(PainterlyError::Validation(_))
    ));
}

#[test]
fn mismatched_secondary_is_rejected() {
    let img = gradient(16, 16);
    let flow = compute_flow(&img, &FlowParams::default()).unwrap();
    let mut painter = LayeredPainter::new(PaintParams::default(), disc_brush()).unwrap();
    assert!(
        painter
            .paint_with_secondary(&img, &flow, &gradient(16, 12))
            .is_err()
    );
}

#[test]
fn invalid_params_fail_construction() {
    let params = PaintParams {
        step_divisor: 0,
        ..Default::default()
    };
    assert!(LayeredPainter::new(params, disc_brush()).is_err());
}

#[test]
fn first_pass_strokes_every_tile() {
    let img = gradient(20, 12);
    let flow = compute_flow(&img, &FlowParams::default()).unwrap();
    let mut params = PaintParams::default();
    params.set_brush_sizes(&[8]).unwrap();
    let mut painter = LayeredPainter::new(params, disc_brush()).unwrap();
    let out = painter.paint(&img, &flow).unwrap();

    // 3 x 2 grid, the right column and bottom row cropped.
    assert_eq!(out.strokes.len(), 6);
    assert_eq!(out.strokes[2].tile, TileRect { x: 16, y: 0, width: 4, height: 8 });
    assert!(out.strokes.iter().all(|s| s.pass == 0 && !s.stamps.is_empty()));
    assert!(out.stamp_count() <= 6 * painter.params().pastes_per_stroke);
    assert!(out.secondary.is_none());
}

#[test]
fn solid_init_matches_layout() {
    let params = PaintParams {
        canvas_init: CanvasInit::Solid([10, 20, 30, 40]),
        ..Default::default()
    };
    let painter = LayeredPainter::new(params, disc_brush()).unwrap();
    let gray = Raster::new(3, 3, PixelLayout::Gray8).unwrap();
    let rgba = Raster::new(3, 3, PixelLayout::Rgba8).unwrap();
    assert_eq!(painter.initial_canvas(&gray).unwrap().pixel(1, 1), &[10]);
    assert_eq!(
        painter.initial_canvas(&rgba).unwrap().pixel(2, 0),
        &[10, 20, 30, 40]
    );
}

#[test]
fn empty_image_paints_nothing() {
    let img = Raster::new(0, 0, PixelLayout::Rgb8).unwrap();
    let flow = compute_flow(&img, &FlowParams::default()).unwrap();
    let mut painter = LayeredPainter::new(PaintParams::default(), disc_brush()).unwrap();
    let out = painter.paint(&img, &flow).unwrap();
    assert!(out.strokes.is_empty());
    assert!(out.canvas.is_empty());
}
