use image::GrayImage;

use super::*;
use crate::{
    brush::stencil::BrushAsset,
    flow::{field::compute_flow, tensor::FlowParams},
    foundation::raster::PixelLayout,
};

fn flat_flow(w: u32, h: u32) -> FlowField {
    let img = Raster::filled(w, h, PixelLayout::Rgb8, &[90, 90, 90]).unwrap();
    compute_flow(&img, &FlowParams::default()).unwrap()
}

fn square_set(size: u32) -> StencilSet {
    BrushAsset::from_gray(GrayImage::from_pixel(4, 4, image::Luma([255])))
        .unwrap()
        .rotated_set(size, 0.0, 16)
        .unwrap()
}

#[test]
fn flat_field_walks_along_default_tangent() {
    let flow = flat_flow(32, 32);
    let set = square_set(8);
    let walk = Walk {
        pastes: 8,
        step: 2.0,
        coherence_threshold: 12.0,
    };
    let stamps = walk.trace(&flow, &set, (0, 5));
    assert_eq!(stamps.len(), 8);
    for (i, s) in stamps.iter().enumerate() {
        assert_eq!((s.x, s.y), (2 * i as u32, 5));
        assert_eq!(s.bucket, 0);
    }
}

#[test]
fn walk_stops_at_the_raster_edge() {
    let flow = flat_flow(32, 32);
    let set = square_set(8);
    let walk = Walk {
        pastes: 8,
        step: 2.0,
        coherence_threshold: 12.0,
    };
    let stamps = walk.trace(&flow, &set, (28, 0));
    assert_eq!(stamps.len(), 2);
    assert_eq!((stamps[1].x, stamps[1].y), (30, 0));
}

#[test]
fn coherent_region_stops_after_first_stamp() {
    let flow = flat_flow(16, 16);
    let set = square_set(8);
    // ln(EPSILON) is about -13.8, above this threshold.
    let walk = Walk {
        pastes: 8,
        step: 2.0,
        coherence_threshold: -20.0,
    };
    assert_eq!(walk.trace(&flow, &set, (3, 3)).len(), 1);
}

#[test]
fn paste_is_clipped_to_bounds() {
    let mut canvas = Raster::new(8, 8, PixelLayout::Rgb8).unwrap();
    let stencil = Stencil {
        size: 4,
        alpha: vec![255; 16],
    };
    paste(&mut canvas, &stencil, 0, 0, [200, 100, 50, 255]);
    for y in 0..8 {
        for x in 0..8 {
            let want: &[u8] = if x < 2 && y < 2 { &[200, 100, 50] } else { &[0, 0, 0] };
            assert_eq!(canvas.pixel(x, y), want, "({x}, {y})");
        }
    }
}

#[test]
fn paste_blends_by_stencil_alpha() {
    let mut canvas = Raster::new(4, 4, PixelLayout::Gray8).unwrap();
    let stencil = Stencil {
        size: 2,
        alpha: vec![128, 0, 0, 255],
    };
    paste(&mut canvas, &stencil, 2, 2, [200, 0, 0, 0]);
    assert_eq!(canvas.pixel(1, 1), &[100]);
    assert_eq!(canvas.pixel(2, 1), &[0]);
    assert_eq!(canvas.pixel(2, 2), &[200]);
}
