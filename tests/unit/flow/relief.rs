use super::*;
use crate::{
    color::lab::to_lab,
    flow::{field::compute_flow, tensor::FlowParams},
};

fn vertical_edge(w: u32, h: u32) -> Raster {
    let mut r = Raster::filled(w, h, PixelLayout::Rgb8, &[10, 10, 10]).unwrap();
    for y in 0..h {
        for x in w / 2..w {
            r.pixel_mut(x, y).copy_from_slice(&[240, 240, 240]);
        }
    }
    r
}

#[test]
fn flat_image_normalizes_to_one() {
    let r = Raster::filled(12, 9, PixelLayout::Rgb8, &[90, 120, 60]).unwrap();
    let flow = compute_flow(&r, &FlowParams::default()).unwrap();
    let h = blur_along_flow(&to_lab(&r), &flow, &ReliefParams::default()).unwrap();
    assert!(h.data.iter().all(|v| (v - 1.0).abs() < 1e-4));
}

#[test]
fn black_image_stays_finite() {
    let r = Raster::new(6, 6, PixelLayout::Rgb8).unwrap();
    let flow = compute_flow(&r, &FlowParams::default()).unwrap();
    let h = blur_along_flow(&to_lab(&r), &flow, &ReliefParams::default()).unwrap();
    assert!(h.data.iter().all(|v| v.is_finite() && *v >= 0.0 && *v <= 1.0));
    assert!(h.data.iter().all(|v| *v == h.data[0]));
}

#[test]
fn blur_runs_along_the_edge_not_across_it() {
    let r = vertical_edge(48, 48);
    let flow = compute_flow(&r, &FlowParams::default()).unwrap();
    let h = blur_along_flow(&to_lab(&r), &flow, &ReliefParams::default()).unwrap();
    assert!(h.get(20, 24) < 0.1, "dark side {}", h.get(20, 24));
    assert!(h.get(27, 24) > 0.9, "bright side {}", h.get(27, 24));
}

#[test]
fn mismatched_flow_is_rejected() {
    let a = Raster::new(6, 6, PixelLayout::Rgb8).unwrap();
    let b = Raster::new(5, 6, PixelLayout::Rgb8).unwrap();
    let flow = compute_flow(&b, &FlowParams::default()).unwrap();
    let err = blur_along_flow(&to_lab(&a), &flow, &ReliefParams::default()).unwrap_err();
    assert!(err.to_string().contains("validation error:"));
}

#[test]
fn invalid_sigmas_are_rejected() {
    let params = ReliefParams {
        sigma_n: 0.0,
        ..Default::default()
    };
    assert!(params.validate().is_err());
}

#[test]
fn flat_height_points_straight_up() {
    let h = FloatRaster::from_raw(4, 4, vec![0.5; 16]).unwrap();
    let n = normal_map(&h, 1.0).unwrap();
    for px in n.data.chunks_exact(3) {
        assert_eq!(px, &[128, 128, 255]);
    }
}

#[test]
fn rising_slope_tilts_normal_backwards() {
    let mut h = FloatRaster::new(9, 9).unwrap();
    for y in 0..9 {
        for x in 0..9 {
            h.set(x, y, x as f32 * 0.25);
        }
    }
    let n = normal_map(&h, 4.0).unwrap();
    let px = n.pixel(4, 4);
    assert!(px[0] < 128);
    assert_eq!(px[1], 128);
    assert!(px[2] < 255);
}
