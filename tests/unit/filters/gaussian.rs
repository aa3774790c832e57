use super::*;
use crate::foundation::raster::PixelLayout;

#[test]
fn blur_sigma_0_is_identity() {
    let src = Raster::from_raw(1, 2, PixelLayout::Rgba8, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    let out = blur_raster(&src, 0.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_constant_image_is_identity() {
    let src = Raster::filled(4, 3, PixelLayout::Rgb8, &[10, 20, 30]).unwrap();
    let out = blur_raster(&src, 2.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_spreads_energy_from_single_pixel() {
    let mut src = Raster::new(7, 7, PixelLayout::Gray8).unwrap();
    src.pixel_mut(3, 3)[0] = 255;

    let out = blur_raster(&src, 0.8).unwrap();

    let nonzero = out.data.iter().filter(|&&v| v != 0).count();
    assert!(nonzero > 1);

    let sum: u32 = out.data.iter().map(|&v| u32::from(v)).sum();
    assert!((sum as i32 - 255).abs() <= 8);
}

#[test]
fn blur_rejects_nan_sigma() {
    let src = Raster::new(2, 2, PixelLayout::Rgb8).unwrap();
    assert!(blur_raster(&src, f32::NAN).is_err());
}

#[test]
fn plane_blur_preserves_mass_and_constants() {
    let flat = FloatRaster::from_raw(5, 4, vec![3.5; 20]).unwrap();
    let out = blur_plane(&flat, 2.0).unwrap();
    assert!(out.data.iter().all(|v| (v - 3.5).abs() < 1e-4));

    let mut spike = FloatRaster::new(15, 15).unwrap();
    spike.set(7, 7, 1.0);
    let out = blur_plane(&spike, 1.0).unwrap();
    let total: f32 = out.data.iter().sum();
    assert!((total - 1.0).abs() < 1e-3);
    assert!(out.get(7, 7) < 1.0 && out.get(7, 7) > out.get(9, 7));
}

#[test]
fn kernel_radius_covers_three_sigma() {
    assert_eq!(kernel_radius(2.0), 6);
    assert_eq!(kernel_radius(0.4), 2);
    assert_eq!(kernel_radius(0.0), 0);
    assert_eq!(kernel_radius(-1.0), 0);
}

#[test]
fn both_paths_blur_along_each_axis() {
    let mut row = Raster::new(9, 9, PixelLayout::Gray8).unwrap();
    let mut col = FloatRaster::new(9, 9).unwrap();
    for i in 0..9 {
        row.pixel_mut(i, 4)[0] = 200;
        col.set(4, i, 1.0);
    }

    let row = blur_raster(&row, 1.0).unwrap();
    assert!(row.pixel(4, 3)[0] > 0 && row.pixel(4, 3)[0] == row.pixel(0, 3)[0]);
    assert!(row.pixel(4, 4)[0] < 200);

    let col = blur_plane(&col, 1.0).unwrap();
    assert!(col.get(3, 4) > 0.0 && (col.get(3, 4) - col.get(3, 0)).abs() < 1e-6);
    assert!(col.get(4, 4) < 1.0);
}
