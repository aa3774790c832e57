use super::*;
use crate::foundation::raster::PixelLayout;

#[test]
fn radius_0_is_identity() {
    let src = Raster::from_raw(2, 1, PixelLayout::Rgb8, vec![1, 2, 3, 4, 5, 6]).unwrap();
    assert_eq!(kuwahara(&src, 0).unwrap(), src);
}

#[test]
fn step_edge_stays_sharp() {
    let mut src = Raster::new(10, 6, PixelLayout::Gray8).unwrap();
    for y in 0..6 {
        for x in 5..10 {
            src.pixel_mut(x, y)[0] = 255;
        }
    }
    let out = kuwahara(&src, 2).unwrap();
    assert_eq!(out, src);
}

#[test]
fn isolated_outlier_is_suppressed() {
    let mut src = Raster::filled(11, 11, PixelLayout::Rgb8, &[0, 0, 0]).unwrap();
    src.pixel_mut(5, 5).copy_from_slice(&[255, 255, 255]);

    let out = kuwahara(&src, 2).unwrap();
    assert!(out.pixel(5, 5)[0] < 64);
    assert_eq!(out.pixel(6, 5), &[0, 0, 0]);
    assert_eq!(out.pixel(5, 7), &[0, 0, 0]);
}

#[test]
fn handles_rasters_smaller_than_the_window() {
    let src = Raster::filled(2, 2, PixelLayout::Rgba8, &[9, 8, 7, 255]).unwrap();
    let out = kuwahara(&src, 5).unwrap();
    assert_eq!(out, src);
}

#[test]
fn huge_radius_behaves_like_whole_image_radius() {
    let mut src = Raster::new(6, 4, PixelLayout::Rgb8).unwrap();
    for (i, b) in src.data.iter_mut().enumerate() {
        *b = (i * 37 % 251) as u8;
    }
    let whole = kuwahara(&src, 6).unwrap();
    assert_eq!(kuwahara(&src, u32::MAX).unwrap(), whole);
    assert_eq!(kuwahara(&src, u32::MAX - 1).unwrap(), whole);
}
