use std::collections::HashSet;

use super::*;

fn halves(w: u32, h: u32) -> Raster {
    let mut r = Raster::new(w, h, PixelLayout::Rgb8).unwrap();
    for y in 0..h {
        for x in 0..w {
            let px: [u8; 3] = if x < w / 2 { [220, 30, 30] } else { [30, 30, 220] };
            r.pixel_mut(x, y).copy_from_slice(&px);
        }
    }
    r
}

#[test]
fn segments_do_not_cross_a_strong_edge() {
    let img = halves(32, 16);
    let seg = slic(
        &img,
        &SlicParams {
            grid_step: 8,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(seg.centers.len(), 8);
    assert_eq!(seg.labels.len(), 32 * 16);
    assert!(seg.labels.iter().all(|&k| (k as usize) < seg.centers.len()));

    let mut left = HashSet::new();
    let mut right = HashSet::new();
    for y in 0..16 {
        for x in 0..32 {
            if x < 16 {
                left.insert(seg.label(x, y));
            } else {
                right.insert(seg.label(x, y));
            }
        }
    }
    assert!(left.is_disjoint(&right));
}

#[test]
fn splots_of_uniform_segments_reproduce_the_image() {
    let img = halves(32, 16);
    let seg = slic(
        &img,
        &SlicParams {
            grid_step: 8,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(seg.fill_with_center_colors(&img).unwrap(), img);
    assert!(seg.fill_with_center_colors(&halves(8, 8)).is_err());
}

#[test]
fn random_colors_are_seeded() {
    let img = halves(32, 16);
    let seg = slic(&img, &SlicParams { grid_step: 8, ..Default::default() }).unwrap();
    let a = seg.random_colors(0).unwrap();
    assert_eq!(a, seg.random_colors(0).unwrap());
    assert_ne!(a, seg.random_colors(1).unwrap());
    assert_eq!(a.pixel(0, 0), a.pixel(1, 1));
}

#[test]
fn step_larger_than_image_gives_one_segment() {
    let seg = slic(&halves(5, 5), &SlicParams::default()).unwrap();
    assert_eq!(seg.centers.len(), 1);
    assert!(seg.labels.iter().all(|&k| k == 0));
}

#[test]
fn zero_step_is_rejected() {
    let p = SlicParams {
        grid_step: 0,
        ..Default::default()
    };
    assert!(slic(&halves(4, 4), &p).is_err());
}
