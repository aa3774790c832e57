use super::*;

fn horizontal_bar(size: u32) -> GrayImage {
    GrayImage::from_fn(size, size, |_, y| {
        if y == size / 2 - 1 || y == size / 2 {
            image::Luma([255])
        } else {
            image::Luma([0])
        }
    })
}

#[test]
fn load_missing_file_is_asset_not_found() {
    let err = BrushAsset::load("target/definitely/missing/brush.png").unwrap_err();
    assert!(matches!(err, PainterlyError::AssetNotFound(_)));
}

#[test]
fn load_reads_png_from_disk() {
    let dir = std::path::PathBuf::from("target").join("unit_brush_load");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("bar.png");
    horizontal_bar(16).save(&path).unwrap();

    let brush = BrushAsset::load(&path).unwrap();
    assert_eq!(brush.dimensions(), (16, 16));
}

#[test]
fn empty_bitmap_is_rejected() {
    assert!(BrushAsset::from_gray(GrayImage::new(0, 0)).is_err());
}

#[test]
fn scale_produces_requested_size() {
    let brush = BrushAsset::from_gray(horizontal_bar(32)).unwrap();
    for size in [2u32, 8, 40] {
        let s = brush.scale(size).unwrap();
        assert_eq!(s.size, size);
        assert_eq!(s.alpha.len(), (size * size) as usize);
    }
    assert!(matches!(
        brush.scale(0),
        Err(PainterlyError::InvalidBrushSize(0))
    ));
}

#[test]
fn rotation_by_0_is_identity() {
    let s = BrushAsset::from_gray(horizontal_bar(8))
        .unwrap()
        .scale(8)
        .unwrap();
    assert_eq!(s.rotated(0.0), s);
}

#[test]
fn rotation_by_90_turns_bar_vertical() {
    let s = Stencil {
        size: 8,
        alpha: horizontal_bar(8).into_raw(),
    };
    let r = s.rotated(90.0);
    for y in 0..8 {
        assert_eq!(r.get(3, y), 255, "row {y}");
        assert_eq!(r.get(4, y), 255, "row {y}");
        assert_eq!(r.get(0, y), 0);
        assert_eq!(r.get(7, y), 0);
    }
}

#[test]
fn rotated_set_spacing_and_buckets() {
    let brush = BrushAsset::from_gray(horizontal_bar(16)).unwrap();
    let set = brush.rotated_set(8, 0.0, 16).unwrap();
    assert_eq!(set.len(), 16);
    assert_eq!(set.bucket_width_deg(), 22.5);
    assert_eq!(set.bucket_for_angle(0.0), 0);
    assert_eq!(set.bucket_for_angle(22.4), 0);
    assert_eq!(set.bucket_for_angle(22.5), 1);
    assert_eq!(set.bucket_for_angle(359.9), 15);
    assert_eq!(set.bucket_for_angle(360.0), 0);
    assert_eq!(set.bucket_for_angle(-10.0), 15);
    assert_eq!(set.get(4), &brush.scale(8).unwrap().rotated(90.0));
    assert_eq!(set.get(0).size, 8);

    assert!(brush.rotated_set(8, 0.0, 0).is_err());
}

#[test]
fn soft_disc_is_opaque_inside_and_clear_in_corners() {
    let brush = BrushAsset::soft_disc(32).unwrap();
    assert_eq!(brush.dimensions(), (32, 32));
    let s = brush.scale(32).unwrap();
    assert_eq!(s.get(16, 16), 255);
    assert_eq!(s.get(0, 0), 0);
    assert_eq!(s.get(31, 31), 0);
    assert!(BrushAsset::soft_disc(0).is_err());
}
