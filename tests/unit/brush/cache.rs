use image::GrayImage;

use super::*;

fn disc_brush() -> BrushAsset {
    BrushAsset::from_gray(GrayImage::from_fn(16, 16, |x, y| {
        let dx = x as f32 - 7.5;
        let dy = y as f32 - 7.5;
        image::Luma([if dx * dx + dy * dy <= 49.0 { 255 } else { 0 }])
    }))
    .unwrap()
}

#[test]
fn sets_are_built_once_per_size() {
    let mut cache = StencilCache::new(disc_brush(), 0.0, 8).unwrap();
    assert!(cache.is_empty());

    let a = cache.get_or_build(10).unwrap();
    let b = cache.get_or_build(10).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cache.len(), 1);

    let c = cache.get_or_build(4).unwrap();
    assert_eq!(c.size, 4);
    assert_eq!(c.len(), 8);
    assert_eq!(cache.len(), 2);
}

#[test]
fn zero_directions_is_rejected() {
    assert!(StencilCache::new(disc_brush(), 0.0, 0).is_err());
}
