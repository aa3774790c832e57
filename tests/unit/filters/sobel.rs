use super::*;

fn ramp_x(w: u32, h: u32) -> FloatRaster {
    let mut p = FloatRaster::new(w, h).unwrap();
    for y in 0..h {
        for x in 0..w {
            p.set(x, y, x as f32);
        }
    }
    p
}

#[test]
fn flat_plane_has_zero_gradient() {
    let p = FloatRaster::from_raw(6, 6, vec![42.0; 36]).unwrap();
    let g = sobel5(&p).unwrap();
    assert!(g.gx.data.iter().all(|v| v.abs() < 1e-4));
    assert!(g.gy.data.iter().all(|v| v.abs() < 1e-4));
}

#[test]
fn unit_ramp_response_in_interior() {
    let p = ramp_x(12, 12);
    let g5 = sobel5(&p).unwrap();
    assert!((g5.gx.get(6, 6) - 128.0).abs() < 1e-3);
    assert!(g5.gy.get(6, 6).abs() < 1e-3);

    let g3 = sobel3(&p).unwrap();
    assert!((g3.gx.get(6, 6) - 8.0).abs() < 1e-3);
}

#[test]
fn vertical_ramp_drives_gy() {
    let mut p = FloatRaster::new(9, 9).unwrap();
    for y in 0..9 {
        for x in 0..9 {
            p.set(x, y, 2.0 * y as f32);
        }
    }
    let g = sobel5(&p).unwrap();
    assert!(g.gy.get(4, 4) > 0.0);
    assert!(g.gx.get(4, 4).abs() < 1e-3);
}
