use super::*;

#[test]
fn new_surface_is_transparent() {
    let s = Surface::new(3, 2);
    assert_eq!(s.data().len(), 3 * 2 * 4);
    assert!(s.data().iter().all(|&b| b == 0));
    assert_eq!(s.pixel(3, 0), None);
}

#[test]
fn resize_reallocates_and_clears() {
    let mut s = Surface::new(2, 2);
    s.data_mut().copy_from_slice(&[255, 0, 0, 255].repeat(4));
    s.resize(Viewport::new(2, 2)).unwrap();
    assert_eq!(s.pixel(1, 1), Some([255, 0, 0, 255]));
    s.resize(Viewport::new(4, 1)).unwrap();
    assert_eq!(s.viewport(), Viewport::new(4, 1));
    assert!(s.data().iter().all(|&b| b == 0));
}

#[test]
fn oversized_viewport_is_rejected() {
    assert!(Surface::for_viewport(Viewport::new(70_000, 10)).is_err());
    let mut s = Surface::for_viewport(Viewport::new(8, 6)).unwrap();
    assert!(s.resize(Viewport::new(8, 70_000)).is_err());
    assert_eq!(s.viewport(), Viewport::new(8, 6));
}

#[test]
fn equality_compares_size_and_pixels() {
    let a = Surface::new(2, 3);
    let mut b = Surface::new(2, 3);
    assert_eq!(a, b);
    b.data_mut()[0] = 1;
    assert_ne!(a, b);
    assert_ne!(Surface::new(3, 2), Surface::new(2, 3));
}

#[test]
fn straight_export_unpremultiplies() {
    let mut s = Surface::new(1, 1);
    s.data_mut().copy_from_slice(&[128, 0, 0, 128]);
    let out = s.to_straight_rgba8();
    assert_eq!(out[3], 128);
    assert!(out[0] >= 254);
}

#[test]
fn save_png_rejects_empty_surface() {
    let s = Surface::new(0, 0);
    assert!(s.save_png(std::path::Path::new("target/never.png")).is_err());
}
