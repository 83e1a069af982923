use super::*;

fn layers(cfg: &CarouselConfig, n: usize) -> Vec<CarouselLayer> {
    (0..n)
        .map(|i| CarouselLayer::new(i, format!("art-{i}"), cfg))
        .collect()
}

#[test]
fn layers_are_deterministic_per_index() {
    let cfg = CarouselConfig::default();
    let a = layers(&cfg, 8);
    let b = layers(&cfg, 8);
    assert_eq!(a, b);
    assert_ne!(a[0].phase_seed, a[1].phase_seed);
    for layer in &a {
        assert!(layer.lateral_jitter.abs() <= cfg.lateral_jitter + 1e-12);
        assert!(layer.vertical_jitter >= 0.0 && layer.vertical_jitter <= cfg.vertical_jitter + 1e-12);
    }
}

#[test]
fn travel_wraps_at_loop_range() {
    let loop_range = 8.0 * 260.0;
    assert_eq!(loop_range, 2080.0);
    let t0 = travel_fraction(0, 2075.0, loop_range, 260.0);
    let t3 = travel_fraction(3, 2075.0, loop_range, 260.0);
    assert!((t0 * loop_range - 2075.0).abs() < 1e-9);
    assert!((t3 * loop_range - 775.0).abs() < 1e-9);
}

#[test]
fn place_reports_depth_relative_to_camera() {
    let cfg = CarouselConfig::default();
    let all = layers(&cfg, 8);
    let p0 = place(&all[0], 0, 2075.0, 2080.0, &cfg);
    let p3 = place(&all[3], 3, 2075.0, 2080.0, &cfg);
    assert!((p0.depth_z + 5.0).abs() < 1e-9);
    assert!((p3.depth_z - (775.0 - 2080.0)).abs() < 1e-9);
    assert!(p0.scale > p3.scale);
    assert_eq!(p3.layer, 3);
}

#[test]
fn opacity_bands() {
    let cfg = CarouselConfig::default();
    assert_eq!(depth_opacity(0.0, &cfg), 0.0);
    assert_eq!(depth_opacity(0.2, &cfg), 0.0);
    let mid = depth_opacity(0.5, &cfg);
    assert!(mid > 0.0 && mid < 1.0);
    assert_eq!(depth_opacity(0.7, &cfg), 1.0);
    assert!((depth_opacity(0.97, &cfg) - 0.5).abs() < 1e-9);
    assert!(depth_opacity(0.9999, &cfg) < 0.01);
}

#[test]
fn lateral_side_alternates_by_parity() {
    let cfg = CarouselConfig {
        lateral_jitter: 0.0,
        ..CarouselConfig::default()
    };
    let all = layers(&cfg, 4);
    for (i, layer) in all.iter().enumerate() {
        let p = place(layer, i, 500.0, 1040.0, &cfg);
        if i % 2 == 0 {
            assert!(p.x < 0.0, "layer {i} should sit left, x={}", p.x);
        } else {
            assert!(p.x > 0.0, "layer {i} should sit right, x={}", p.x);
        }
    }
}

#[test]
fn placement_is_identical_one_loop_apart() {
    let cfg = CarouselConfig::default();
    let all = layers(&cfg, 8);
    for (i, layer) in all.iter().enumerate() {
        let a = place(layer, i, 10.0, 2080.0, &cfg);
        let b = place(layer, i, 2090.0, 2080.0, &cfg);
        let c = place(layer, i, 10.0 - 2080.0, 2080.0, &cfg);
        assert_eq!(a, b);
        assert_eq!(a, c);
    }
}

#[test]
fn visible_placement_is_continuous_across_the_seam() {
    let cfg = CarouselConfig::default();
    let all = layers(&cfg, 8);
    let loop_range = 2080.0;
    let step = 0.05;
    let mut z = loop_range - 50.0;
    while z < loop_range + 50.0 {
        for (i, layer) in all.iter().enumerate() {
            let a = place(layer, i, z, loop_range, &cfg);
            let b = place(layer, i, z + step, loop_range, &cfg);
            assert!(
                (a.opacity - b.opacity).abs() < 0.01,
                "opacity jump for layer {i} at z={z}"
            );
            if a.opacity > 1e-3 && b.opacity > 1e-3 {
                assert!((a.scale - b.scale).abs() < 0.01);
                assert!((a.x - b.x).abs() < 0.01);
                assert!((a.y - b.y).abs() < 0.01);
            }
        }
        z += step;
    }
}
