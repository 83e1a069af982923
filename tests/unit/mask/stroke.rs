use super::*;

#[test]
fn generate_is_deterministic() {
    let a = generate(5, 8);
    let b = generate(5, 8);
    assert_eq!(a.len(), 40);
    assert_eq!(a, b);
}

#[test]
fn stroke_identity_depends_only_on_band_and_index() {
    let small = generate(2, 3);
    let large = generate(5, 8);
    for s in &small {
        let twin = large
            .iter()
            .find(|t| t.band_index == s.band_index && t.stroke_index == s.stroke_index)
            .unwrap();
        assert_eq!(s.seed, twin.seed);
        assert_eq!(s.motion_kind, twin.motion_kind);
        assert_eq!(s.duration_s, twin.duration_s);
        assert_eq!(s.delay_ms, twin.delay_ms);
    }
}

#[test]
fn empty_inputs_produce_no_strokes() {
    assert!(generate(0, 8).is_empty());
    assert!(generate(5, 0).is_empty());
}

#[test]
fn strokes_respect_config_ranges() {
    let cfg = MaskConfig::default();
    for s in generate(5, 8) {
        assert!(s.duration_s >= cfg.duration_s.0 && s.duration_s <= cfg.duration_s.1);
        assert!(s.spread_peak >= 1.12 && s.spread_peak <= 1.2);
        assert!(s.layers == 2 || s.layers == 3);
        assert!(s.thickness > 0.0);
        let min_delay = f64::from(s.band_index) * cfg.band_delay_ms
            + f64::from(s.stroke_index) * cfg.stroke_delay_ms;
        assert!(s.delay_ms >= min_delay && s.delay_ms <= min_delay + cfg.delay_jitter_ms);
    }
}

#[test]
fn later_bands_start_later_on_average() {
    let strokes = generate(5, 8);
    let mean = |band: u32| {
        let ds: Vec<f64> = strokes
            .iter()
            .filter(|s| s.band_index == band)
            .map(|s| s.delay_ms)
            .collect();
        ds.iter().sum::<f64>() / ds.len() as f64
    };
    for band in 1..5 {
        assert!(mean(band) > mean(band - 1));
    }
}

#[test]
fn motion_kinds_have_distinct_paths_and_easing() {
    let mut seen_endpoints = Vec::new();
    for kind in MotionKind::ALL {
        let ends = kind.endpoints();
        assert!(!seen_endpoints.contains(&ends), "{kind:?} duplicates endpoints");
        seen_endpoints.push(ends);
        assert_ne!(kind.centerline(0.5), kind.centerline(0.0));
    }
    let eases: std::collections::HashSet<_> = MotionKind::ALL.iter().map(|k| k.ease()).collect();
    assert_eq!(eases.len(), MotionKind::ALL.len());
}

#[test]
fn motion_kind_selection_covers_all_kinds() {
    let kinds: std::collections::HashSet<_> = generate(20, 20)
        .into_iter()
        .map(|s| s.motion_kind)
        .collect();
    assert_eq!(kinds.len(), MotionKind::ALL.len());
}

#[test]
fn point_at_maps_into_travel_box() {
    let s = &generate(1, 1)[0];
    let start = s.point_at(0.0);
    let (local, _) = s.motion_kind.endpoints();
    assert!((start.x - (s.origin_x + local.x * s.travel_width)).abs() < 1e-12);
    assert!((start.y - (s.origin_y + local.y * s.travel_height)).abs() < 1e-12);
}

#[test]
fn config_validation() {
    assert!(MaskConfig::default().validate().is_ok());
    let one_layer = MaskConfig {
        layer_opacities: vec![1.0],
        ..MaskConfig::default()
    };
    assert!(one_layer.validate().is_err());
    let shrink = MaskConfig {
        spread_peak: (0.9, 1.1),
        ..MaskConfig::default()
    };
    assert!(shrink.validate().is_err());
    let negative_delay = MaskConfig {
        stroke_delay_ms: -1.0,
        ..MaskConfig::default()
    };
    assert!(negative_delay.validate().is_err());
}
