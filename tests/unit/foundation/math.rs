use super::*;

#[test]
fn wrap_stays_in_range() {
    assert_eq!(wrap(2075.0 + 780.0, 2080.0), 775.0);
    assert_eq!(wrap(-1.0, 2080.0), 2079.0);
    assert_eq!(wrap(2080.0, 2080.0), 0.0);
    let tiny = wrap(-1e-18, 2080.0);
    assert!((0.0..2080.0).contains(&tiny));
}

#[test]
fn seed2_is_order_sensitive_and_stable() {
    assert_eq!(seed2(1, 2), seed2(1, 2));
    assert_ne!(seed2(1, 2), seed2(2, 1));
}

#[test]
fn unlerp_clamps_and_handles_degenerate_span() {
    assert_eq!(unlerp_clamped(0.0, 10.0, 5.0), 0.5);
    assert_eq!(unlerp_clamped(0.0, 10.0, -5.0), 0.0);
    assert_eq!(unlerp_clamped(0.0, 10.0, 50.0), 1.0);
    assert_eq!(unlerp_clamped(3.0, 3.0, 3.0), 1.0);
    assert_eq!(unlerp_clamped(3.0, 3.0, 2.0), 0.0);
}

#[test]
fn sine_sum_of_nothing_is_zero() {
    assert_eq!(sine_sum(0.3, &[]), 0.0);
    let v = sine_sum(0.25, &[(1.0, 2.0, 0.0)]);
    assert!((v - 2.0).abs() < 1e-12);
}

#[test]
fn trig_jitter_is_bounded() {
    for i in 0..64 {
        let v = trig_jitter(i as f64 * 0.37, 1.0);
        assert!((-1.0..=1.0).contains(&v));
    }
}

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}
