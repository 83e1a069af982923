use std::f64::consts::TAU;

/// SplitMix64 finalizer. Used to turn structured keys into well-spread seeds.
pub(crate) fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Combine two indices into one seed; order matters.
pub(crate) fn seed2(a: u64, b: u64) -> u64 {
    mix64(mix64(a.wrapping_add(0x9E37_79B9_7F4A_7C15)) ^ b.wrapping_mul(0xD6E8_FEB8_6659_FD93))
}

/// Euclidean modulus for floats; result is always in `[0, m)` for `m > 0`.
pub(crate) fn wrap(v: f64, m: f64) -> f64 {
    let r = v.rem_euclid(m);
    // rem_euclid can round up to exactly `m` for tiny negative inputs.
    if r >= m { 0.0 } else { r }
}

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Inverse lerp clamped to `[0, 1]`; a degenerate span yields a hard step at `a`.
pub(crate) fn unlerp_clamped(a: f64, b: f64, v: f64) -> f64 {
    if (b - a).abs() <= f64::EPSILON {
        return if v >= a { 1.0 } else { 0.0 };
    }
    ((v - a) / (b - a)).clamp(0.0, 1.0)
}

/// Deterministic "hash noise" in `[-1, 1]` built from trigonometry of a seed.
pub(crate) fn trig_jitter(seed: f64, salt: f64) -> f64 {
    (seed * 12.9898 + salt * 78.233).sin()
}

/// Sum of sines at the given `(frequency, amplitude, phase)` terms, with `u` in turns.
pub(crate) fn sine_sum(u: f64, terms: &[(f64, f64, f64)]) -> f64 {
    terms
        .iter()
        .map(|&(freq, amp, phase)| amp * (TAU * freq * u + phase).sin())
        .sum()
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
