use crate::foundation::math::{mix64, sine_sum};

/// Deterministic SplitMix64 stream.
///
/// Every procedural value in the crate (stroke geometry, schedule jitter,
/// carousel layer seeds) is drawn from one of these, seeded from structural
/// indices only, so identical inputs always reproduce identical output.
#[derive(Clone, Copy, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        mix64(self.state)
    }

    pub fn next_f64_01(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }

    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64_01()
    }

    /// Signed value in `[-amp, amp)`.
    pub fn signed(&mut self, amp: f64) -> f64 {
        self.range(-amp, amp)
    }

    pub fn below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        self.next_u64() % n
    }
}

/// A small stack of sine terms used for organic edge irregularity.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SineStack {
    /// `(frequency in cycles per unit, amplitude, phase in radians)`.
    pub terms: Vec<(f64, f64, f64)>,
}

impl SineStack {
    /// Terms at roughly doubling frequencies with halving amplitudes, randomized a little.
    pub fn octaves(rng: &mut Rng64, count: usize, base_freq: f64, amp: f64) -> Self {
        let mut terms = Vec::with_capacity(count);
        let mut freq = base_freq;
        let mut a = amp;
        for _ in 0..count {
            let f = freq * rng.range(0.8, 1.25);
            let phase = rng.range(0.0, std::f64::consts::TAU);
            terms.push((f, a * rng.range(0.7, 1.0), phase));
            freq *= 2.1;
            a *= 0.5;
        }
        Self { terms }
    }

    pub fn sample(&self, u: f64) -> f64 {
        sine_sum(u, &self.terms)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/proc.rs"]
mod tests;
