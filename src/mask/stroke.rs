use std::f64::consts::PI;

use crate::{
    animation::{ease::Ease, proc::Rng64},
    foundation::{
        core::Point,
        error::{VernissageError, VernissageResult},
        math::{mix64, seed2},
    },
};

const STROKE_SALT: u64 = 0xB2E5_7A0C;

/// Path family a stroke follows inside its travel box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionKind {
    LeftToRight,
    RightToLeft,
    DiagonalDown,
    DiagonalUp,
    Arc,
    Wavy,
}

impl MotionKind {
    pub const ALL: [MotionKind; 6] = [
        MotionKind::LeftToRight,
        MotionKind::RightToLeft,
        MotionKind::DiagonalDown,
        MotionKind::DiagonalUp,
        MotionKind::Arc,
        MotionKind::Wavy,
    ];

    pub fn from_seed(seed: u64) -> Self {
        Self::ALL[(mix64(seed ^ 0x6D6F_7469_6F6E) % Self::ALL.len() as u64) as usize]
    }

    pub fn ease(self) -> Ease {
        match self {
            Self::LeftToRight => Ease::OutCubic,
            Self::RightToLeft => Ease::InOutQuad,
            Self::DiagonalDown => Ease::OutQuart,
            Self::DiagonalUp => Ease::InOutCubic,
            Self::Arc => Ease::InOutSine,
            Self::Wavy => Ease::OutQuad,
        }
    }

    /// Centerline in travel-box units, `s` in `[0, 1]` from start to end.
    pub fn centerline(self, s: f64) -> Point {
        let s = s.clamp(0.0, 1.0);
        match self {
            Self::LeftToRight => Point::new(s, 0.5),
            Self::RightToLeft => Point::new(1.0 - s, 0.5),
            Self::DiagonalDown => Point::new(s, s),
            Self::DiagonalUp => Point::new(s, 1.0 - s),
            Self::Arc => Point::new(s, 0.85 - 0.7 * (PI * s).sin()),
            Self::Wavy => Point::new(s, 0.35 + 0.3 * s + 0.25 * (2.0 * PI * s).sin()),
        }
    }

    pub fn endpoints(self) -> (Point, Point) {
        (self.centerline(0.0), self.centerline(1.0))
    }

    fn box_aspect(self) -> (f64, f64) {
        // Relative travel height: diagonals and curves need room to move vertically.
        match self {
            Self::LeftToRight | Self::RightToLeft => (0.0, 0.04),
            Self::DiagonalDown | Self::DiagonalUp => (0.12, 0.3),
            Self::Arc => (0.1, 0.22),
            Self::Wavy => (0.08, 0.16),
        }
    }
}

/// Tuning for stroke generation and the reveal schedule.
///
/// Positions are in mask units: the mask spans `[0, 1]` on both axes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    pub bands: u32,
    pub strokes_per_band: u32,
    pub band_delay_ms: f64,
    pub stroke_delay_ms: f64,
    pub delay_jitter_ms: f64,
    pub duration_s: (f64, f64),
    /// Stroke half-height as a fraction of band height.
    pub thickness: (f64, f64),
    /// Peak scale during the spread near the end of travel.
    pub spread_peak: (f64, f64),
    /// Fraction of a stroke's duration spent spreading before it ends, then settling after.
    pub spread_window: f64,
    /// Opacity of each overlapping paint layer; two or three entries.
    pub layer_opacities: Vec<f64>,
    /// Sine octaves perturbing the stroke edges.
    pub edge_octaves: usize,
    pub edge_amplitude: f64,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            bands: 5,
            strokes_per_band: 8,
            band_delay_ms: 180.0,
            stroke_delay_ms: 65.0,
            delay_jitter_ms: 90.0,
            duration_s: (0.55, 1.1),
            thickness: (0.55, 0.85),
            spread_peak: (1.12, 1.2),
            spread_window: 0.12,
            layer_opacities: vec![1.0, 0.7, 0.45],
            edge_octaves: 4,
            edge_amplitude: 0.22,
        }
    }
}

impl MaskConfig {
    pub fn validate(&self) -> VernissageResult<()> {
        let range_ok = |(lo, hi): (f64, f64)| lo.is_finite() && hi.is_finite() && 0.0 < lo && lo <= hi;
        if !range_ok(self.duration_s) {
            return Err(VernissageError::validation("mask duration_s must satisfy 0 < lo <= hi"));
        }
        if !range_ok(self.thickness) {
            return Err(VernissageError::validation("mask thickness must satisfy 0 < lo <= hi"));
        }
        if !range_ok(self.spread_peak) || self.spread_peak.0 < 1.0 {
            return Err(VernissageError::validation("mask spread_peak must satisfy 1 <= lo <= hi"));
        }
        if !(0.0..0.5).contains(&self.spread_window) {
            return Err(VernissageError::validation("mask spread_window must be in [0, 0.5)"));
        }
        if !(2..=3).contains(&self.layer_opacities.len()) {
            return Err(VernissageError::validation("mask needs two or three layer opacities"));
        }
        if self
            .layer_opacities
            .iter()
            .any(|o| !(0.0..=1.0).contains(o))
        {
            return Err(VernissageError::validation("mask layer opacities must be in [0, 1]"));
        }
        if [self.band_delay_ms, self.stroke_delay_ms, self.delay_jitter_ms]
            .iter()
            .any(|d| !d.is_finite() || *d < 0.0)
        {
            return Err(VernissageError::validation("mask delays must be finite and >= 0"));
        }
        Ok(())
    }
}

/// One brush stroke. A pure function of `(band_index, stroke_index)` and the config.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stroke {
    pub band_index: u32,
    pub stroke_index: u32,
    /// Top-left of the travel box, in mask units.
    pub origin_x: f64,
    pub origin_y: f64,
    pub travel_width: f64,
    pub travel_height: f64,
    pub motion_kind: MotionKind,
    pub delay_ms: f64,
    pub duration_s: f64,
    pub seed: u64,
    /// Half-height of the painted body, in mask units.
    pub thickness: f64,
    /// Number of overlapping paint layers (2 or 3).
    pub layers: u8,
    pub spread_peak: f64,
}

impl Stroke {
    /// Centerline point in mask units.
    pub fn point_at(&self, s: f64) -> Point {
        let local = self.motion_kind.centerline(s);
        Point::new(
            self.origin_x + local.x * self.travel_width,
            self.origin_y + local.y * self.travel_height,
        )
    }

    pub fn end_ms(&self) -> f64 {
        self.delay_ms + self.duration_s * 1000.0
    }
}

/// Generate the default stroke set shape for `band_count × strokes_per_band`.
pub fn generate(band_count: u32, strokes_per_band: u32) -> Vec<Stroke> {
    generate_with(&MaskConfig::default(), band_count, strokes_per_band)
}

/// Generate strokes, band by band. Same inputs always give the same strokes.
#[tracing::instrument(skip(cfg))]
pub fn generate_with(cfg: &MaskConfig, band_count: u32, strokes_per_band: u32) -> Vec<Stroke> {
    let mut out = Vec::with_capacity(band_count as usize * strokes_per_band as usize);
    if band_count == 0 || strokes_per_band == 0 {
        return out;
    }
    let band_h = 1.0 / f64::from(band_count);
    let layer_count = cfg.layer_opacities.len().clamp(2, 3);

    for band in 0..band_count {
        let band_center = (f64::from(band) + 0.5) * band_h;
        for index in 0..strokes_per_band {
            let seed = seed2(seed2(STROKE_SALT, u64::from(band)), u64::from(index));
            let mut rng = Rng64::new(seed);
            let motion_kind = MotionKind::from_seed(seed);
            let (h_lo, h_hi) = motion_kind.box_aspect();

            // Spread strokes over the band so consecutive ones overlap horizontally.
            let slot = f64::from(index) / f64::from(strokes_per_band);
            let travel_width = rng.range(0.55, 0.95);
            let origin_x = slot * (1.0 - travel_width * 0.5) - 0.2 + rng.signed(0.08);
            let travel_height = rng.range(h_lo, h_hi.max(h_lo));
            let origin_y = band_center - travel_height * 0.5 + rng.signed(band_h * 0.25);

            let delay_ms = f64::from(band) * cfg.band_delay_ms
                + f64::from(index) * cfg.stroke_delay_ms
                + rng.range(0.0, cfg.delay_jitter_ms);
            let duration_s = rng.range(cfg.duration_s.0, cfg.duration_s.1);
            let thickness = band_h * rng.range(cfg.thickness.0, cfg.thickness.1);
            let spread_peak = rng.range(cfg.spread_peak.0, cfg.spread_peak.1);
            let layers = if layer_count == 3 && rng.below(3) > 0 { 3 } else { 2 };

            out.push(Stroke {
                band_index: band,
                stroke_index: index,
                origin_x,
                origin_y,
                travel_width,
                travel_height,
                motion_kind,
                delay_ms,
                duration_s,
                seed,
                thickness,
                layers,
                spread_peak,
            });
        }
    }
    tracing::debug!(strokes = out.len(), "generated brush strokes");
    out
}

#[cfg(test)]
#[path = "../../tests/unit/mask/stroke.rs"]
mod tests;
