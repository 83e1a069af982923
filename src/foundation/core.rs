use crate::foundation::error::{VernissageError, VernissageResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Logical animation frame number inside a sprite sequence.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u32);

impl FrameIndex {
    /// Clamp a signed request into `[0, last]`.
    pub fn clamped(n: i64, last: FrameIndex) -> Self {
        Self(n.clamp(0, i64::from(last.0)) as u32)
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> VernissageResult<Self> {
        if den == 0 {
            return Err(VernissageError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(VernissageError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    pub fn frames_to_secs(self, frames: u32) -> f64 {
        f64::from(frames) * self.frame_duration_secs()
    }

    pub fn secs_to_frames_round(self, secs: f64) -> u32 {
        (secs * self.as_f64()).round().max(0.0) as u32
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

/// Monotonically increasing token identifying one choreography generation.
///
/// Anything scheduled under an older epoch is stale and must not mutate state.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Epoch(pub u64);

impl Epoch {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Pixel dimensions of a drawing target (the host viewport).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
