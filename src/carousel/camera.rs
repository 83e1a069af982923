use crate::foundation::math::wrap;

/// Virtual camera of one carousel; the carousel tick is its only writer.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraState {
    /// Position along the travel axis, always in `[0, loop_range)`.
    pub virtual_z: f64,
    /// Input-driven speed in z units per tick; decays geometrically.
    pub velocity: f64,
}

/// Per-tick motion constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraMotion {
    /// Autonomous drift in z units per second.
    pub drift_per_sec: f64,
    /// Fraction of the accumulated velocity applied each tick.
    pub velocity_gain: f64,
    /// Multiplier applied to velocity after each tick (e.g. `0.92`).
    pub velocity_decay: f64,
}

impl CameraState {
    /// Accumulate a wheel/drag/touch delta.
    pub fn push_delta(&mut self, delta: f64, boost: f64) {
        if delta.is_finite() {
            self.velocity += delta * boost;
        }
    }

    /// Advance one tick and wrap. Returns the signed distance travelled.
    pub fn integrate(&mut self, dt_secs: f64, motion: CameraMotion, loop_range: f64) -> f64 {
        let dt = if dt_secs.is_finite() { dt_secs.max(0.0) } else { 0.0 };
        let step = motion.drift_per_sec * dt + self.velocity * motion.velocity_gain;
        self.virtual_z = wrap(self.virtual_z + step, loop_range);
        self.velocity *= motion.velocity_decay;
        if self.velocity.abs() < 1e-6 {
            self.velocity = 0.0;
        }
        step
    }
}

#[cfg(test)]
#[path = "../../tests/unit/carousel/camera.rs"]
mod tests;
