use crate::{
    carousel::{
        camera::{CameraMotion, CameraState},
        layers::{CarouselLayer, Placement, place, travel_fraction},
    },
    foundation::error::{VernissageError, VernissageResult},
};

/// Tuning for the depth carousel. Distances are in virtual z units.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    /// Spacing between consecutive layers; the loop range is `layers × per_layer_z`.
    pub per_layer_z: f64,
    /// Offset subtracted from travel to get depth; defaults to the loop range.
    pub z_range: Option<f64>,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Normalized travel below which layers are invisible.
    pub fade_start: f64,
    /// Normalized travel at which layers reach full opacity.
    pub fade_full: f64,
    /// Final fraction of travel over which a layer fades out while passing the camera.
    pub exit_fade: f64,
    pub drift_per_sec: f64,
    pub velocity_decay: f64,
    /// Scale applied to raw input deltas before they join the velocity.
    pub velocity_boost: f64,
    pub velocity_gain: f64,
    /// Normalized travel a layer must reach to count as arrived in single-pass mode.
    pub arrival_threshold: f64,
    /// Drift multiplier while in single-pass mode.
    pub single_pass_rush: f64,
    /// Base horizontal distance from center, alternating sides by layer parity.
    pub lateral_spread: f64,
    pub lateral_jitter: f64,
    pub vertical_jitter: f64,
    /// Sway oscillations over one full trip from the back to the camera.
    pub sway_cycles: f64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            per_layer_z: 260.0,
            z_range: None,
            min_scale: 0.35,
            max_scale: 1.25,
            fade_start: 1.0 / 3.0,
            fade_full: 0.6,
            exit_fade: 0.06,
            drift_per_sec: 90.0,
            velocity_decay: 0.92,
            velocity_boost: 0.35,
            velocity_gain: 1.0,
            arrival_threshold: 0.9,
            single_pass_rush: 5.0,
            lateral_spread: 0.22,
            lateral_jitter: 0.06,
            vertical_jitter: 0.05,
            sway_cycles: 1.5,
        }
    }
}

impl CarouselConfig {
    pub fn validate(&self) -> VernissageResult<()> {
        let positive_finite = |v: f64| v.is_finite() && v > 0.0;
        if !positive_finite(self.per_layer_z) {
            return Err(VernissageError::validation("carousel per_layer_z must be > 0"));
        }
        if let Some(z) = self.z_range
            && !positive_finite(z)
        {
            return Err(VernissageError::validation("carousel z_range must be > 0"));
        }
        if !(positive_finite(self.min_scale) && self.max_scale >= self.min_scale) {
            return Err(VernissageError::validation(
                "carousel scales must satisfy 0 < min_scale <= max_scale",
            ));
        }
        let band_ok = 0.0 <= self.fade_start
            && self.fade_start <= self.fade_full
            && self.fade_full <= 1.0 - self.exit_fade
            && self.exit_fade >= 0.0;
        if !band_ok {
            return Err(VernissageError::validation(
                "carousel opacity bands must satisfy 0 <= fade_start <= fade_full <= 1 - exit_fade",
            ));
        }
        if !(0.0..1.0).contains(&self.velocity_decay) {
            return Err(VernissageError::validation(
                "carousel velocity_decay must be in [0, 1)",
            ));
        }
        if !(0.0..1.0).contains(&self.arrival_threshold) {
            return Err(VernissageError::validation(
                "carousel arrival_threshold must be in [0, 1)",
            ));
        }
        if !(self.drift_per_sec.is_finite() && self.single_pass_rush.is_finite()) {
            return Err(VernissageError::validation("carousel rates must be finite"));
        }
        Ok(())
    }

    fn motion(&self, rush: f64) -> CameraMotion {
        CameraMotion {
            drift_per_sec: self.drift_per_sec * rush,
            velocity_gain: self.velocity_gain,
            velocity_decay: self.velocity_decay,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CarouselMode {
    /// Layers loop through the camera indefinitely.
    Looping,
    /// Every layer passes the camera once, then the carousel reports arrival.
    SinglePass,
}

/// Output of one carousel tick.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CarouselTick {
    pub placements: Vec<Placement>,
    /// Set exactly once, on the tick where the last layer arrives in single-pass mode.
    pub arrived: bool,
}

#[derive(Clone, Debug)]
struct PassTracker {
    last_t: Vec<f64>,
    arrived: Vec<bool>,
    retired: Vec<bool>,
    reported: bool,
}

impl PassTracker {
    fn new(initial_t: Vec<f64>) -> Self {
        let n = initial_t.len();
        Self {
            last_t: initial_t,
            arrived: vec![false; n],
            retired: vec![false; n],
            reported: false,
        }
    }

    /// Record a layer's new travel fraction `t` after the camera moved by
    /// `advance` (signed, in loop fractions).
    fn observe(&mut self, index: usize, t: f64, advance: f64, threshold: f64) {
        let reached = self.last_t[index] + advance;
        if reached >= 1.0 {
            // Passed the camera plane: it has arrived and must not come around again.
            self.arrived[index] = true;
            self.retired[index] = true;
        } else if reached >= 0.0 && t >= threshold {
            self.arrived[index] = true;
        }
        self.last_t[index] = t;
    }

    fn all_arrived(&self) -> bool {
        self.arrived.iter().all(|&a| a)
    }
}

/// Camera flying through flat artwork layers.
#[derive(Clone, Debug)]
pub struct DepthCarousel {
    cfg: CarouselConfig,
    layers: Vec<CarouselLayer>,
    camera: CameraState,
    mode: CarouselMode,
    running: bool,
    focused: Option<usize>,
    pass: Option<PassTracker>,
}

impl DepthCarousel {
    pub fn new<S: Into<String>>(
        cfg: CarouselConfig,
        image_refs: impl IntoIterator<Item = S>,
    ) -> VernissageResult<Self> {
        cfg.validate()?;
        let layers: Vec<CarouselLayer> = image_refs
            .into_iter()
            .enumerate()
            .map(|(i, r)| CarouselLayer::new(i, r, &cfg))
            .collect();
        if layers.is_empty() {
            return Err(VernissageError::validation("carousel needs at least one layer"));
        }
        Ok(Self {
            cfg,
            layers,
            camera: CameraState::default(),
            mode: CarouselMode::Looping,
            running: false,
            focused: None,
            pass: None,
        })
    }

    pub fn layers(&self) -> &[CarouselLayer] {
        &self.layers
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.cfg
    }

    pub fn camera(&self) -> CameraState {
        self.camera
    }

    pub fn mode(&self) -> CarouselMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Distance the camera covers before wrapping; an exact multiple of layer spacing.
    pub fn loop_range(&self) -> f64 {
        self.cfg.per_layer_z * self.layers.len() as f64
    }

    /// Scroll length the host should reserve for this carousel.
    pub fn measured_length(&self) -> f64 {
        self.loop_range()
    }

    pub fn start(&mut self, mode: CarouselMode) {
        self.running = true;
        self.set_mode(mode);
    }

    /// Halt ticking. Placements are ephemeral, so nothing else needs tearing down.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn set_mode(&mut self, mode: CarouselMode) {
        if mode == self.mode && (mode == CarouselMode::Looping || self.pass.is_some()) {
            return;
        }
        self.mode = mode;
        self.pass = match mode {
            CarouselMode::Looping => None,
            CarouselMode::SinglePass => Some(PassTracker::new(self.travel_fractions())),
        };
        tracing::debug!(?mode, "carousel mode changed");
    }

    /// Back to the initial camera and mode; used on route reset.
    pub fn reset(&mut self) {
        self.running = false;
        self.camera = CameraState::default();
        self.mode = CarouselMode::Looping;
        self.pass = None;
        self.focused = None;
    }

    pub fn push_delta(&mut self, delta: f64) {
        self.camera.push_delta(delta, self.cfg.velocity_boost);
    }

    /// Mark a layer as hovered/unhovered. Returns whether focus changed.
    pub fn set_hover(&mut self, layer: usize, hovered: bool) -> bool {
        if layer >= self.layers.len() {
            return false;
        }
        let next = match (hovered, self.focused) {
            (true, _) => Some(layer),
            (false, Some(f)) if f == layer => None,
            (false, current) => current,
        };
        let changed = next != self.focused;
        self.focused = next;
        changed
    }

    /// Placements for the current camera without advancing it.
    pub fn placements(&self) -> Vec<Placement> {
        let loop_range = self.loop_range();
        self.layers
            .iter()
            .enumerate()
            .map(|(i, layer)| {
                let mut p = place(layer, i, self.camera.virtual_z, loop_range, &self.cfg);
                if self.pass.as_ref().is_some_and(|pass| pass.retired[i]) {
                    p.opacity = 0.0;
                }
                if self.focused == Some(i) {
                    p.opacity = 1.0;
                }
                p
            })
            .collect()
    }

    /// Advance one display tick. Returns `None` while stopped.
    pub fn tick(&mut self, dt_secs: f64) -> Option<CarouselTick> {
        if !self.running {
            return None;
        }
        let rush = match self.mode {
            CarouselMode::Looping => 1.0,
            CarouselMode::SinglePass => self.cfg.single_pass_rush,
        };
        let loop_range = self.loop_range();
        let step = self
            .camera
            .integrate(dt_secs, self.cfg.motion(rush), loop_range);

        let mut arrived = false;
        let fractions = self.travel_fractions();
        if let Some(pass) = self.pass.as_mut() {
            let advance = step / loop_range;
            for (i, &t) in fractions.iter().enumerate() {
                pass.observe(i, t, advance, self.cfg.arrival_threshold);
            }
            if !pass.reported && pass.all_arrived() {
                pass.reported = true;
                arrived = true;
                tracing::debug!("carousel single pass arrived");
            }
        }

        Some(CarouselTick {
            placements: self.placements(),
            arrived,
        })
    }

    fn travel_fractions(&self) -> Vec<f64> {
        let loop_range = self.loop_range();
        (0..self.layers.len())
            .map(|i| travel_fraction(i, self.camera.virtual_z, loop_range, self.cfg.per_layer_z))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/carousel/depth.rs"]
mod tests;
