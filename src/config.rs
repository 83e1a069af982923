use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context as _;

use crate::{
    carousel::depth::CarouselConfig,
    foundation::{
        core::{FrameIndex, Fps},
        error::{VernissageError, VernissageResult},
    },
    mask::stroke::MaskConfig,
    sprite::sheet::SheetLayout,
};

/// Sprite sequence layout and pacing.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SpriteConfig {
    pub columns: u32,
    pub total_frames: u32,
    pub trailing_padding: u32,
    /// Rate the sequence was authored at; used to place the pause frame.
    pub nominal_fps: Fps,
    /// Where the first timeline stops, in seconds of nominal playback.
    pub pause_after_secs: f64,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        let layout = SheetLayout::default();
        Self {
            columns: layout.columns,
            total_frames: layout.total_frames,
            trailing_padding: layout.trailing_padding,
            nominal_fps: Fps::default(),
            pause_after_secs: 2.0,
        }
    }
}

impl SpriteConfig {
    pub fn layout(&self) -> SheetLayout {
        SheetLayout {
            columns: self.columns,
            total_frames: self.total_frames,
            trailing_padding: self.trailing_padding,
        }
    }

    /// `round(pause_after_secs × nominal_fps)`, never past the last usable frame.
    pub fn pause_frame(&self) -> FrameIndex {
        let raw = self.nominal_fps.secs_to_frames_round(self.pause_after_secs);
        FrameIndex(raw.min(self.layout().last_usable_frame().0))
    }

    pub fn validate(&self) -> VernissageResult<()> {
        self.layout().validate()?;
        Fps::new(self.nominal_fps.num, self.nominal_fps.den)?;
        if !self.pause_after_secs.is_finite() || self.pause_after_secs < 0.0 {
            return Err(VernissageError::validation(
                "sprite pause_after_secs must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// Timeline durations. `None` derives the duration from the frame span at nominal fps.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub initial_secs: Option<f64>,
    pub post_trigger_secs: Option<f64>,
}

impl TimelineConfig {
    pub fn validate(&self) -> VernissageResult<()> {
        for (name, v) in [
            ("initial_secs", self.initial_secs),
            ("post_trigger_secs", self.post_trigger_secs),
        ] {
            if let Some(v) = v
                && (!v.is_finite() || v < 0.0)
            {
                return Err(VernissageError::validation(format!(
                    "timeline {name} must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }
}

/// Timing of the reveal handoff and route gating.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HandoffConfig {
    /// Delay of the reveal fade after the handoff arrives.
    pub fade_delay_ms: f64,
    /// Share of the fade delay after which the mask strokes are pre-generated.
    pub prewarm_ratio: f64,
    /// Arriving from any other route skips the sequence.
    pub entry_route: String,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            fade_delay_ms: 1200.0,
            prewarm_ratio: 0.9,
            entry_route: "/".to_string(),
        }
    }
}

impl HandoffConfig {
    pub fn prewarm_offset_ms(&self) -> f64 {
        self.prewarm_ratio * self.fade_delay_ms
    }

    pub fn validate(&self) -> VernissageResult<()> {
        if !self.fade_delay_ms.is_finite() || self.fade_delay_ms < 0.0 {
            return Err(VernissageError::validation(
                "handoff fade_delay_ms must be finite and >= 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.prewarm_ratio) {
            return Err(VernissageError::validation(
                "handoff prewarm_ratio must be in [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Everything the engine needs besides assets.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sprite: SpriteConfig,
    pub timeline: TimelineConfig,
    pub carousel: CarouselConfig,
    pub mask: MaskConfig,
    pub handoff: HandoffConfig,
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> VernissageResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> VernissageResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> VernissageResult<()> {
        self.sprite.validate()?;
        self.timeline.validate()?;
        self.carousel.validate()?;
        self.mask.validate()?;
        self.handoff.validate()?;
        Ok(())
    }

    /// Duration of the first timeline: frames `[0, pause_frame]`.
    pub fn initial_secs(&self) -> f64 {
        self.timeline.initial_secs.unwrap_or_else(|| {
            self.sprite
                .nominal_fps
                .frames_to_secs(self.sprite.pause_frame().0)
        })
    }

    /// Duration of the second timeline: frames `[pause_frame, last_usable]`.
    pub fn post_trigger_secs(&self) -> f64 {
        self.timeline.post_trigger_secs.unwrap_or_else(|| {
            let last = self.sprite.layout().last_usable_frame().0;
            let span = last.saturating_sub(self.sprite.pause_frame().0);
            self.sprite.nominal_fps.frames_to_secs(span)
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
