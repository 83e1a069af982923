use std::f64::consts::TAU;

use crate::{
    animation::proc::Rng64,
    carousel::depth::CarouselConfig,
    foundation::math::{lerp, seed2, trig_jitter, unlerp_clamped, wrap},
};

const LAYER_SALT: u64 = 0xCA40_5E11;

/// One artwork plane in the carousel. Immutable for the session.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CarouselLayer {
    pub image_ref: String,
    /// Radians; drives the sway phase.
    pub phase_seed: f64,
    /// Horizontal offset added on top of the alternating spread, in viewport widths.
    pub lateral_jitter: f64,
    /// Vertical sway amplitude, in viewport heights.
    pub vertical_jitter: f64,
}

impl CarouselLayer {
    /// Derive a layer deterministically from its position in the carousel.
    pub fn new(index: usize, image_ref: impl Into<String>, cfg: &CarouselConfig) -> Self {
        let mut rng = Rng64::new(seed2(LAYER_SALT, index as u64));
        let phase_seed = rng.range(0.0, TAU);
        Self {
            image_ref: image_ref.into(),
            phase_seed,
            lateral_jitter: trig_jitter(phase_seed, 1.0) * cfg.lateral_jitter,
            vertical_jitter: (0.5 + 0.5 * trig_jitter(phase_seed, 2.0).abs()) * cfg.vertical_jitter,
        }
    }
}

/// Where a layer is drawn on one tick. Never stored.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Placement {
    pub layer: usize,
    /// Offset from the viewport center, in viewport widths.
    pub x: f64,
    /// Offset from the viewport center, in viewport heights.
    pub y: f64,
    /// Negative distance in front of the camera; `0` is the camera plane.
    pub depth_z: f64,
    pub scale: f64,
    pub opacity: f64,
}

/// Opacity as a function of normalized travel `t` (`0` far back, `1` at the camera).
///
/// Zero through the back band, a linear ramp to full, then a short exit fade
/// as the plane passes the camera so the wrap to the far end is invisible.
pub fn depth_opacity(t: f64, cfg: &CarouselConfig) -> f64 {
    if t < cfg.fade_start {
        return 0.0;
    }
    let exit_start = 1.0 - cfg.exit_fade;
    if t > exit_start {
        return 1.0 - unlerp_clamped(exit_start, 1.0, t);
    }
    unlerp_clamped(cfg.fade_start, cfg.fade_full, t)
}

/// Placement of layer `index` for camera position `virtual_z`.
pub fn place(
    layer: &CarouselLayer,
    index: usize,
    virtual_z: f64,
    loop_range: f64,
    cfg: &CarouselConfig,
) -> Placement {
    let travel = wrap(virtual_z + index as f64 * cfg.per_layer_z, loop_range);
    let t = travel / loop_range;
    let z_range = cfg.z_range.unwrap_or(loop_range);

    let scale = lerp(cfg.min_scale, cfg.max_scale, t);
    let side = if index % 2 == 0 { -1.0 } else { 1.0 };
    let x = (side * cfg.lateral_spread + layer.lateral_jitter) * scale;
    let sway = (layer.phase_seed + TAU * cfg.sway_cycles * t).cos();
    let y = layer.vertical_jitter * sway * scale;

    Placement {
        layer: index,
        x,
        y,
        depth_z: travel - z_range,
        scale,
        opacity: depth_opacity(t, cfg),
    }
}

/// Normalized travel of layer `index`, in `[0, 1)`.
pub(crate) fn travel_fraction(index: usize, virtual_z: f64, loop_range: f64, per_layer_z: f64) -> f64 {
    wrap(virtual_z + index as f64 * per_layer_z, loop_range) / loop_range
}

#[cfg(test)]
#[path = "../../tests/unit/carousel/layers.rs"]
mod tests;
