use std::f64::consts::PI;

use crate::{
    animation::proc::{Rng64, SineStack},
    foundation::{
        core::{BezPath, Point, Vec2},
        math::seed2,
    },
    mask::stroke::Stroke,
};

/// Thickness multiplier per paint layer; later layers are thinner and fainter.
const LAYER_THICKNESS: [f64; 3] = [1.0, 0.82, 0.66];
/// Normal offset per paint layer, as a fraction of stroke thickness.
const LAYER_SHIFT: [f64; 3] = [0.0, 0.14, -0.12];

/// Pinches both ends of a stroke to zero width.
pub fn taper(s: f64) -> f64 {
    (PI * s.clamp(0.0, 1.0)).sin().max(0.0).powf(0.6)
}

/// Edge irregularity for one layer of a stroke; deterministic per `(seed, layer)`.
pub fn edge_profile(stroke: &Stroke, layer: u8, octaves: usize, amplitude: f64) -> SineStack {
    let mut rng = Rng64::new(seed2(stroke.seed, u64::from(layer)));
    SineStack::octaves(&mut rng, octaves, 2.5, amplitude)
}

/// Closed outline of one paint layer, drawn up to `head` along the centerline.
///
/// The top edge is walked from the tail to the head and the bottom edge back,
/// with the half-height scaled by `spread`. Returns `None` before the stroke
/// has any length.
pub fn layer_outline(
    stroke: &Stroke,
    layer: u8,
    edges: &SineStack,
    head: f64,
    spread: f64,
    samples: usize,
) -> Option<BezPath> {
    let head = head.clamp(0.0, 1.0);
    if head <= 0.0 || samples < 2 {
        return None;
    }
    let li = usize::from(layer).min(LAYER_THICKNESS.len() - 1);
    let base = stroke.thickness * spread * LAYER_THICKNESS[li];
    let shift = stroke.thickness * LAYER_SHIFT[li];

    let mut top = Vec::with_capacity(samples + 1);
    let mut bottom = Vec::with_capacity(samples + 1);
    for i in 0..=samples {
        let s = head * i as f64 / samples as f64;
        let center = stroke.point_at(s);
        let n = normal_at(stroke, s);
        let wobble = (1.0 + edges.sample(s)).max(0.2);
        let half = base * taper(s) * wobble;
        let mid = center + n * shift;
        top.push(mid + n * half);
        bottom.push(mid - n * half);
    }

    let mut path = BezPath::new();
    path.move_to(top[0]);
    for &p in &top[1..] {
        path.line_to(p);
    }
    for &p in bottom.iter().rev() {
        path.line_to(p);
    }
    path.close_path();
    Some(path)
}

fn normal_at(stroke: &Stroke, s: f64) -> Vec2 {
    const EPS: f64 = 1e-3;
    let a: Point = stroke.point_at((s - EPS).max(0.0));
    let b: Point = stroke.point_at((s + EPS).min(1.0));
    let d = b - a;
    let len = d.hypot();
    if len <= f64::EPSILON {
        return Vec2::new(0.0, 1.0);
    }
    Vec2::new(-d.y / len, d.x / len)
}

#[cfg(test)]
#[path = "../../tests/unit/mask/outline.rs"]
mod tests;
