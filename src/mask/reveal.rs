use crate::{
    animation::proc::SineStack,
    foundation::{
        core::{Affine, BezPath},
        error::{VernissageError, VernissageResult},
    },
    mask::{
        outline::{edge_profile, layer_outline},
        stroke::{MaskConfig, Stroke, generate_with},
    },
    render::{composite::apply_reveal_mask, surface::Surface},
};

const OUTLINE_SAMPLES: usize = 48;

/// Scale of a stroke's body at local time `t` (`0` at start, `1` at end of travel).
///
/// Rises to `peak` over the last `window` of travel and settles back to `1`
/// over the same span after the stroke stops.
pub fn spread_scale(t: f64, window: f64, peak: f64) -> f64 {
    if window <= 0.0 {
        return 1.0;
    }
    let start = 1.0 - window;
    let end = 1.0 + window;
    if t <= start || t >= end {
        return 1.0;
    }
    let bump = (std::f64::consts::PI * (t - start) / (end - start)).sin();
    1.0 + (peak - 1.0) * bump
}

/// Where a stroke is in its schedule at a given time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct StrokeState {
    /// Eased head position along the centerline, `0..=1`.
    pub head: f64,
    pub spread: f64,
    pub started: bool,
    pub settled: bool,
}

impl StrokeState {
    pub fn at(stroke: &Stroke, spread_window: f64, time_ms: f64) -> Self {
        let duration_ms = (stroke.duration_s * 1000.0).max(f64::EPSILON);
        let t = (time_ms - stroke.delay_ms) / duration_ms;
        if t.is_nan() || t <= 0.0 {
            return Self {
                head: 0.0,
                spread: 1.0,
                started: false,
                settled: false,
            };
        }
        Self {
            head: stroke.motion_kind.ease().apply(t),
            spread: spread_scale(t, spread_window, stroke.spread_peak),
            started: true,
            settled: t >= 1.0 + spread_window,
        }
    }
}

/// Time by which every stroke has finished travelling and settled.
pub fn settle_time_ms(strokes: &[Stroke], spread_window: f64) -> f64 {
    strokes
        .iter()
        .map(|s| s.delay_ms + s.duration_s * 1000.0 * (1.0 + spread_window))
        .fold(0.0, f64::max)
}

/// Outlines of every visible paint layer at `time_ms`, with their opacity.
pub fn shapes_at(
    strokes: &[Stroke],
    edges: &[Vec<SineStack>],
    cfg: &MaskConfig,
    time_ms: f64,
) -> Vec<(BezPath, f32)> {
    let mut shapes = Vec::new();
    for (stroke, stroke_edges) in strokes.iter().zip(edges) {
        let state = StrokeState::at(stroke, cfg.spread_window, time_ms);
        if !state.started {
            continue;
        }
        for (layer, layer_edges) in stroke_edges.iter().enumerate() {
            let opacity = cfg.layer_opacities.get(layer).copied().unwrap_or(0.0);
            if opacity <= 0.0 {
                continue;
            }
            let Some(path) = layer_outline(
                stroke,
                layer as u8,
                layer_edges,
                state.head,
                state.spread,
                OUTLINE_SAMPLES,
            ) else {
                continue;
            };
            shapes.push((path, opacity as f32));
        }
    }
    shapes
}

/// Rasterize one instant of the stroke set to 8-bit coverage (no accumulation).
pub fn render_coverage(
    shapes: &[(BezPath, f32)],
    width: u32,
    height: u32,
) -> VernissageResult<Vec<u8>> {
    let w: u16 = width
        .try_into()
        .map_err(|_| VernissageError::validation("mask width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| VernissageError::validation("mask height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Ok(Vec::new());
    }

    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    // Mask units span the whole target on both axes.
    let to_pixels = Affine::scale_non_uniform(f64::from(width), f64::from(height));
    ctx.set_transform(vello_cpu::kurbo::Affine::new(to_pixels.as_coeffs()));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
    for (path, opacity) in shapes {
        let cpu_path = bezpath_to_cpu(path);
        if *opacity < 1.0 {
            ctx.push_opacity_layer(*opacity);
        }
        ctx.fill_path(&cpu_path);
        if *opacity < 1.0 {
            ctx.pop_layer();
        }
    }
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);

    Ok(pixmap
        .data_as_u8_slice()
        .chunks_exact(4)
        .map(|px| px[3])
        .collect())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Progressive reveal mask for one mount of reveal content.
///
/// Coverage only ever grows: each `advance_to` takes the per-pixel maximum of
/// what was already revealed and the current stroke shapes, so the spread
/// settling back never hides anything again.
#[derive(Clone, Debug)]
pub struct RevealMask {
    cfg: MaskConfig,
    strokes: Vec<Stroke>,
    edges: Vec<Vec<SineStack>>,
    width: u32,
    height: u32,
    coverage: Vec<u8>,
    time_ms: f64,
}

impl RevealMask {
    /// Generate strokes from `cfg` and start with nothing revealed.
    pub fn new(cfg: MaskConfig, width: u32, height: u32) -> VernissageResult<Self> {
        cfg.validate()?;
        let strokes = generate_with(&cfg, cfg.bands, cfg.strokes_per_band);
        Self::with_strokes(cfg, strokes, width, height)
    }

    /// Use a pre-generated stroke set (e.g. one produced during pre-warm).
    pub fn with_strokes(
        cfg: MaskConfig,
        strokes: Vec<Stroke>,
        width: u32,
        height: u32,
    ) -> VernissageResult<Self> {
        cfg.validate()?;
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(VernissageError::validation("mask size exceeds u16"));
        }
        let edges = strokes
            .iter()
            .map(|s| {
                (0..s.layers)
                    .map(|layer| edge_profile(s, layer, cfg.edge_octaves, cfg.edge_amplitude))
                    .collect()
            })
            .collect();
        Ok(Self {
            cfg,
            strokes,
            edges,
            width,
            height,
            coverage: vec![0; width as usize * height as usize],
            time_ms: 0.0,
        })
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn coverage(&self) -> &[u8] {
        &self.coverage
    }

    pub fn coverage_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.coverage
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }

    pub fn settle_time_ms(&self) -> f64 {
        settle_time_ms(&self.strokes, self.cfg.spread_window)
    }

    pub fn is_settled(&self) -> bool {
        self.time_ms >= self.settle_time_ms()
    }

    /// Share of the mask that is revealed, weighted by coverage.
    pub fn revealed_fraction(&self) -> f64 {
        if self.coverage.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.coverage.iter().map(|&c| u64::from(c)).sum();
        sum as f64 / (255.0 * self.coverage.len() as f64)
    }

    /// Render the strokes at `time_ms` and fold them into the accumulated coverage.
    #[tracing::instrument(skip(self), fields(width = self.width, height = self.height))]
    pub fn advance_to(&mut self, time_ms: f64) -> VernissageResult<()> {
        if !time_ms.is_finite() {
            return Err(VernissageError::animation("mask time must be finite"));
        }
        self.time_ms = self.time_ms.max(time_ms);
        let shapes = shapes_at(&self.strokes, &self.edges, &self.cfg, time_ms);
        if shapes.is_empty() {
            return Ok(());
        }
        let frame = render_coverage(&shapes, self.width, self.height)?;
        for (acc, c) in self.coverage.iter_mut().zip(frame) {
            *acc = (*acc).max(c);
        }
        Ok(())
    }

    /// Reallocate for a new target size and replay up to the current time.
    pub fn resize(&mut self, width: u32, height: u32) -> VernissageResult<()> {
        if width == self.width && height == self.height {
            return Ok(());
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(VernissageError::validation("mask size exceeds u16"));
        }
        self.width = width;
        self.height = height;
        self.coverage = vec![0; width as usize * height as usize];
        let end = self.time_ms;
        // Replay the settled extents so earlier reveals survive the resize.
        let mut checkpoints: Vec<f64> = self
            .strokes
            .iter()
            .map(|s| s.end_ms().min(end))
            .collect();
        checkpoints.push(end);
        checkpoints.sort_by(f64::total_cmp);
        checkpoints.dedup();
        for t in checkpoints {
            self.advance_to(t)?;
        }
        Ok(())
    }

    /// Multiply `surface` by the accumulated coverage.
    pub fn apply_to(&self, surface: &mut Surface) -> VernissageResult<()> {
        if surface.width() != self.width || surface.height() != self.height {
            return Err(VernissageError::validation(format!(
                "mask is {}x{} but surface is {}x{}",
                self.width,
                self.height,
                surface.width(),
                surface.height()
            )));
        }
        apply_reveal_mask(surface.data_mut(), &self.coverage)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/reveal.rs"]
mod tests;
