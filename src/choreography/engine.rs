use std::{cell::RefCell, collections::VecDeque, rc::Rc, time::Duration};

use crate::{
    animation::timeline::{RunHandle, Scheduler},
    assets::PreparedImage,
    carousel::depth::{CarouselMode, DepthCarousel},
    choreography::{
        ownership::OwnershipToken,
        state::{Applied, ChoreographyMachine, ChoreographyState, TimelineSlot, Transition, Trigger},
    },
    config::EngineConfig,
    foundation::{
        core::{Epoch, FrameIndex, Viewport},
        error::VernissageResult,
    },
    mask::stroke::{Stroke, generate_with},
    render::surface::Surface,
    sprite::renderer::{DrawOutcome, SheetStatus, SpriteRenderer},
};

/// External inputs, queued and applied at the start of the next frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineInput {
    SequenceStart,
    RevealHandoff,
    PreWarm,
    Initialize,
    RouteReset,
    /// Wheel, drag or touch movement along the carousel axis.
    Delta { amount: f64 },
    Resize { width: u32, height: u32 },
    Hover { layer: usize, hovered: bool },
}

/// Notifications for the host, drained from each [`Engine::frame`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    StateChanged {
        from: ChoreographyState,
        to: ChoreographyState,
        epoch: Epoch,
    },
    /// Handoff received and timeline #1 done; the host may offer "initialize".
    HandoffComplete,
    /// Emitted once per run of the sequence.
    SequenceVisuallyComplete,
    CarouselMeasured { length: f64 },
    CarouselArrived,
    LayerHover { layer: usize, hovered: bool },
    PreWarmed { strokes: usize },
}

/// What a scheduled run reports back, tagged with the epoch it was scheduled under.
#[derive(Clone, Copy, Debug)]
enum Feedback {
    Progress { slot: TimelineSlot, epoch: Epoch, p: f64 },
    Done { slot: TimelineSlot, epoch: Epoch },
}

#[derive(Clone, Copy, Debug)]
struct ActiveRun {
    slot: TimelineSlot,
    handle: RunHandle,
    progress: f64,
}

/// One choreography context: state machine, playback, carousel and surface.
///
/// The host owns it and drives it from its display clock with [`Engine::frame`].
/// Within a frame, queued inputs are applied first, then the playback timeline
/// and the carousel advance against the new state.
pub struct Engine {
    cfg: EngineConfig,
    machine: ChoreographyMachine,
    renderer: SpriteRenderer,
    surface: Surface,
    carousel: DepthCarousel,
    owner: OwnershipToken,
    inputs: VecDeque<EngineInput>,
    events: Vec<EngineEvent>,
    scheduler: Scheduler,
    feedback: Rc<RefCell<Vec<Feedback>>>,
    active: Option<ActiveRun>,
    target_frame: i64,
    now: Duration,
    last_tick: Option<Duration>,
    prewarm_due: Option<Duration>,
    strokes: Option<Vec<Stroke>>,
    completion_sent: bool,
    unmounted: bool,
    demotion_logged: bool,
}

impl Engine {
    pub fn new(
        cfg: EngineConfig,
        artwork: impl IntoIterator<Item = String>,
        viewport: Viewport,
        owner: OwnershipToken,
    ) -> VernissageResult<Self> {
        cfg.validate()?;
        let carousel = DepthCarousel::new(cfg.carousel.clone(), artwork)?;
        let length = carousel.measured_length();
        Ok(Self {
            cfg,
            machine: ChoreographyMachine::new(),
            renderer: SpriteRenderer::new(),
            surface: Surface::for_viewport(viewport)?,
            carousel,
            owner,
            inputs: VecDeque::new(),
            events: vec![EngineEvent::CarouselMeasured { length }],
            scheduler: Scheduler::new(),
            feedback: Rc::new(RefCell::new(Vec::new())),
            active: None,
            target_frame: 0,
            now: Duration::ZERO,
            last_tick: None,
            prewarm_due: None,
            strokes: None,
            completion_sent: false,
            unmounted: false,
            demotion_logged: false,
        })
    }

    /// Hand the decoded sprite sheets (or the decode failure) to the renderer.
    pub fn install_sheets(&mut self, sheets: VernissageResult<Vec<PreparedImage>>) -> bool {
        let layout = self.cfg.sprite.layout();
        self.renderer.install(sheets, &layout)
    }

    /// Decide on mount whether to play the sequence, given the route the user came from.
    ///
    /// Returns `true` when the sequence is skipped.
    pub fn enter_from(&mut self, previous_route: Option<&str>) -> bool {
        match previous_route {
            Some(route) if route != self.cfg.handoff.entry_route => {
                tracing::info!(route, "arrived from another route; skipping sequence");
                self.apply_trigger(Trigger::Skip);
                true
            }
            _ => false,
        }
    }

    pub fn push(&mut self, input: EngineInput) {
        if self.unmounted {
            return;
        }
        self.inputs.push_back(input);
    }

    /// Advance everything to display time `now` and return the events produced.
    pub fn frame(&mut self, now: Duration) -> Vec<EngineEvent> {
        if self.unmounted {
            return Vec::new();
        }
        if !self.owner.is_current() {
            if !self.demotion_logged {
                tracing::debug!(owner = self.owner.id(), "surface owned elsewhere; engine idle");
                self.demotion_logged = true;
            }
            self.inputs.clear();
            return Vec::new();
        }

        self.now = now;
        while let Some(input) = self.inputs.pop_front() {
            self.apply_input(input);
        }
        if self.prewarm_due.is_some_and(|due| now >= due) {
            self.prewarm_due = None;
            self.prewarm();
        }

        self.advance_timeline(now);

        let dt = self
            .last_tick
            .map_or(0.0, |prev| now.saturating_sub(prev).as_secs_f64());
        self.last_tick = Some(now);
        if let Some(tick) = self.carousel.tick(dt)
            && tick.arrived
        {
            self.carousel.stop();
            self.events.push(EngineEvent::CarouselArrived);
        }

        self.draw();
        std::mem::take(&mut self.events)
    }

    /// Cancel everything. The engine never touches its surface again.
    pub fn unmount(&mut self) {
        if self.unmounted {
            return;
        }
        self.unmounted = true;
        self.scheduler.cancel_all();
        self.active = None;
        self.feedback.borrow_mut().clear();
        self.carousel.stop();
        self.inputs.clear();
        self.events.clear();
        self.prewarm_due = None;
        tracing::debug!("engine unmounted");
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    pub fn state(&self) -> ChoreographyState {
        self.machine.state()
    }

    pub fn epoch(&self) -> Epoch {
        self.machine.epoch()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn carousel(&self) -> &DepthCarousel {
        &self.carousel
    }

    pub fn sheet_status(&self) -> SheetStatus {
        self.renderer.status()
    }

    /// Frame the sequence wants on screen, before clamping to the table.
    pub fn target_frame(&self) -> i64 {
        self.target_frame
    }

    pub fn displayed_frame(&self) -> Option<FrameIndex> {
        self.renderer.last_drawn()
    }

    pub fn pause_frame(&self) -> FrameIndex {
        self.cfg.sprite.pause_frame()
    }

    pub fn last_usable_frame(&self) -> FrameIndex {
        self.cfg.sprite.layout().last_usable_frame()
    }

    /// Strokes generated by pre-warm, if it has run.
    pub fn prewarmed_strokes(&self) -> Option<&[Stroke]> {
        self.strokes.as_deref()
    }

    pub fn timeline_progress(&self) -> Option<(TimelineSlot, f64)> {
        self.active.map(|a| (a.slot, a.progress))
    }

    fn apply_input(&mut self, input: EngineInput) {
        match input {
            EngineInput::SequenceStart => self.apply_trigger(Trigger::SequenceStart),
            EngineInput::RevealHandoff => {
                // Handoff overtook the timer; consumers need the strokes now.
                if self.prewarm_due.take().is_some() {
                    self.prewarm();
                }
                self.apply_trigger(Trigger::RevealHandoff);
            }
            EngineInput::PreWarm => self.prewarm(),
            EngineInput::Initialize => self.apply_trigger(Trigger::Initialize),
            EngineInput::RouteReset => self.apply_trigger(Trigger::RouteReset),
            EngineInput::Delta { amount } => self.carousel.push_delta(amount),
            EngineInput::Resize { width, height } => {
                let viewport = Viewport::new(width, height);
                if viewport == self.surface.viewport() {
                    return;
                }
                match self.surface.resize(viewport) {
                    Ok(()) => {
                        self.renderer.invalidate_fit();
                        tracing::debug!(width, height, "viewport resized");
                    }
                    Err(e) => tracing::warn!(error = %e, width, height, "resize ignored"),
                }
            }
            EngineInput::Hover { layer, hovered } => {
                if self.carousel.set_hover(layer, hovered) {
                    self.events.push(EngineEvent::LayerHover { layer, hovered });
                }
            }
        }
    }

    fn apply_trigger(&mut self, trigger: Trigger) {
        match self.machine.apply(trigger) {
            Applied::Transition(t) => self.enter(t),
            Applied::ExitReady => self.events.push(EngineEvent::HandoffComplete),
            Applied::Noted => {}
            Applied::Stale => tracing::debug!(?trigger, "stale completion dropped"),
            Applied::Ignored => {
                tracing::debug!(?trigger, state = ?self.machine.state(), "trigger ignored")
            }
        }
    }

    fn enter(&mut self, t: Transition) {
        self.events.push(EngineEvent::StateChanged {
            from: t.from,
            to: t.to,
            epoch: t.epoch,
        });
        if let Some(active) = self.active.take() {
            self.scheduler.cancel(active.handle);
        }

        match t.to {
            ChoreographyState::Idle => {
                self.carousel.reset();
                self.target_frame = 0;
                self.completion_sent = false;
                self.prewarm_due = None;
            }
            ChoreographyState::InitialPlay => {
                self.target_frame = 0;
                self.carousel.start(CarouselMode::Looping);
                if self.strokes.is_none() {
                    let offset = self.cfg.handoff.prewarm_offset_ms() / 1000.0;
                    self.prewarm_due = Duration::try_from_secs_f64(offset)
                        .ok()
                        .and_then(|d| self.now.checked_add(d));
                }
                self.schedule(TimelineSlot::Initial, self.cfg.initial_secs(), t.epoch);
            }
            ChoreographyState::PostTriggerPlay => {
                if self.prewarm_due.take().is_some() {
                    self.prewarm();
                }
                self.target_frame = i64::from(self.pause_frame().0);
                self.carousel.start(CarouselMode::SinglePass);
                self.schedule(TimelineSlot::PostTrigger, self.cfg.post_trigger_secs(), t.epoch);
            }
            ChoreographyState::Complete => {
                self.target_frame = i64::from(self.last_usable_frame().0);
                self.carousel.stop();
                self.prewarm_due = None;
                if !self.completion_sent {
                    self.completion_sent = true;
                    self.events.push(EngineEvent::SequenceVisuallyComplete);
                }
            }
        }
    }

    fn schedule(&mut self, slot: TimelineSlot, secs: f64, epoch: Epoch) {
        let on_progress = {
            let fb = Rc::clone(&self.feedback);
            move |p| fb.borrow_mut().push(Feedback::Progress { slot, epoch, p })
        };
        let on_complete = {
            let fb = Rc::clone(&self.feedback);
            move || fb.borrow_mut().push(Feedback::Done { slot, epoch })
        };
        match self.scheduler.run(secs, on_progress, on_complete) {
            Ok(handle) => {
                self.active = Some(ActiveRun {
                    slot,
                    handle,
                    progress: 0.0,
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, ?slot, "timeline could not start; completing immediately");
                self.apply_trigger(Trigger::TimelineComplete { slot, epoch });
            }
        }
    }

    fn advance_timeline(&mut self, now: Duration) {
        self.scheduler.tick(now);
        let feedback = std::mem::take(&mut *self.feedback.borrow_mut());
        for item in feedback {
            match item {
                Feedback::Progress { slot, epoch, p } => {
                    if epoch != self.machine.epoch() {
                        tracing::debug!(?slot, epoch = epoch.0, "stale progress dropped");
                        continue;
                    }
                    self.target_frame = self.frame_for(slot, p);
                    if let Some(active) = self.active.as_mut() {
                        active.progress = p;
                    }
                }
                Feedback::Done { slot, epoch } => {
                    if epoch == self.machine.epoch() {
                        self.active = None;
                    }
                    self.apply_trigger(Trigger::TimelineComplete { slot, epoch });
                }
            }
        }
    }

    /// Map timeline progress onto its frame span.
    fn frame_for(&self, slot: TimelineSlot, progress: f64) -> i64 {
        let pause = f64::from(self.pause_frame().0);
        let last = f64::from(self.last_usable_frame().0);
        let frame = match slot {
            TimelineSlot::Initial => (progress * pause).round(),
            TimelineSlot::PostTrigger => pause + (progress * (last - pause)).round(),
        };
        frame as i64
    }

    fn prewarm(&mut self) {
        if self.strokes.is_some() {
            return;
        }
        let mask = &self.cfg.mask;
        let strokes = generate_with(mask, mask.bands, mask.strokes_per_band);
        self.events.push(EngineEvent::PreWarmed {
            strokes: strokes.len(),
        });
        self.strokes = Some(strokes);
    }

    fn draw(&mut self) {
        if let DrawOutcome::Drawn(idx) = self.renderer.draw_frame(self.target_frame, &mut self.surface) {
            tracing::trace!(frame = idx.0, "frame drawn");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/choreography/engine.rs"]
mod tests;
