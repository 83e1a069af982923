use std::{
    cell::Cell,
    time::{Duration, Instant},
};

use crate::foundation::{
    core::Epoch,
    error::{VernissageError, VernissageResult},
};

/// Source of display-frame timestamps.
///
/// Timestamps are offsets from an arbitrary origin; only differences matter.
pub trait FrameClock {
    fn now(&self) -> Duration;
}

/// Wall clock anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock for headless simulation and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by));
    }

    pub fn set(&self, at: Duration) {
        self.now.set(at);
    }
}

impl FrameClock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum TimelineStatus {
    Running,
    Completed,
    Cancelled,
}

/// One observation of a running timeline.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TimelineTick {
    pub progress: f64,
    /// True exactly once, on the tick that reaches `progress == 1.0`.
    pub completed: bool,
    pub epoch: Epoch,
}

/// Linear 0..1 progress over a fixed wall-clock duration.
///
/// The clock starts on the first `advance`, so a timeline created between
/// display frames does not skip ahead.
#[derive(Clone, Debug)]
pub struct Timeline {
    duration: Duration,
    epoch: Epoch,
    started_at: Option<Duration>,
    last_progress: f64,
    status: TimelineStatus,
}

impl Timeline {
    pub fn new(duration_secs: f64, epoch: Epoch) -> VernissageResult<Self> {
        if !duration_secs.is_finite() || duration_secs < 0.0 {
            return Err(VernissageError::animation(format!(
                "timeline duration must be finite and >= 0, got {duration_secs}"
            )));
        }
        let duration = Duration::try_from_secs_f64(duration_secs)
            .map_err(|e| VernissageError::animation(format!("timeline duration: {e}")))?;
        Ok(Self {
            duration,
            epoch,
            started_at: None,
            last_progress: 0.0,
            status: TimelineStatus::Running,
        })
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn status(&self) -> TimelineStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == TimelineStatus::Running
    }

    pub fn progress(&self) -> f64 {
        self.last_progress
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Advance to `now`. Returns `None` once completed or cancelled.
    pub fn advance(&mut self, now: Duration) -> Option<TimelineTick> {
        if self.status != TimelineStatus::Running {
            return None;
        }
        let start = *self.started_at.get_or_insert(now);
        let elapsed = now.saturating_sub(start);

        let progress = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
        };
        self.last_progress = progress;

        let completed = progress >= 1.0;
        if completed {
            self.status = TimelineStatus::Completed;
        }
        Some(TimelineTick {
            progress,
            completed,
            epoch: self.epoch,
        })
    }

    /// Stop the timeline. Returns `true` only for the call that actually cancelled it.
    pub fn cancel(&mut self) -> bool {
        if self.status == TimelineStatus::Running {
            self.status = TimelineStatus::Cancelled;
            true
        } else {
            false
        }
    }
}

pub type ProgressFn = Box<dyn FnMut(f64)>;
pub type CompleteFn = Box<dyn FnOnce()>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RunHandle(u64);

struct ScheduledRun {
    handle: RunHandle,
    timeline: Timeline,
    on_progress: ProgressFn,
    on_complete: Option<CompleteFn>,
}

/// Callback-driven front for [`Timeline`].
///
/// `tick` is expected once per display frame. Callbacks run synchronously
/// inside `tick`, in scheduling order.
#[derive(Default)]
pub struct Scheduler {
    next_handle: u64,
    runs: Vec<ScheduledRun>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(
        &mut self,
        duration_secs: f64,
        on_progress: impl FnMut(f64) + 'static,
        on_complete: impl FnOnce() + 'static,
    ) -> VernissageResult<RunHandle> {
        let handle = RunHandle(self.next_handle);
        self.next_handle += 1;
        let timeline = Timeline::new(duration_secs, Epoch(handle.0))?;
        self.runs.push(ScheduledRun {
            handle,
            timeline,
            on_progress: Box::new(on_progress),
            on_complete: Some(Box::new(on_complete)),
        });
        Ok(handle)
    }

    /// Cancel a run; calling it again (or on a finished run) is a no-op.
    pub fn cancel(&mut self, handle: RunHandle) -> bool {
        let Some(pos) = self.runs.iter().position(|r| r.handle == handle) else {
            return false;
        };
        let mut run = self.runs.remove(pos);
        run.timeline.cancel()
    }

    pub fn cancel_all(&mut self) {
        for run in &mut self.runs {
            run.timeline.cancel();
        }
        self.runs.clear();
    }

    pub fn is_active(&self, handle: RunHandle) -> bool {
        self.runs.iter().any(|r| r.handle == handle)
    }

    pub fn active_runs(&self) -> usize {
        self.runs.len()
    }

    /// Deliver one display tick to every active run; returns how many remain.
    pub fn tick(&mut self, now: Duration) -> usize {
        let mut finished = Vec::new();
        for run in &mut self.runs {
            let Some(tick) = run.timeline.advance(now) else {
                continue;
            };
            (run.on_progress)(tick.progress);
            if tick.completed {
                if let Some(done) = run.on_complete.take() {
                    done();
                }
                finished.push(run.handle);
            }
        }
        self.runs.retain(|r| !finished.contains(&r.handle));
        self.runs.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
