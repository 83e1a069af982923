use crate::foundation::core::Epoch;

/// Stage of the entrance sequence. Only moves forward, except on route reset.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum ChoreographyState {
    #[default]
    Idle,
    InitialPlay,
    PostTriggerPlay,
    Complete,
}

impl ChoreographyState {
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::InitialPlay => 1,
            Self::PostTriggerPlay => 2,
            Self::Complete => 3,
        }
    }
}

/// Which of the two sequential playback timelines a completion belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TimelineSlot {
    Initial,
    PostTrigger,
}

/// Discrete inputs that drive the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Trigger {
    SequenceStart,
    RevealHandoff,
    Initialize,
    /// Jump straight to the final frame (arriving from another route).
    Skip,
    RouteReset,
    /// A timeline finished. `epoch` is the one captured when it was scheduled.
    TimelineComplete { slot: TimelineSlot, epoch: Epoch },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Transition {
    pub from: ChoreographyState,
    pub to: ChoreographyState,
    pub epoch: Epoch,
}

/// What applying a trigger did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Applied {
    Transition(Transition),
    /// InitialPlay's exit condition became true: handoff received and timeline #1 done.
    ExitReady,
    /// Recorded without changing state (e.g. a handoff still waiting on timeline #1).
    Noted,
    /// Completion from an older epoch; dropped.
    Stale,
    Ignored,
}

/// Four-state entrance choreography for one engine context.
///
/// Every transition bumps the epoch, so completions scheduled before it are
/// recognized as stale.
#[derive(Clone, Debug, Default)]
pub struct ChoreographyMachine {
    state: ChoreographyState,
    epoch: Epoch,
    handoff_received: bool,
    initial_done: bool,
}

impl ChoreographyMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ChoreographyState {
        self.state
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Both halves of InitialPlay's exit condition have happened.
    pub fn exit_ready(&self) -> bool {
        self.state == ChoreographyState::InitialPlay && self.handoff_received && self.initial_done
    }

    pub fn apply(&mut self, trigger: Trigger) -> Applied {
        use ChoreographyState::*;

        match (self.state, trigger) {
            (_, Trigger::RouteReset) => {
                if self.state == Idle {
                    return Applied::Ignored;
                }
                self.move_to(Idle)
            }
            (Idle, Trigger::SequenceStart) => self.move_to(InitialPlay),
            (Idle | InitialPlay | PostTriggerPlay, Trigger::Skip) => self.move_to(Complete),
            (InitialPlay, Trigger::RevealHandoff) => {
                if self.handoff_received {
                    return Applied::Ignored;
                }
                self.handoff_received = true;
                self.exit_or_noted()
            }
            (InitialPlay, Trigger::TimelineComplete { slot: TimelineSlot::Initial, epoch }) => {
                if epoch != self.epoch {
                    return Applied::Stale;
                }
                if self.initial_done {
                    return Applied::Ignored;
                }
                self.initial_done = true;
                self.exit_or_noted()
            }
            (InitialPlay, Trigger::Initialize) => {
                if !self.exit_ready() {
                    tracing::debug!(
                        handoff = self.handoff_received,
                        initial_done = self.initial_done,
                        "initialize supersedes pending exit"
                    );
                }
                self.move_to(PostTriggerPlay)
            }
            (
                PostTriggerPlay,
                Trigger::TimelineComplete {
                    slot: TimelineSlot::PostTrigger,
                    epoch,
                },
            ) => {
                if epoch != self.epoch {
                    return Applied::Stale;
                }
                self.move_to(Complete)
            }
            (_, Trigger::TimelineComplete { .. }) => Applied::Stale,
            _ => Applied::Ignored,
        }
    }

    fn exit_or_noted(&self) -> Applied {
        if self.exit_ready() {
            Applied::ExitReady
        } else {
            Applied::Noted
        }
    }

    fn move_to(&mut self, to: ChoreographyState) -> Applied {
        let from = self.state;
        self.state = to;
        self.epoch = self.epoch.next();
        self.handoff_received = false;
        self.initial_done = false;
        tracing::info!(?from, ?to, epoch = self.epoch.0, "choreography transition");
        Applied::Transition(Transition {
            from,
            to,
            epoch: self.epoch,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/choreography/state.rs"]
mod tests;
