//! Engine phases and the guards that decide which commands each accepts.

use crate::core::{Guard, State};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of the crossing engine.
///
/// `Idle` is the initial phase. `Finished` and `Aborted` end an attempt;
/// `start_track` leaves any phase for `Active`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrossingPhase {
    Idle,
    Active,
    Finished,
    Aborted,
}

impl State for CrossingPhase {
    fn name(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::Active => "Active",
            Self::Finished => "Finished",
            Self::Aborted => "Aborted",
        }
    }

    fn is_final(&self) -> bool {
        matches!(self, Self::Finished | Self::Aborted)
    }

    fn is_error(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    fn accepts_input(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for CrossingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Commands that can change the engine's phase or its live log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    StartTrack,
    LocationUpdate,
    AdvanceCheckpoint,
    HeartRate,
    Abort,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartTrack => "start_track",
            Self::LocationUpdate => "on_location_update",
            Self::AdvanceCheckpoint => "advance_checkpoint",
            Self::HeartRate => "on_heart_rate",
            Self::Abort => "abort",
        }
    }
}

/// A command and the phases it may run from.
pub(crate) struct CommandRule {
    pub command: Command,
    guard: Guard<CrossingPhase>,
}

impl CommandRule {
    pub fn permits(&self, phase: &CrossingPhase) -> bool {
        self.guard.check(phase)
    }
}

/// Transition table of the engine.
///
/// Starting is always allowed (an attempt in progress is discarded).
/// Everything else needs a live attempt.
pub(crate) fn command_rules() -> Vec<CommandRule> {
    let live = || Guard::new(|phase: &CrossingPhase| phase.accepts_input());

    vec![
        CommandRule {
            command: Command::StartTrack,
            guard: Guard::new(|_: &CrossingPhase| true),
        },
        CommandRule {
            command: Command::LocationUpdate,
            guard: live(),
        },
        CommandRule {
            command: Command::AdvanceCheckpoint,
            guard: live(),
        },
        CommandRule {
            command: Command::HeartRate,
            guard: live(),
        },
        CommandRule {
            command: Command::Abort,
            guard: Guard::one_of(vec![CrossingPhase::Active]),
        },
    ]
}
