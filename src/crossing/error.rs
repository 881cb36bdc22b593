//! Crossing engine errors.

use crate::store::StoreError;
use crate::telemetry::TelemetryError;
use thiserror::Error;

/// Broad class of a [`CrossingError`], for callers deciding how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The engine is in the wrong phase for the request
    State,
    /// Historical data needed for a comparison is missing
    Data,
    /// Malformed or unsatisfiable input
    Input,
    /// A collaborator (storage) failed
    Collaborator,
}

#[derive(Debug, Error)]
pub enum CrossingError {
    #[error("No track is being crossed")]
    NoActiveTrack,

    #[error("Track already completed; there is no next checkpoint")]
    TrackCompleted,

    #[error("No checkpoint has been crossed yet")]
    NoCheckpointCrossedYet,

    #[error("No location has been reported for this attempt")]
    NoLocationYet,

    #[error("Track has no previous attempt to compare against")]
    NoBestAttempt,

    #[error("Best attempt never reached checkpoint {0}")]
    CheckpointNotInBestAttempt(usize),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The attempt finished but could not be persisted
    #[error("Failed to save completed attempt: {0}")]
    Store(#[from] StoreError),
}

impl CrossingError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoActiveTrack
            | Self::TrackCompleted
            | Self::NoCheckpointCrossedYet
            | Self::NoLocationYet => ErrorCategory::State,
            Self::NoBestAttempt | Self::CheckpointNotInBestAttempt(_) => ErrorCategory::Data,
            Self::Telemetry(_) => ErrorCategory::Input,
            Self::Store(_) => ErrorCategory::Collaborator,
        }
    }
}
