//! Track construction and history errors.

use thiserror::Error;

/// A single problem found while validating a track definition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TrackViolation {
    #[error("Track name is empty")]
    EmptyName,

    #[error("Track has no checkpoints")]
    NoCheckpoints,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TrackError {
    /// No completed attempt has been recorded for the track
    #[error("Track has no completed attempts")]
    NoHistory,

    /// Every violation found, not just the first
    #[error("Invalid track: {}", describe(.0))]
    Invalid(Vec<TrackViolation>),
}

fn describe(violations: &[TrackViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
