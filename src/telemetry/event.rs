//! Telemetry event types.

use crate::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of [`EventPayload`], used for type-filtered queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Location,
    HeartRate,
    CheckpointReached,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Location => "location",
            Self::HeartRate => "heart-rate",
            Self::CheckpointReached => "checkpoint-reached",
        };
        f.write_str(name)
    }
}

/// What was sampled.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    Location { point: GeoPoint },
    HeartRate { bpm: u32 },
    CheckpointReached { checkpoint_number: usize },
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Location { .. } => EventKind::Location,
            Self::HeartRate { .. } => EventKind::HeartRate,
            Self::CheckpointReached { .. } => EventKind::CheckpointReached,
        }
    }
}

/// A sample taken during an attempt.
///
/// `timestamp` counts seconds since the attempt started. Equality compares
/// timestamp and payload.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub timestamp: i64,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl TelemetryEvent {
    pub fn location(timestamp: i64, point: GeoPoint) -> Self {
        Self {
            timestamp,
            payload: EventPayload::Location { point },
        }
    }

    pub fn heart_rate(timestamp: i64, bpm: u32) -> Self {
        Self {
            timestamp,
            payload: EventPayload::HeartRate { bpm },
        }
    }

    pub fn checkpoint_reached(timestamp: i64, checkpoint_number: usize) -> Self {
        Self {
            timestamp,
            payload: EventPayload::CheckpointReached { checkpoint_number },
        }
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// Position, for `Location` events.
    pub fn point(&self) -> Option<GeoPoint> {
        match self.payload {
            EventPayload::Location { point } => Some(point),
            _ => None,
        }
    }

    /// Checkpoint number, for `CheckpointReached` events.
    pub fn checkpoint_number(&self) -> Option<usize> {
        match self.payload {
            EventPayload::CheckpointReached { checkpoint_number } => Some(checkpoint_number),
            _ => None,
        }
    }
}
