//! Tracks: ordered checkpoints plus the history of completed attempts.

pub mod error;

pub use error::{TrackError, TrackViolation};

use crate::geo::GeoPoint;
use crate::telemetry::TelemetryLog;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use uuid::Uuid;

/// A waypoint and its 0-based position within its track.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub position: GeoPoint,
    pub ordinal: usize,
}

/// Ordered, fixed sequence of checkpoints with its attempt history.
///
/// Checkpoints never change after construction. The only mutation is
/// [`add_telemetry`](Track::add_telemetry), which appends a completed
/// attempt; stored logs are shared immutably.
///
/// # Example
///
/// ```rust
/// use trailpace::geo::GeoPoint;
/// use trailpace::track::{Track, TrackError};
///
/// let track = Track::new(
///     "Sentiero del Ponale",
///     vec![GeoPoint::new(45.88, 10.84)?, GeoPoint::new(45.87, 10.81)?],
/// )?;
///
/// assert_eq!(track.checkpoint_count(), 2);
/// assert!(matches!(track.best_telemetry(), Err(TrackError::NoHistory)));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Track {
    id: Uuid,
    name: String,
    checkpoints: Vec<Checkpoint>,
    history: Vec<Arc<TelemetryLog>>,
}

impl Track {
    /// Build a track with a fresh id and no history.
    ///
    /// Reports every violation at once rather than stopping at the first.
    pub fn new(name: impl Into<String>, points: Vec<GeoPoint>) -> Result<Self, TrackError> {
        Self::with_history(Uuid::new_v4(), name, points, Vec::new())
    }

    /// Rebuild a stored track, history included.
    pub fn with_history(
        id: Uuid,
        name: impl Into<String>,
        points: Vec<GeoPoint>,
        history: Vec<TelemetryLog>,
    ) -> Result<Self, TrackError> {
        let name = name.into();

        match validate(&name, &points) {
            Validation::Success(_) => {}
            Validation::Failure(violations) => {
                return Err(TrackError::Invalid(violations.iter().cloned().collect()));
            }
        }

        let checkpoints = points
            .into_iter()
            .enumerate()
            .map(|(ordinal, position)| Checkpoint { position, ordinal })
            .collect();

        Ok(Self {
            id,
            name,
            checkpoints,
            history: history.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn checkpoint(&self, ordinal: usize) -> Option<&Checkpoint> {
        self.checkpoints.get(ordinal)
    }

    /// Always at least 1.
    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }

    /// Completed attempts, oldest first.
    pub fn telemetries(&self) -> &[Arc<TelemetryLog>] {
        &self.history
    }

    /// Append a completed attempt to the history.
    pub fn add_telemetry(&mut self, log: Arc<TelemetryLog>) {
        self.history.push(log);
    }

    /// The completed attempt with the smallest duration.
    ///
    /// When several attempts share the minimal duration, the one recorded
    /// first wins.
    pub fn best_telemetry(&self) -> Result<Arc<TelemetryLog>, TrackError> {
        let mut best: Option<&Arc<TelemetryLog>> = None;
        for log in &self.history {
            if best.map_or(true, |b| log.duration() < b.duration()) {
                best = Some(log);
            }
        }
        best.cloned().ok_or(TrackError::NoHistory)
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

fn validate(name: &str, points: &[GeoPoint]) -> Validation<(), NonEmptyVec<TrackViolation>> {
    let checks = vec![
        if name.trim().is_empty() {
            Validation::fail(TrackViolation::EmptyName)
        } else {
            Validation::success(())
        },
        if points.is_empty() {
            Validation::fail(TrackViolation::NoCheckpoints)
        } else {
            Validation::success(())
        },
    ];

    Validation::all_vec(checks).map(|_| ())
}
