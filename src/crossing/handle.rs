//! Shared, lock-protected access to a crossing engine.

use crate::crossing::engine::{CrossingEngine, CrossingOutcome};
use crate::crossing::error::CrossingError;
use crate::crossing::phase::CrossingPhase;
use crate::geo::GeoPoint;
use crate::track::Track;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle serializing every command and query on one engine.
///
/// Location, heading and heart-rate callbacks may run on different threads;
/// each call takes the lock once and releases it on return, error paths
/// included. Use [`read`](Self::read) when several values must come from
/// the same instant.
#[derive(Clone)]
pub struct CrossingHandle {
    inner: Arc<Mutex<CrossingEngine>>,
}

impl CrossingHandle {
    pub fn new(engine: CrossingEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CrossingEngine> {
        // Engine methods do not panic, so poisoning can only come from a
        // caller closure passed to read/update.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the engine under a single lock acquisition.
    pub fn read<T>(&self, f: impl FnOnce(&CrossingEngine) -> T) -> T {
        f(&self.lock())
    }

    /// Run `f` with exclusive access to the engine.
    pub fn update<T>(&self, f: impl FnOnce(&mut CrossingEngine) -> T) -> T {
        f(&mut self.lock())
    }

    pub fn start_track(&self, track: Track, now: DateTime<Utc>) {
        self.lock().start_track(track, now);
    }

    pub fn on_location_update(
        &self,
        position: GeoPoint,
        now: DateTime<Utc>,
    ) -> Result<CrossingOutcome, CrossingError> {
        self.lock().on_location_update(position, now)
    }

    pub fn advance_checkpoint(&self, now: DateTime<Utc>) -> Result<CrossingOutcome, CrossingError> {
        self.lock().advance_checkpoint(now)
    }

    pub fn on_heading_update(&self, magnetic_heading: f64) {
        self.lock().on_heading_update(magnetic_heading);
    }

    pub fn on_heart_rate(&self, bpm: u32, now: DateTime<Utc>) -> Result<(), CrossingError> {
        self.lock().on_heart_rate(bpm, now)
    }

    pub fn abort(&self) -> Result<(), CrossingError> {
        self.lock().abort()
    }

    pub fn phase(&self) -> CrossingPhase {
        self.lock().phase()
    }

    pub fn next_checkpoint_index(&self) -> Result<usize, CrossingError> {
        self.lock().next_checkpoint_index()
    }

    pub fn last_crossed_partial_time(&self) -> Result<i64, CrossingError> {
        self.lock().last_crossed_partial_time()
    }

    pub fn delta_vs_best(&self) -> Result<i64, CrossingError> {
        self.lock().delta_vs_best()
    }

    pub fn bearing_to_next(&self) -> Result<f64, CrossingError> {
        self.lock().bearing_to_next()
    }

    pub fn distance_to_next(&self) -> Result<f64, CrossingError> {
        self.lock().distance_to_next()
    }
}

impl From<CrossingEngine> for CrossingHandle {
    fn from(engine: CrossingEngine) -> Self {
        Self::new(engine)
    }
}
