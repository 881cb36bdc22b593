//! Persistence seam for tracks and completed attempts.
//!
//! The crate does not define a storage format. Applications implement
//! [`TrackStore`] over their database; [`MemoryTrackStore`] keeps
//! everything in process.

use crate::telemetry::TelemetryLog;
use crate::track::Track;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Track {0} not found")]
    TrackNotFound(Uuid),

    #[error("Storage backend failed: {0}")]
    Backend(String),
}

/// Loads tracks and persists finished attempts.
pub trait TrackStore: Send + Sync {
    /// Track with its completed attempts already attached.
    fn load_track(&self, id: Uuid) -> Result<Track, StoreError>;

    /// Persist an attempt that has just finished on track `track_id`.
    fn save_completed_telemetry(&self, track_id: Uuid, log: &TelemetryLog)
        -> Result<(), StoreError>;
}

/// In-process [`TrackStore`].
#[derive(Debug, Default)]
pub struct MemoryTrackStore {
    tracks: RwLock<HashMap<Uuid, Track>>,
}

impl MemoryTrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a track.
    pub fn insert(&self, track: Track) {
        self.tracks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(track.id(), track);
    }

    pub fn len(&self) -> usize {
        self.tracks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TrackStore for MemoryTrackStore {
    fn load_track(&self, id: Uuid) -> Result<Track, StoreError> {
        self.tracks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(StoreError::TrackNotFound(id))
    }

    fn save_completed_telemetry(
        &self,
        track_id: Uuid,
        log: &TelemetryLog,
    ) -> Result<(), StoreError> {
        let mut tracks = self.tracks.write().unwrap_or_else(PoisonError::into_inner);
        let track = tracks
            .get_mut(&track_id)
            .ok_or(StoreError::TrackNotFound(track_id))?;
        track.add_telemetry(log.clone().into());
        Ok(())
    }
}
