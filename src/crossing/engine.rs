//! Checkpoint-crossing state machine.

use crate::config::CrossingConfig;
use crate::core::{State, StateHistory, StateTransition};
use crate::crossing::error::CrossingError;
use crate::crossing::phase::{command_rules, Command, CommandRule, CrossingPhase};
use crate::geo::{distance, initial_bearing, normalize_degrees, GeoPoint};
use crate::store::TrackStore;
use crate::telemetry::{TelemetryEvent, TelemetryLog};
use crate::track::{Checkpoint, Track};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// What a location update or manual advance did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrossingOutcome {
    /// Position recorded, no checkpoint reached
    Moving,
    /// Checkpoint `checkpoint` reached after `partial_time` seconds
    Crossed { checkpoint: usize, partial_time: i64 },
    /// Last checkpoint reached; the attempt is complete
    Finished { partial_time: i64 },
}

/// State of the attempt currently owned by the engine.
#[derive(Debug)]
struct Attempt {
    track: Track,
    next_checkpoint: usize,
    log: TelemetryLog,
    best: Option<Arc<TelemetryLog>>,
    started_at: DateTime<Utc>,
    last_location: Option<GeoPoint>,
}

impl Attempt {
    /// Whole seconds since the start, rounded down so that a fix taken
    /// even slightly before the start is negative.
    fn elapsed(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.started_at)
            .num_milliseconds()
            .div_euclid(1000)
    }

    fn next(&self) -> Option<&Checkpoint> {
        self.track.checkpoint(self.next_checkpoint)
    }
}

/// Drives one attempt at a time along a track.
///
/// The engine is a plain single-owner value; wrap it in a
/// [`CrossingHandle`](super::CrossingHandle) to feed it from several
/// sensor callbacks.
///
/// # Example
///
/// ```rust
/// use chrono::{Duration, Utc};
/// use trailpace::config::CrossingConfig;
/// use trailpace::crossing::{CrossingEngine, CrossingOutcome, CrossingPhase};
/// use trailpace::geo::GeoPoint;
/// use trailpace::track::Track;
///
/// let start = GeoPoint::new(0.0, 0.0)?;
/// let end = GeoPoint::new(0.0, 1.0)?;
/// let track = Track::new("Equator walk", vec![start, end])?;
///
/// let mut engine = CrossingEngine::new(CrossingConfig::with_crossing_radius(50.0));
/// let t0 = Utc::now();
/// engine.start_track(track, t0);
///
/// engine.on_location_update(start, t0)?;
/// let outcome = engine.on_location_update(end, t0 + Duration::seconds(120))?;
///
/// assert_eq!(outcome, CrossingOutcome::Finished { partial_time: 120 });
/// assert_eq!(engine.phase(), CrossingPhase::Finished);
/// assert_eq!(engine.last_crossed_partial_time()?, 120);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct CrossingEngine {
    config: CrossingConfig,
    phase: CrossingPhase,
    history: StateHistory<CrossingPhase>,
    rules: Vec<CommandRule>,
    attempt: Option<Attempt>,
    heading: Option<f64>,
    store: Option<Arc<dyn TrackStore>>,
}

impl Default for CrossingEngine {
    fn default() -> Self {
        Self::new(CrossingConfig::default())
    }
}

impl CrossingEngine {
    /// Idle engine.
    pub fn new(config: CrossingConfig) -> Self {
        Self {
            config,
            phase: CrossingPhase::Idle,
            history: StateHistory::new(),
            rules: command_rules(),
            attempt: None,
            heading: None,
            store: None,
        }
    }

    /// Idle engine that saves every finished attempt to `store`.
    pub fn with_store(config: CrossingConfig, store: Arc<dyn TrackStore>) -> Self {
        Self {
            store: Some(store),
            ..Self::new(config)
        }
    }

    // ----- commands -----

    /// Begin a new attempt on `track` at wall-clock time `now`.
    ///
    /// Captures the track's best attempt for later comparisons. An attempt
    /// already in progress is discarded without touching its track.
    pub fn start_track(&mut self, track: Track, now: DateTime<Utc>) {
        if self.phase == CrossingPhase::Active {
            warn!(
                track = self.attempt.as_ref().map(|a| a.track.name()),
                "discarding attempt in progress"
            );
        }

        let best = track.best_telemetry().ok();
        info!(
            track = track.name(),
            checkpoints = track.checkpoint_count(),
            best_duration = best.as_ref().map(|b| b.duration()),
            "starting track"
        );

        self.attempt = Some(Attempt {
            track,
            next_checkpoint: 0,
            log: TelemetryLog::starting_at(now),
            best,
            started_at: now,
            last_location: None,
        });
        self.enter(CrossingPhase::Active, Command::StartTrack, now);
    }

    /// Record a position fix and cross the next checkpoint if it is within
    /// the crossing radius.
    pub fn on_location_update(
        &mut self,
        position: GeoPoint,
        now: DateTime<Utc>,
    ) -> Result<CrossingOutcome, CrossingError> {
        self.ensure_allowed(Command::LocationUpdate)?;
        let radius = self.config.crossing_radius_m;
        let attempt = self.attempt_mut()?;

        let elapsed = attempt.elapsed(now);
        attempt
            .log
            .record(TelemetryEvent::location(elapsed, position))?;
        attempt.last_location = Some(position);

        let Some(target) = attempt.next() else {
            return Ok(CrossingOutcome::Moving);
        };
        let gap = distance(position, target.position);
        trace!(elapsed, gap, next = attempt.next_checkpoint, "location update");

        if gap <= radius {
            self.cross(now, Command::LocationUpdate)
        } else {
            Ok(CrossingOutcome::Moving)
        }
    }

    /// Cross the next checkpoint without checking the position.
    ///
    /// Only a `CheckpointReached` event is recorded.
    pub fn advance_checkpoint(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<CrossingOutcome, CrossingError> {
        self.ensure_allowed(Command::AdvanceCheckpoint)?;
        debug!("manual checkpoint advance");
        self.cross(now, Command::AdvanceCheckpoint)
    }

    /// Record a heart-rate sample for the running attempt.
    pub fn on_heart_rate(&mut self, bpm: u32, now: DateTime<Utc>) -> Result<(), CrossingError> {
        self.ensure_allowed(Command::HeartRate)?;
        let attempt = self.attempt_mut()?;
        let elapsed = attempt.elapsed(now);
        attempt.log.record(TelemetryEvent::heart_rate(elapsed, bpm))?;
        Ok(())
    }

    /// Store the latest magnetic heading from the device compass.
    ///
    /// Accepted in every phase; the heading belongs to the device, not the
    /// attempt.
    pub fn on_heading_update(&mut self, magnetic_heading: f64) {
        if magnetic_heading.is_finite() {
            self.heading = Some(normalize_degrees(magnetic_heading));
        } else {
            warn!(magnetic_heading, "ignoring non-finite heading");
        }
    }

    /// Forget the last heading, e.g. when the compass becomes unavailable.
    pub fn clear_heading(&mut self) {
        self.heading = None;
    }

    /// Abandon the running attempt. Nothing is added to the track history.
    pub fn abort(&mut self) -> Result<(), CrossingError> {
        self.ensure_allowed(Command::Abort)?;
        if let Some(attempt) = self.attempt.take() {
            info!(
                track = attempt.track.name(),
                crossed = attempt.next_checkpoint,
                "attempt aborted"
            );
        }
        self.enter(CrossingPhase::Aborted, Command::Abort, Utc::now());
        Ok(())
    }

    // ----- queries -----

    pub fn phase(&self) -> CrossingPhase {
        self.phase
    }

    /// True while an attempt is running.
    pub fn is_crossing(&self) -> bool {
        self.phase == CrossingPhase::Active
    }

    pub fn config(&self) -> &CrossingConfig {
        &self.config
    }

    /// Every phase change since the engine was created.
    pub fn phase_history(&self) -> &StateHistory<CrossingPhase> {
        &self.history
    }

    /// Track of the running or just finished attempt.
    ///
    /// After finishing, its history includes the new attempt.
    pub fn track(&self) -> Option<&Track> {
        self.attempt.as_ref().map(|a| &a.track)
    }

    /// Log of the running or just finished attempt.
    pub fn telemetry(&self) -> Option<&TelemetryLog> {
        self.attempt.as_ref().map(|a| &a.log)
    }

    /// Best previous attempt captured when the track was started.
    pub fn best_attempt(&self) -> Option<&Arc<TelemetryLog>> {
        self.attempt.as_ref().and_then(|a| a.best.as_ref())
    }

    /// Last magnetic heading, if a compass is reporting.
    pub fn heading(&self) -> Option<f64> {
        self.heading
    }

    pub fn last_known_location(&self) -> Option<GeoPoint> {
        self.attempt.as_ref().and_then(|a| a.last_location)
    }

    pub fn next_checkpoint_index(&self) -> Result<usize, CrossingError> {
        Ok(self.live_attempt()?.next_checkpoint)
    }

    /// Ordinal of the most recently crossed checkpoint.
    pub fn last_crossed_checkpoint(&self) -> Result<usize, CrossingError> {
        self.last_crossing().map(|(checkpoint, _)| checkpoint)
    }

    /// Seconds from the start to the most recent crossing.
    pub fn last_crossed_partial_time(&self) -> Result<i64, CrossingError> {
        self.last_crossing().map(|(_, partial)| partial)
    }

    /// Current partial minus the best attempt's partial at the same
    /// checkpoint. Positive means slower than the record.
    pub fn delta_vs_best(&self) -> Result<i64, CrossingError> {
        let (checkpoint, partial) = self.last_crossing()?;
        let best = self
            .recorded_attempt()?
            .best
            .as_ref()
            .ok_or(CrossingError::NoBestAttempt)?;
        let best_partial = best
            .checkpoint_partial(checkpoint)
            .ok_or(CrossingError::CheckpointNotInBestAttempt(checkpoint))?;
        Ok(partial - best_partial)
    }

    /// Elapsed time now minus the time at which the best attempt passed
    /// closest to the current position.
    pub fn live_delta(&self, now: DateTime<Utc>) -> Result<i64, CrossingError> {
        let attempt = self.live_attempt()?;
        let best = attempt.best.as_ref().ok_or(CrossingError::NoBestAttempt)?;
        let here = attempt.last_location.ok_or(CrossingError::NoLocationYet)?;
        let event = best.nearest_location_event(here, self.config.live_delta_tolerance_m)?;
        Ok(attempt.elapsed(now) - event.timestamp)
    }

    /// Initial bearing from the last known position to the next checkpoint.
    pub fn bearing_to_next(&self) -> Result<f64, CrossingError> {
        let (here, target) = self.leg()?;
        Ok(initial_bearing(here, target))
    }

    /// Distance in metres from the last known position to the next
    /// checkpoint.
    pub fn distance_to_next(&self) -> Result<f64, CrossingError> {
        let (here, target) = self.leg()?;
        Ok(distance(here, target))
    }

    // ----- internals -----

    fn ensure_allowed(&self, command: Command) -> Result<(), CrossingError> {
        let permitted = self
            .rules
            .iter()
            .filter(|rule| rule.command == command)
            .any(|rule| rule.permits(&self.phase));
        if permitted {
            Ok(())
        } else {
            debug!(command = command.name(), phase = %self.phase, "command rejected");
            Err(self.phase_error())
        }
    }

    fn phase_error(&self) -> CrossingError {
        match self.phase {
            CrossingPhase::Finished => CrossingError::TrackCompleted,
            _ => CrossingError::NoActiveTrack,
        }
    }

    fn attempt_mut(&mut self) -> Result<&mut Attempt, CrossingError> {
        self.attempt.as_mut().ok_or(CrossingError::NoActiveTrack)
    }

    /// Attempt that still has a next checkpoint.
    fn live_attempt(&self) -> Result<&Attempt, CrossingError> {
        match self.phase {
            CrossingPhase::Active => self.attempt.as_ref().ok_or(CrossingError::NoActiveTrack),
            _ => Err(self.phase_error()),
        }
    }

    /// Running or finished attempt.
    fn recorded_attempt(&self) -> Result<&Attempt, CrossingError> {
        match self.phase {
            CrossingPhase::Active | CrossingPhase::Finished => {
                self.attempt.as_ref().ok_or(CrossingError::NoActiveTrack)
            }
            _ => Err(CrossingError::NoActiveTrack),
        }
    }

    fn last_crossing(&self) -> Result<(usize, i64), CrossingError> {
        let event = self
            .recorded_attempt()?
            .log
            .last_checkpoint_reached()
            .ok_or(CrossingError::NoCheckpointCrossedYet)?;
        let checkpoint = event
            .checkpoint_number()
            .ok_or(CrossingError::NoCheckpointCrossedYet)?;
        Ok((checkpoint, event.timestamp))
    }

    fn leg(&self) -> Result<(GeoPoint, GeoPoint), CrossingError> {
        let attempt = self.live_attempt()?;
        let here = attempt.last_location.ok_or(CrossingError::NoLocationYet)?;
        let target = attempt.next().ok_or(CrossingError::TrackCompleted)?;
        Ok((here, target.position))
    }

    fn cross(
        &mut self,
        now: DateTime<Utc>,
        cause: Command,
    ) -> Result<CrossingOutcome, CrossingError> {
        let attempt = self.attempt_mut()?;
        let checkpoint = attempt.next_checkpoint;
        let partial_time = attempt.elapsed(now);

        attempt
            .log
            .record(TelemetryEvent::checkpoint_reached(partial_time, checkpoint))?;
        attempt.next_checkpoint += 1;
        debug!(checkpoint, partial_time, "checkpoint crossed");

        if attempt.next_checkpoint < attempt.track.checkpoint_count() {
            return Ok(CrossingOutcome::Crossed {
                checkpoint,
                partial_time,
            });
        }

        self.finish(now, cause)?;
        Ok(CrossingOutcome::Finished { partial_time })
    }

    /// Freeze the log into the track history and hand it to the store.
    fn finish(&mut self, now: DateTime<Utc>, cause: Command) -> Result<(), CrossingError> {
        let attempt = self.attempt_mut()?;
        let completed = Arc::new(attempt.log.clone());
        attempt.track.add_telemetry(Arc::clone(&completed));
        let track_id = attempt.track.id();
        info!(
            track = attempt.track.name(),
            duration = completed.duration(),
            "track completed"
        );

        self.enter(CrossingPhase::Finished, cause, now);

        if let Some(store) = &self.store {
            if let Err(err) = store.save_completed_telemetry(track_id, &completed) {
                warn!(%track_id, error = %err, "failed to persist completed attempt");
                return Err(err.into());
            }
        }
        Ok(())
    }

    fn enter(&mut self, to: CrossingPhase, cause: Command, at: DateTime<Utc>) {
        let from = self.phase;
        self.history.push(StateTransition {
            from,
            to,
            timestamp: at,
            cause: cause.name().to_string(),
        });
        self.phase = to;
        debug!(from = from.name(), to = to.name(), cause = cause.name(), "phase change");
    }
}
