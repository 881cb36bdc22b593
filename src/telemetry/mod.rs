//! Append-only telemetry log of a single attempt.
//!
//! A log is filled while an attempt is running and then shared read-only
//! (behind an `Arc`) as part of a track's history. Query methods never
//! return an empty result: an empty match is reported as
//! [`TelemetryError::NoMatchingEvents`].

pub mod error;
pub mod event;

pub use error::TelemetryError;
pub use event::{EventKind, EventPayload, TelemetryEvent};

use crate::core::Guard;
use crate::geo::{distance, GeoPoint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordered record of the events of one attempt.
///
/// # Example
///
/// ```rust
/// use trailpace::telemetry::{EventKind, TelemetryEvent, TelemetryLog};
///
/// let mut log = TelemetryLog::new();
/// log.record(TelemetryEvent::heart_rate(0, 92)).unwrap();
/// log.record(TelemetryEvent::checkpoint_reached(60, 0)).unwrap();
///
/// assert_eq!(log.duration(), 60);
/// assert_eq!(log.events_of_type(EventKind::HeartRate).unwrap().len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLog")]
pub struct TelemetryLog {
    id: Uuid,
    started_at: DateTime<Utc>,
    events: Vec<TelemetryEvent>,
}

/// Stored form of a log, checked event by event on load.
#[derive(Deserialize)]
struct RawLog {
    id: Uuid,
    started_at: DateTime<Utc>,
    events: Vec<TelemetryEvent>,
}

impl TryFrom<RawLog> for TelemetryLog {
    type Error = TelemetryError;

    fn try_from(raw: RawLog) -> Result<Self, Self::Error> {
        let log = Self::from_events(raw.started_at, raw.events)?;
        Ok(Self { id: raw.id, ..log })
    }
}

impl Default for TelemetryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryLog {
    /// Empty log stamped with the current time.
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Empty log for an attempt that started at `started_at`.
    pub fn starting_at(started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at,
            events: Vec::new(),
        }
    }

    /// Rebuild a log from stored events, validating order and timestamps.
    pub fn from_events<I>(started_at: DateTime<Utc>, events: I) -> Result<Self, TelemetryError>
    where
        I: IntoIterator<Item = TelemetryEvent>,
    {
        let mut log = Self::starting_at(started_at);
        for event in events {
            log.record(event)?;
        }
        Ok(log)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Append an event.
    pub fn record(&mut self, event: TelemetryEvent) -> Result<(), TelemetryError> {
        if event.timestamp < 0 {
            return Err(TelemetryError::InvalidTimestamp(event.timestamp));
        }
        if let Some(last) = self.events.last() {
            if event.timestamp < last.timestamp {
                return Err(TelemetryError::TimestampRegression {
                    last: last.timestamp,
                    timestamp: event.timestamp,
                });
            }
        }
        self.events.push(event);
        Ok(())
    }

    /// All events in recording order.
    pub fn events(&self) -> &[TelemetryEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events with `from <= timestamp <= to`.
    pub fn events_in_range(&self, from: i64, to: i64) -> Result<Vec<TelemetryEvent>, TelemetryError> {
        if from < 0 || to < from {
            return Err(TelemetryError::InvalidRange { from, to });
        }
        non_empty(
            self.events
                .iter()
                .filter(|e| (from..=to).contains(&e.timestamp))
                .copied()
                .collect(),
        )
    }

    /// Events of one kind, in recording order.
    pub fn events_of_type(&self, kind: EventKind) -> Result<Vec<TelemetryEvent>, TelemetryError> {
        non_empty(
            self.events
                .iter()
                .filter(|e| e.kind() == kind)
                .copied()
                .collect(),
        )
    }

    /// Events accepted by `guard`, in recording order.
    pub fn events_matching(
        &self,
        guard: &Guard<TelemetryEvent>,
    ) -> Result<Vec<TelemetryEvent>, TelemetryError> {
        non_empty(
            self.events
                .iter()
                .filter(|e| guard.check(e))
                .copied()
                .collect(),
        )
    }

    /// Location event closest to `near`, provided it lies within
    /// `tolerance_meters`. Ties keep the earliest event.
    pub fn nearest_location_event(
        &self,
        near: GeoPoint,
        tolerance_meters: f64,
    ) -> Result<TelemetryEvent, TelemetryError> {
        if tolerance_meters.is_nan() || tolerance_meters < 0.0 {
            return Err(TelemetryError::InvalidTolerance(tolerance_meters));
        }

        let mut nearest: Option<(f64, &TelemetryEvent)> = None;
        for event in &self.events {
            let Some(point) = event.point() else {
                continue;
            };
            let d = distance(near, point);
            if nearest.map_or(true, |(best, _)| d < best) {
                nearest = Some((d, event));
            }
        }

        match nearest {
            None => Err(TelemetryError::NoMatchingEvents),
            Some((d, _)) if d > tolerance_meters => Err(TelemetryError::ToleranceExceeded {
                nearest_meters: d,
                tolerance_meters,
            }),
            Some((_, event)) => Ok(*event),
        }
    }

    /// Total elapsed seconds: the largest timestamp, or 0 when empty.
    pub fn duration(&self) -> i64 {
        self.events.iter().map(|e| e.timestamp).max().unwrap_or(0)
    }

    /// Partial time at which checkpoint `checkpoint_number` was first reached.
    pub fn checkpoint_partial(&self, checkpoint_number: usize) -> Option<i64> {
        self.events
            .iter()
            .find(|e| e.checkpoint_number() == Some(checkpoint_number))
            .map(|e| e.timestamp)
    }

    /// Most recent `CheckpointReached` event.
    pub fn last_checkpoint_reached(&self) -> Option<&TelemetryEvent> {
        self.events
            .iter()
            .rev()
            .find(|e| e.kind() == EventKind::CheckpointReached)
    }

    /// Most recent `Location` event.
    pub fn last_location(&self) -> Option<&TelemetryEvent> {
        self.events
            .iter()
            .rev()
            .find(|e| e.kind() == EventKind::Location)
    }
}

fn non_empty(events: Vec<TelemetryEvent>) -> Result<Vec<TelemetryEvent>, TelemetryError> {
    if events.is_empty() {
        Err(TelemetryError::NoMatchingEvents)
    } else {
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    fn sample_log() -> TelemetryLog {
        TelemetryLog::from_events(
            Utc::now(),
            [
                TelemetryEvent::location(0, point(0.0, 0.0)),
                TelemetryEvent::checkpoint_reached(0, 0),
                TelemetryEvent::heart_rate(30, 110),
                TelemetryEvent::location(60, point(0.0, 0.5)),
                TelemetryEvent::location(120, point(0.0, 1.0)),
                TelemetryEvent::checkpoint_reached(120, 1),
            ],
        )
        .unwrap()
    }

    #[test]
    fn record_rejects_negative_timestamp() {
        let mut log = TelemetryLog::new();
        let result = log.record(TelemetryEvent::heart_rate(-1, 80));

        assert_eq!(result, Err(TelemetryError::InvalidTimestamp(-1)));
        assert!(log.is_empty());
    }

    #[test]
    fn record_rejects_going_back_in_time() {
        let mut log = TelemetryLog::new();
        log.record(TelemetryEvent::heart_rate(10, 80)).unwrap();
        log.record(TelemetryEvent::heart_rate(10, 81)).unwrap();

        let result = log.record(TelemetryEvent::heart_rate(9, 82));
        assert_eq!(
            result,
            Err(TelemetryError::TimestampRegression {
                last: 10,
                timestamp: 9
            })
        );
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn events_keep_insertion_order() {
        let log = sample_log();
        let stamps: Vec<i64> = log.events().iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![0, 0, 30, 60, 120, 120]);
    }

    #[test]
    fn range_is_inclusive() {
        let log = sample_log();
        let events = log.events_in_range(30, 60).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], TelemetryEvent::heart_rate(30, 110));
    }

    #[test]
    fn inverted_range_fails_regardless_of_contents() {
        assert_eq!(
            sample_log().events_in_range(10, 5),
            Err(TelemetryError::InvalidRange { from: 10, to: 5 })
        );
        assert_eq!(
            TelemetryLog::new().events_in_range(10, 5),
            Err(TelemetryError::InvalidRange { from: 10, to: 5 })
        );
        assert!(matches!(
            sample_log().events_in_range(-1, 5),
            Err(TelemetryError::InvalidRange { .. })
        ));
    }

    #[test]
    fn empty_range_reports_no_matches() {
        assert_eq!(
            sample_log().events_in_range(61, 119),
            Err(TelemetryError::NoMatchingEvents)
        );
    }

    #[test]
    fn type_filter() {
        let log = sample_log();
        assert_eq!(log.events_of_type(EventKind::Location).unwrap().len(), 3);
        assert_eq!(
            log.events_of_type(EventKind::CheckpointReached).unwrap().len(),
            2
        );
        assert_eq!(
            TelemetryLog::new().events_of_type(EventKind::HeartRate),
            Err(TelemetryError::NoMatchingEvents)
        );
    }

    #[test]
    fn predicate_filter() {
        let log = sample_log();
        let fast_pulse = Guard::new(|e: &TelemetryEvent| {
            matches!(e.payload, EventPayload::HeartRate { bpm } if bpm > 100)
        });
        assert_eq!(log.events_matching(&fast_pulse).unwrap().len(), 1);

        let never = Guard::new(|_: &TelemetryEvent| false);
        assert_eq!(
            log.events_matching(&never),
            Err(TelemetryError::NoMatchingEvents)
        );
    }

    #[test]
    fn nearest_location_within_tolerance() {
        let log = sample_log();
        let found = log
            .nearest_location_event(point(0.0, 0.50001), 5.0)
            .unwrap();
        assert_eq!(found.timestamp, 60);
    }

    #[test]
    fn nearest_location_beyond_tolerance() {
        let log = sample_log();
        let result = log.nearest_location_event(point(0.0, 0.25), 5.0);
        assert!(matches!(
            result,
            Err(TelemetryError::ToleranceExceeded { .. })
        ));
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        assert_eq!(
            sample_log().nearest_location_event(point(0.0, 0.0), -1.0),
            Err(TelemetryError::InvalidTolerance(-1.0))
        );
    }

    #[test]
    fn nan_tolerance_is_rejected() {
        let result = sample_log().nearest_location_event(point(0.0, 0.0), f64::NAN);
        assert!(matches!(
            result,
            Err(TelemetryError::InvalidTolerance(t)) if t.is_nan()
        ));
    }

    #[test]
    fn nearest_location_without_locations() {
        let mut log = TelemetryLog::new();
        log.record(TelemetryEvent::heart_rate(0, 70)).unwrap();
        assert_eq!(
            log.nearest_location_event(point(0.0, 0.0), 100.0),
            Err(TelemetryError::NoMatchingEvents)
        );
    }

    #[test]
    fn duration_is_max_timestamp() {
        assert_eq!(sample_log().duration(), 120);
        assert_eq!(TelemetryLog::new().duration(), 0);
    }

    #[test]
    fn checkpoint_lookups() {
        let log = sample_log();
        assert_eq!(log.checkpoint_partial(0), Some(0));
        assert_eq!(log.checkpoint_partial(1), Some(120));
        assert_eq!(log.checkpoint_partial(2), None);
        assert_eq!(
            log.last_checkpoint_reached(),
            Some(&TelemetryEvent::checkpoint_reached(120, 1))
        );
        assert_eq!(log.last_location().and_then(|e| e.point()), Some(point(0.0, 1.0)));
    }

    #[test]
    fn serde_keeps_id_and_events() {
        let log = sample_log();
        let json = serde_json::to_string(&log).unwrap();
        let back: TelemetryLog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, log);
    }

    #[test]
    fn stored_log_going_back_in_time_is_rejected() {
        let json = r#"{
            "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "started_at": "2015-06-01T08:00:00Z",
            "events": [
                {"timestamp": 50, "type": "heart_rate", "bpm": 90},
                {"timestamp": -7, "type": "heart_rate", "bpm": 91}
            ]
        }"#;
        assert!(serde_json::from_str::<TelemetryLog>(json).is_err());

        let regressing = json.replace("-7", "20");
        assert!(serde_json::from_str::<TelemetryLog>(&regressing).is_err());
    }

    #[test]
    fn from_events_validates() {
        let result = TelemetryLog::from_events(
            Utc::now(),
            [
                TelemetryEvent::heart_rate(5, 70),
                TelemetryEvent::heart_rate(4, 70),
            ],
        );
        assert!(matches!(
            result,
            Err(TelemetryError::TimestampRegression { .. })
        ));
    }
}
