//! Property-based tests for geodesy, telemetry and the crossing engine.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use std::sync::Arc;
use trailpace::config::CrossingConfig;
use trailpace::crossing::{CrossingEngine, CrossingError, CrossingPhase};
use trailpace::geo::{distance, initial_bearing, normalize_degrees, GeoPoint};
use trailpace::store::{MemoryTrackStore, TrackStore};
use trailpace::telemetry::{TelemetryError, TelemetryEvent, TelemetryLog};
use trailpace::track::Track;

prop_compose! {
    fn arbitrary_point()(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }
}

prop_compose! {
    fn arbitrary_track()(points in prop::collection::vec(arbitrary_point(), 1..8)) -> Track {
        Track::new("Generated", points).unwrap()
    }
}

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2015, 6, 1, 8, 0, 0).unwrap()
}

proptest! {
    #[test]
    fn distance_is_symmetric(a in arbitrary_point(), b in arbitrary_point()) {
        prop_assert!((distance(a, b) - distance(b, a)).abs() < 1e-6);
    }

    #[test]
    fn distance_to_self_is_zero(a in arbitrary_point()) {
        prop_assert_eq!(distance(a, a), 0.0);
    }

    #[test]
    fn distance_is_bounded_by_half_circumference(a in arbitrary_point(), b in arbitrary_point()) {
        let d = distance(a, b);
        prop_assert!(d >= 0.0);
        prop_assert!(d <= std::f64::consts::PI * trailpace::geo::EARTH_RADIUS_METERS + 1e-6);
    }

    #[test]
    fn bearing_is_in_range(a in arbitrary_point(), b in arbitrary_point()) {
        let bearing = initial_bearing(a, b);
        prop_assert!((0.0..360.0).contains(&bearing));
    }

    #[test]
    fn normalized_angles_are_in_range(angle in -1.0e6f64..1.0e6) {
        let n = normalize_degrees(angle);
        prop_assert!((0.0..360.0).contains(&n));
    }

    #[test]
    fn duration_is_max_timestamp(mut stamps in prop::collection::vec(0i64..100_000, 0..20)) {
        stamps.sort_unstable();
        let log = TelemetryLog::from_events(
            t0(),
            stamps.iter().map(|&t| TelemetryEvent::heart_rate(t, 80)),
        ).unwrap();
        prop_assert_eq!(log.duration(), stamps.last().copied().unwrap_or(0));
    }

    #[test]
    fn inverted_ranges_always_fail(from in 1i64..10_000, gap in 1i64..10_000) {
        let log = TelemetryLog::from_events(t0(), [TelemetryEvent::heart_rate(0, 60)]).unwrap();
        let to = from - gap;
        prop_assert_eq!(
            log.events_in_range(from, to),
            Err(TelemetryError::InvalidRange { from, to })
        );
    }

    #[test]
    fn start_track_always_resets(track in arbitrary_track(), crossings in 0usize..4) {
        let mut engine = CrossingEngine::new(CrossingConfig::default());
        engine.start_track(track.clone(), t0());
        for i in 0..crossings.min(track.checkpoint_count() - 1) {
            engine.advance_checkpoint(t0() + Duration::seconds(i as i64)).unwrap();
        }

        engine.start_track(track, t0());
        prop_assert_eq!(engine.phase(), CrossingPhase::Active);
        prop_assert_eq!(engine.next_checkpoint_index().unwrap(), 0);
    }

    #[test]
    fn n_crossings_finish_the_track(track in arbitrary_track(), step in 1i64..600) {
        let count = track.checkpoint_count();
        let mut engine = CrossingEngine::new(CrossingConfig::default());
        engine.start_track(track, t0());

        for i in 0..count {
            prop_assert_eq!(engine.phase(), CrossingPhase::Active);
            engine.advance_checkpoint(t0() + Duration::seconds(step * i as i64)).unwrap();
        }

        prop_assert_eq!(engine.phase(), CrossingPhase::Finished);
        let finished = engine.track().unwrap();
        prop_assert_eq!(finished.telemetries().len(), 1);
        prop_assert_eq!(
            finished.best_telemetry().unwrap().duration(),
            step * (count as i64 - 1)
        );
    }

    #[test]
    fn delta_is_difference_of_partials(current in 0i64..10_000, best in 0i64..10_000) {
        let record = TelemetryLog::from_events(
            t0(),
            [
                TelemetryEvent::checkpoint_reached(0, 0),
                TelemetryEvent::checkpoint_reached(best, 1),
            ],
        ).unwrap();
        let mut track = Track::new(
            "Pair",
            vec![GeoPoint::new(0.0, 0.0).unwrap(), GeoPoint::new(0.0, 1.0).unwrap()],
        ).unwrap();
        track.add_telemetry(Arc::new(record));

        let mut engine = CrossingEngine::new(CrossingConfig::default());
        engine.start_track(track, t0());
        engine.advance_checkpoint(t0()).unwrap();
        engine.advance_checkpoint(t0() + Duration::seconds(current)).unwrap();

        prop_assert_eq!(engine.delta_vs_best().unwrap(), current - best);
    }

    #[test]
    fn abort_never_touches_history(track in arbitrary_track(), crossings in 0usize..8) {
        let track_id = track.id();
        let store = Arc::new(MemoryTrackStore::new());
        store.insert(track.clone());

        let mut engine = CrossingEngine::with_store(CrossingConfig::default(), store.clone());
        engine.start_track(track.clone(), t0());
        for i in 0..crossings.min(track.checkpoint_count() - 1) {
            engine.advance_checkpoint(t0() + Duration::seconds(i as i64)).unwrap();
        }
        engine.abort().unwrap();

        prop_assert!(engine.track().is_none());
        prop_assert!(store.load_track(track_id).unwrap().telemetries().is_empty());
        prop_assert!(matches!(engine.next_checkpoint_index(), Err(CrossingError::NoActiveTrack)));
    }
}
