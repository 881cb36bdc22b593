//! Location, heading and heart-rate sources feeding one engine from
//! separate tasks.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::sync::Arc;
use trailpace::config::CrossingConfig;
use trailpace::crossing::{CrossingEngine, CrossingHandle, CrossingPhase};
use trailpace::geo::{FixedDeclination, GeoPoint};
use trailpace::progress::ProgressReporter;
use trailpace::store::{MemoryTrackStore, TrackStore};
use trailpace::track::Track;

fn point(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint::new(lat, lon).unwrap()
}

fn route() -> Vec<GeoPoint> {
    (0..5).map(|i| point(0.0, i as f64 * 0.01)).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sensors_on_separate_tasks_complete_the_track() {
    let store = Arc::new(MemoryTrackStore::new());
    let track = Track::new("Ridge", route()).unwrap();
    let track_id = track.id();
    store.insert(track.clone());

    let engine = CrossingHandle::new(CrossingEngine::with_store(
        CrossingConfig::default(),
        store.clone(),
    ));
    let t0 = Utc.with_ymd_and_hms(2015, 6, 1, 8, 0, 0).unwrap();
    engine.start_track(track, t0);

    let compass = {
        let engine = engine.clone();
        tokio::spawn(async move {
            for i in 0..200 {
                engine.on_heading_update((i * 7) as f64);
                tokio::task::yield_now().await;
            }
        })
    };

    // Location and heart-rate samples share one clock so timestamps never
    // regress inside the log.
    let gps = {
        let engine = engine.clone();
        tokio::spawn(async move {
            for (i, fix) in route().into_iter().enumerate() {
                let now = t0 + Duration::seconds(60 * i as i64);
                engine.on_location_update(fix, now).unwrap();
                engine.on_heart_rate(120 + i as u32, now).ok();
                tokio::task::yield_now().await;
            }
        })
    };

    gps.await.unwrap();
    compass.await.unwrap();

    assert_eq!(engine.phase(), CrossingPhase::Finished);
    assert_eq!(engine.last_crossed_partial_time().unwrap(), 240);

    let saved = store.load_track(track_id).unwrap();
    assert_eq!(saved.telemetries().len(), 1);
    assert_eq!(saved.best_telemetry().unwrap().duration(), 240);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reporter_reads_while_engine_updates() {
    let track = Track::new("Ridge", route()).unwrap();
    let engine = CrossingHandle::new(CrossingEngine::new(CrossingConfig::default()));
    let reporter = ProgressReporter::new(engine.clone(), Arc::new(FixedDeclination(0.0)));
    let today = NaiveDate::from_ymd_opt(2015, 6, 1).unwrap();
    let t0 = Utc.with_ymd_and_hms(2015, 6, 1, 8, 0, 0).unwrap();
    engine.start_track(track, t0);

    let writer = {
        let engine = engine.clone();
        tokio::spawn(async move {
            for (i, fix) in route().into_iter().enumerate() {
                engine
                    .on_location_update(fix, t0 + Duration::seconds(30 * i as i64))
                    .unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    let reader = tokio::spawn(async move {
        let mut seen = Vec::new();
        for _ in 0..50 {
            // Snapshots stop once the last checkpoint is crossed.
            let Ok(snapshot) = reporter.snapshot(today) else {
                break;
            };
            assert!(snapshot.next_checkpoint < snapshot.total_checkpoints);
            seen.push(snapshot.next_checkpoint);
            tokio::task::yield_now().await;
        }
        seen
    });

    writer.await.unwrap();
    let seen = reader.await.unwrap();

    // The index only moves forward.
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(engine.phase(), CrossingPhase::Finished);
}
