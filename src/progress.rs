//! Display values for the track screen.
//!
//! [`ProgressReporter`] holds no state of its own. Every call reads the
//! engine through its [`CrossingHandle`].

use crate::crossing::{CrossingError, CrossingHandle};
use crate::geo::{relative_bearing, true_north_heading, DeclinationProvider};
use chrono::NaiveDate;
use std::sync::Arc;

/// Values shown on the track screen, all read under one lock.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressSnapshot {
    /// Index of the checkpoint being approached
    pub next_checkpoint: usize,
    pub total_checkpoints: usize,
    /// Rounded metres to the next checkpoint, once a fix is available
    pub distance_m: Option<u64>,
    /// Seconds from the start to the last crossing
    pub last_partial: Option<i64>,
    /// Seconds behind (positive) or ahead of (negative) the best attempt
    pub delta: Option<i64>,
    /// Clockwise turn needed to face the next checkpoint; `None` without a
    /// compass reading or a fix
    pub compass_offset: Option<f64>,
}

pub struct ProgressReporter {
    engine: CrossingHandle,
    declination: Arc<dyn DeclinationProvider>,
}

impl ProgressReporter {
    pub fn new(engine: CrossingHandle, declination: Arc<dyn DeclinationProvider>) -> Self {
        Self {
            engine,
            declination,
        }
    }

    /// Metres to the next checkpoint, rounded.
    pub fn distance_to_next(&self) -> Result<u64, CrossingError> {
        self.engine.distance_to_next().map(round_meters)
    }

    /// Distance to the next checkpoint, formatted for display.
    pub fn distance_text(&self) -> Result<String, CrossingError> {
        self.engine.distance_to_next().map(format_distance)
    }

    pub fn delta_vs_best(&self) -> Result<i64, CrossingError> {
        self.engine.delta_vs_best()
    }

    /// Delta against the best attempt, formatted as a signed `m:ss`.
    pub fn delta_text(&self) -> Result<String, CrossingError> {
        self.engine.delta_vs_best().map(format_delta)
    }

    /// Clockwise angle between where the device points and the next
    /// checkpoint, in [0, 360).
    ///
    /// `Ok(None)` when no heading has been reported.
    pub fn compass_offset(&self, today: NaiveDate) -> Result<Option<f64>, CrossingError> {
        self.engine.read(|engine| -> Result<Option<f64>, CrossingError> {
            let bearing = engine.bearing_to_next()?;
            let Some(heading) = engine.heading() else {
                return Ok(None);
            };
            let here = engine
                .last_known_location()
                .ok_or(CrossingError::NoLocationYet)?;
            let true_heading = true_north_heading(heading, here, today, self.declination.as_ref());
            Ok(Some(relative_bearing(bearing, true_heading)))
        })
    }

    /// Every display value at once.
    ///
    /// Fails only when no attempt is running; missing optional data shows
    /// up as `None` fields.
    pub fn snapshot(&self, today: NaiveDate) -> Result<ProgressSnapshot, CrossingError> {
        self.engine.read(|engine| -> Result<ProgressSnapshot, CrossingError> {
            let next_checkpoint = engine.next_checkpoint_index()?;
            let total_checkpoints = engine
                .track()
                .map(|t| t.checkpoint_count())
                .ok_or(CrossingError::NoActiveTrack)?;

            let compass_offset = match (engine.bearing_to_next(), engine.heading()) {
                (Ok(bearing), Some(heading)) => engine.last_known_location().map(|here| {
                    let true_heading =
                        true_north_heading(heading, here, today, self.declination.as_ref());
                    relative_bearing(bearing, true_heading)
                }),
                _ => None,
            };

            Ok(ProgressSnapshot {
                next_checkpoint,
                total_checkpoints,
                distance_m: engine.distance_to_next().ok().map(round_meters),
                last_partial: engine.last_crossed_partial_time().ok(),
                delta: engine.delta_vs_best().ok(),
                compass_offset,
            })
        })
    }
}

fn round_meters(meters: f64) -> u64 {
    meters.round().max(0.0) as u64
}

/// `"850 m"` below one kilometre, `"1.25 km"` above.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{} m", round_meters(meters))
    } else {
        format!("{:.2} km", meters / 1000.0)
    }
}

/// Signed minutes and seconds: `"+0:10"`, `"-1:05"`, `"+0:00"`.
pub fn format_delta(seconds: i64) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let magnitude = seconds.unsigned_abs();
    format!("{sign}{}:{:02}", magnitude / 60, magnitude % 60)
}
