//! Telemetry recording and query errors.

use thiserror::Error;

/// Failures of [`TelemetryLog`](super::TelemetryLog) operations.
///
/// All of these are caller input problems; none leave the log modified.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TelemetryError {
    /// Event timestamps are seconds since attempt start and cannot be negative
    #[error("Invalid event timestamp {0}: must be >= 0")]
    InvalidTimestamp(i64),

    /// Events must be recorded in non-decreasing timestamp order
    #[error("Event timestamp {timestamp} precedes last recorded timestamp {last}")]
    TimestampRegression { last: i64, timestamp: i64 },

    #[error("Invalid time range [{from}, {to}]")]
    InvalidRange { from: i64, to: i64 },

    #[error("Invalid tolerance {0} m: must be >= 0")]
    InvalidTolerance(f64),

    #[error("No telemetry event matches the query")]
    NoMatchingEvents,

    /// Closest location event is farther than the requested tolerance
    #[error("Nearest location event is {nearest_meters:.1} m away (tolerance {tolerance_meters} m)")]
    ToleranceExceeded {
        nearest_meters: f64,
        tolerance_meters: f64,
    },
}
