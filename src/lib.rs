//! Trailpace: checkpoint crossing and best-attempt comparison for hikers
//!
//! A hiker follows a track of ordered checkpoints. Trailpace consumes
//! location fixes, decides when each checkpoint is crossed, records a
//! telemetry log of the attempt, and compares progress with the fastest
//! previous attempt on the same track.
//!
//! # Modules
//!
//! - [`geo`]: distances, bearings and declination-corrected headings
//! - [`telemetry`]: the append-only event log of one attempt
//! - [`track`]: checkpoints and best-attempt selection
//! - [`crossing`]: the state machine owning the active attempt
//! - [`progress`]: display values for the track screen
//! - [`core`]: generic phase, guard and history types the engine is built on
//!
//! Persistence, sensors and the UI are collaborators: the crate talks to
//! them through [`store::TrackStore`], plain method calls on
//! [`crossing::CrossingHandle`], and [`geo::DeclinationProvider`].
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use std::sync::Arc;
//! use trailpace::config::CrossingConfig;
//! use trailpace::crossing::{CrossingEngine, CrossingHandle};
//! use trailpace::geo::{FixedDeclination, GeoPoint};
//! use trailpace::progress::ProgressReporter;
//! use trailpace::track::Track;
//!
//! let track = Track::new(
//!     "Lago di Tenno loop",
//!     vec![GeoPoint::new(45.9196, 10.8317)?, GeoPoint::new(45.9221, 10.8345)?],
//! )?;
//!
//! let engine = CrossingHandle::new(CrossingEngine::new(CrossingConfig::default()));
//! let reporter = ProgressReporter::new(engine.clone(), Arc::new(FixedDeclination(2.5)));
//!
//! let t0 = Utc::now();
//! engine.start_track(track, t0);
//! engine.on_location_update(GeoPoint::new(45.9196, 10.8317)?, t0 + Duration::seconds(4))?;
//!
//! assert_eq!(engine.next_checkpoint_index()?, 1);
//! assert!(reporter.distance_to_next()? > 300);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod core;
pub mod crossing;
pub mod geo;
pub mod progress;
pub mod store;
pub mod telemetry;
pub mod track;

// Re-export commonly used types
pub use config::{CrossingConfig, CROSSING_RADIUS_METERS};
pub use crossing::{CrossingEngine, CrossingError, CrossingHandle, CrossingOutcome, CrossingPhase};
pub use geo::GeoPoint;
pub use progress::ProgressReporter;
pub use telemetry::{TelemetryEvent, TelemetryLog};
pub use track::Track;
