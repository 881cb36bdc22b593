//! Checkpoint crossing: the engine owning the active attempt.
//!
//! # Phases
//!
//! - `Idle` until the first `start_track`
//! - `Active` while checkpoints remain; location updates, heart-rate
//!   samples and manual advances are accepted
//! - `Finished` once the last checkpoint is crossed; the log has been added
//!   to the track history and handed to the store
//! - `Aborted` after `abort`; the log is dropped
//!
//! Commands are checked against a guard table before anything is mutated,
//! so a rejected command never changes the engine.

mod engine;
mod error;
mod handle;
mod phase;

pub use engine::{CrossingEngine, CrossingOutcome};
pub use error::{CrossingError, ErrorCategory};
pub use handle::CrossingHandle;
pub use phase::{Command, CrossingPhase};
