//! Generic state machine kernel.
//!
//! - Phase values via the `State` trait
//! - Guard predicates for transition control and filtering
//! - Timestamped history of phase changes
//!
//! Nothing in this module performs I/O.

mod guard;
mod history;
mod state;

pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use state::State;
