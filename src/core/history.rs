//! Timestamped record of phase changes.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One phase change and the command that caused it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// Phase before the change
    pub from: S,
    /// Phase after the change
    pub to: S,
    /// Wall-clock instant of the change
    pub timestamp: DateTime<Utc>,
    /// Command that triggered the change, e.g. `"start_track"`
    pub cause: String,
}

/// Ordered history of phase changes.
///
/// `record` returns a new history and leaves the receiver untouched;
/// `push` appends in place for owners that keep a single history.
///
/// # Example
///
/// ```rust
/// use trailpace::core::{StateHistory, StateTransition};
/// use trailpace::crossing::CrossingPhase;
/// use chrono::Utc;
///
/// let history = StateHistory::new().record(StateTransition {
///     from: CrossingPhase::Idle,
///     to: CrossingPhase::Active,
///     timestamp: Utc::now(),
///     cause: "start_track".to_string(),
/// });
///
/// assert_eq!(history.path(), vec![&CrossingPhase::Idle, &CrossingPhase::Active]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Return a copy of this history with `transition` appended.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut next = self.clone();
        next.push(transition);
        next
    }

    /// Append `transition` in place.
    pub fn push(&mut self, transition: StateTransition<S>) {
        self.transitions.push(transition);
    }

    /// Phases traversed: the first `from`, then every `to`.
    pub fn path(&self) -> Vec<&S> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        path.extend(self.transitions.iter().map(|t| &t.to));
        path
    }

    /// Elapsed wall-clock time between the first and last change.
    ///
    /// `None` when empty or when the clock went backwards.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.transitions.first()?;
        let last = self.transitions.last()?;
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// Most recent change.
    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.last()
    }

    /// Number of times the machine entered `phase`.
    pub fn entries_into(&self, phase: &S) -> usize {
        self.transitions.iter().filter(|t| &t.to == phase).count()
    }

    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }
}
