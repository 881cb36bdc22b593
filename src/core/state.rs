//! Phase trait shared by the crate's state machines.
//!
//! A phase is a plain value describing where a machine currently is.
//! Inspecting it never has side effects.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for state machine phases.
///
/// Phases are small value types (usually field-less enums). The engine keeps
/// one current phase and records every change in a
/// [`StateHistory`](super::StateHistory).
///
/// # Example
///
/// ```rust
/// use trailpace::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
/// enum Lamp {
///     Off,
///     On,
///     Broken,
/// }
///
/// impl State for Lamp {
///     fn name(&self) -> &str {
///         match self {
///             Self::Off => "Off",
///             Self::On => "On",
///             Self::Broken => "Broken",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Broken)
///     }
///
///     fn is_error(&self) -> bool {
///         matches!(self, Self::Broken)
///     }
/// }
///
/// assert!(Lamp::Broken.is_final());
/// assert!(!Lamp::On.accepts_input());
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Display name used in logs and error messages.
    fn name(&self) -> &str;

    /// Terminal phases end an attempt; nothing but a restart leaves them.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }

    /// Phases reached through failure or cancellation.
    ///
    /// Default implementation returns `false`.
    fn is_error(&self) -> bool {
        false
    }

    /// Whether the machine consumes sensor input in this phase.
    ///
    /// Default implementation returns `false`.
    fn accepts_input(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
    enum Door {
        Closed,
        Open,
        Jammed,
    }

    impl State for Door {
        fn name(&self) -> &str {
            match self {
                Self::Closed => "Closed",
                Self::Open => "Open",
                Self::Jammed => "Jammed",
            }
        }

        fn is_final(&self) -> bool {
            matches!(self, Self::Jammed)
        }

        fn accepts_input(&self) -> bool {
            matches!(self, Self::Open)
        }
    }

    #[test]
    fn defaults_are_conservative() {
        assert!(!Door::Closed.is_final());
        assert!(!Door::Closed.is_error());
        assert!(!Door::Jammed.is_error());
    }

    #[test]
    fn overrides_are_respected() {
        assert!(Door::Jammed.is_final());
        assert!(Door::Open.accepts_input());
        assert!(!Door::Closed.accepts_input());
        assert_eq!(Door::Open.name(), "Open");
    }

    #[test]
    fn phase_serializes_by_name() {
        let json = serde_json::to_string(&Door::Jammed).unwrap();
        assert_eq!(json, "\"Jammed\"");
        let back: Door = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Door::Jammed);
    }
}
