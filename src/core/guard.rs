//! Pure predicates used to gate transitions and filter values.

use std::fmt;

/// Boxed, thread-safe predicate over `T`.
///
/// Guards gate phase transitions in the crossing engine and filter
/// telemetry events. They must be deterministic and free of side effects.
///
/// # Example
///
/// ```rust
/// use trailpace::core::Guard;
///
/// let even = Guard::new(|n: &i64| n % 2 == 0);
/// let small = Guard::new(|n: &i64| *n < 10);
/// let both = even.and(small);
///
/// assert!(both.check(&4));
/// assert!(!both.check(&12));
/// assert!(!both.check(&3));
/// ```
pub struct Guard<T: ?Sized> {
    predicate: Box<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T: ?Sized + 'static> Guard<T> {
    /// Create a guard from a pure predicate function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Guard that accepts exactly the listed values.
    pub fn one_of(allowed: Vec<T>) -> Self
    where
        T: Sized + PartialEq + Send + Sync,
    {
        Self::new(move |value| allowed.contains(value))
    }

    /// Evaluate the predicate.
    pub fn check(&self, value: &T) -> bool {
        (self.predicate)(value)
    }

    /// Both guards must pass.
    pub fn and(self, other: Guard<T>) -> Self {
        Self::new(move |value| self.check(value) && other.check(value))
    }

    /// Inverts the guard.
    pub fn negate(self) -> Self {
        Self::new(move |value| !self.check(value))
    }
}

impl<T: ?Sized> fmt::Debug for Guard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, PartialEq, Debug)]
    enum Light {
        Red,
        Amber,
        Green,
    }

    #[test]
    fn one_of_accepts_listed_values() {
        let guard = Guard::one_of(vec![Light::Red, Light::Amber]);

        assert!(guard.check(&Light::Red));
        assert!(guard.check(&Light::Amber));
        assert!(!guard.check(&Light::Green));
    }

    #[test]
    fn negate_flips_result() {
        let guard = Guard::new(|l: &Light| *l == Light::Green).negate();

        assert!(guard.check(&Light::Red));
        assert!(!guard.check(&Light::Green));
    }

    #[test]
    fn and_requires_both() {
        let not_red = Guard::new(|l: &Light| *l != Light::Red);
        let not_green = Guard::new(|l: &Light| *l != Light::Green);
        let guard = not_red.and(not_green);

        assert!(guard.check(&Light::Amber));
        assert!(!guard.check(&Light::Red));
        assert!(!guard.check(&Light::Green));
    }

    #[test]
    fn guard_is_deterministic() {
        let guard = Guard::new(|n: &u32| n.is_power_of_two());
        assert_eq!(guard.check(&64), guard.check(&64));
    }
}
