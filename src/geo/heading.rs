//! Magnetic declination correction and compass arithmetic.

use super::GeoPoint;
use chrono::NaiveDate;

/// Source of magnetic declination values.
///
/// Positive declination means magnetic north lies east of true north.
/// Real implementations are backed by a geomagnetic model such as WMM.
pub trait DeclinationProvider: Send + Sync {
    /// Declination in degrees at `at` on `when`.
    fn declination(&self, at: GeoPoint, when: NaiveDate) -> f64;
}

/// Same declination everywhere, every day.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FixedDeclination(pub f64);

impl DeclinationProvider for FixedDeclination {
    fn declination(&self, _at: GeoPoint, _when: NaiveDate) -> f64 {
        self.0
    }
}

impl<F> DeclinationProvider for F
where
    F: Fn(GeoPoint, NaiveDate) -> f64 + Send + Sync,
{
    fn declination(&self, at: GeoPoint, when: NaiveDate) -> f64 {
        self(at, when)
    }
}

/// Wrap any angle into [0, 360).
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Convert a magnetic compass heading into a true-north heading in [0, 360).
pub fn true_north_heading(
    magnetic_heading: f64,
    at: GeoPoint,
    when: NaiveDate,
    provider: &dyn DeclinationProvider,
) -> f64 {
    normalize_degrees(magnetic_heading - provider.declination(at, when))
}

/// Angle to turn clockwise from `heading` to face `bearing`, in [0, 360).
pub fn relative_bearing(bearing: f64, heading: f64) -> f64 {
    normalize_degrees(bearing - heading)
}
