//! Geodesy on a spherical Earth.
//!
//! Distances use the haversine formula, bearings the standard initial
//! great-circle course. Heading correction lives in [`heading`].

pub mod error;
pub mod heading;

pub use error::GeoError;
pub use heading::{
    normalize_degrees, relative_bearing, true_north_heading, DeclinationProvider,
    FixedDeclination,
};

use serde::{Deserialize, Serialize};

/// Mean Earth radius in metres (IUGG).
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// Validated latitude/longitude pair in decimal degrees.
///
/// Equality is exact coordinate equality.
///
/// # Example
///
/// ```rust
/// use trailpace::geo::{GeoPoint, GeoError};
///
/// let summit = GeoPoint::new(45.8326, 6.8652).unwrap();
/// assert_eq!(summit.latitude(), 45.8326);
///
/// assert!(matches!(GeoPoint::new(91.0, 0.0), Err(GeoError::LatitudeOutOfRange(_))));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint", into = "RawPoint")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Serialize, Deserialize)]
struct RawPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawPoint> for GeoPoint {
    type Error = GeoError;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.latitude, raw.longitude)
    }
}

impl From<GeoPoint> for RawPoint {
    fn from(point: GeoPoint) -> Self {
        RawPoint {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

impl GeoPoint {
    /// Fails if either coordinate is out of range or NaN.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in metres.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance(*self, *other)
    }

    /// Initial bearing to `other` in degrees.
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        initial_bearing(*self, *other)
    }
}

/// Great-circle distance between two points in metres.
///
/// Symmetric, non-negative, and exactly zero for identical points.
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    if a == b {
        return 0.0;
    }

    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_METERS * c
}

/// Initial course from `from` to `to` in degrees, within [0, 360).
///
/// Coincident points have no defined course; this returns 0.0 for them
/// and callers are expected to check first.
pub fn initial_bearing(from: GeoPoint, to: GeoPoint) -> f64 {
    if from == to {
        return 0.0;
    }

    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let x = delta_lon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    normalize_degrees(x.atan2(y).to_degrees())
}
