//! Coordinate validation errors.

use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum GeoError {
    #[error("Latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}
