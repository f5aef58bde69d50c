//! Geographic primitives: validated coordinates and great-circle distance.

mod normalize;

pub use normalize::{normalize, normalize_text};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius used for haversine distance.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("coordinate components must be finite numbers")]
    NotFinite,

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
}

/// A longitude/latitude pair in degrees (WGS84).
///
/// Construction goes through [`Coordinate::new`], so every value in
/// circulation satisfies `-180 <= longitude <= 180` and
/// `-90 <= latitude <= 90`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CoordinateParts")]
pub struct Coordinate {
    longitude: f64,
    latitude: f64,
}

#[derive(Deserialize)]
struct CoordinateParts {
    longitude: f64,
    latitude: f64,
}

impl TryFrom<CoordinateParts> for Coordinate {
    type Error = CoordinateError;

    fn try_from(parts: CoordinateParts) -> Result<Self, Self::Error> {
        Self::new(parts.longitude, parts.latitude)
    }
}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite or out-of-range components.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] naming the offending component.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, CoordinateError> {
        if !longitude.is_finite() || !latitude.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Great-circle distance to `other` in meters (haversine, spherical Earth).
    #[must_use]
    pub fn distance_meters(&self, other: &Coordinate) -> f64 {
        let phi1 = self.latitude.to_radians();
        let phi2 = other.latitude.to_radians();
        let delta_phi = (other.latitude - self.latitude).to_radians();
        let delta_lambda = (other.longitude - self.longitude).to_radians();

        let a = (delta_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_METERS * c
    }

    /// Whether `self` and `other` agree within `tolerance` degrees on both axes.
    #[must_use]
    pub fn approx_eq(&self, other: &Coordinate, tolerance: f64) -> bool {
        (self.longitude - other.longitude).abs() <= tolerance
            && (self.latitude - other.latitude).abs() <= tolerance
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "POINT({} {})", self.longitude, self.latitude)
    }
}
