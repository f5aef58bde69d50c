//! Coverage regions and the outcome of validating a point against them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinate;

pub const NO_ACTIVE_REGION_MESSAGE: &str =
    "no active region configured; add an active default service region";
pub const REGIONS_NOT_CONFIGURED_MESSAGE: &str =
    "no active region available: service regions are not configured on this database";
pub const OUTSIDE_ALL_REGIONS_MESSAGE: &str = "no active region covers this location";

/// An administratively defined coverage area. Read-only to this system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRegion {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub center: Option<Coordinate>,
    pub max_delivery_radius_meters: i32,
    pub min_order_amount: Decimal,
    pub is_active: bool,
    pub is_default: bool,
    /// `ST_AsGeoJSON` rendering of the polygon, when the store could produce it.
    pub coverage_area_geojson: Option<String>,
}

/// What a store-side region resolver reported for a point.
///
/// `region` is `None` when the resolver found no owning region (or returned
/// a row without an id).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRegion {
    pub is_valid: bool,
    pub region: Option<ServiceRegion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// Containment was confirmed by the store.
    Covered,
    /// Containment was tested and failed.
    OutOfCoverage,
    /// No active region exists, or the region schema is missing.
    NotConfigured,
    /// Accepted without a containment test because the store lacks the
    /// spatial capability. Administrators must be told.
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationValidationResult {
    pub is_valid: bool,
    pub region: Option<ServiceRegion>,
    pub message: String,
    pub status: ValidationStatus,
}

impl LocationValidationResult {
    #[must_use]
    pub fn covered(region: ServiceRegion) -> Self {
        Self {
            is_valid: true,
            message: format!("location is inside coverage region: {}", region.name),
            region: Some(region),
            status: ValidationStatus::Covered,
        }
    }

    /// Point tested against `region` (when known) and found outside.
    #[must_use]
    pub fn out_of_coverage(region: Option<ServiceRegion>) -> Self {
        let message = match &region {
            Some(region) => format!(
                "location is outside the active coverage region ({})",
                region.name
            ),
            None => OUTSIDE_ALL_REGIONS_MESSAGE.to_string(),
        };
        Self {
            is_valid: false,
            region,
            message,
            status: ValidationStatus::OutOfCoverage,
        }
    }

    #[must_use]
    pub fn not_configured(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            region: None,
            message: message.into(),
            status: ValidationStatus::NotConfigured,
        }
    }

    #[must_use]
    pub fn degraded(region: ServiceRegion) -> Self {
        Self {
            is_valid: true,
            message: format!(
                "validation skipped: spatial capability unavailable, accepted under region {}",
                region.name
            ),
            region: Some(region),
            status: ValidationStatus::Degraded,
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.status == ValidationStatus::Degraded
    }
}
