//! The location validation ladder.
//!
//! ```text
//! resolve_region_for_point ──ok──▶ result
//!        │ capability absent
//!        ▼
//! active_default_region ──none──▶ not configured
//!        │ region
//!        ▼
//! test_containment ──ok──▶ covered / out of coverage
//!        │ capability absent
//!        ▼
//! degraded: accepted under the default region
//! ```
//!
//! A missing region schema short-circuits to "not configured" from any
//! step. Any other store failure ends the ladder as
//! [`GeofenceError::StoreUnavailable`]; nothing is retried.

use plaza_core::regions::{NO_ACTIVE_REGION_MESSAGE, REGIONS_NOT_CONFIGURED_MESSAGE};
use plaza_core::{Coordinate, LocationValidationResult, ResolvedRegion};
use plaza_db::CapabilityProbe;

use crate::error::GeofenceError;
use crate::repository::RegionRepository;

#[derive(Debug, Clone)]
pub struct LocationValidator<R> {
    regions: R,
}

impl<R: RegionRepository> LocationValidator<R> {
    pub fn new(regions: R) -> Self {
        Self { regions }
    }

    pub fn regions(&self) -> &R {
        &self.regions
    }

    /// Decide whether `point` may be written as a business location.
    ///
    /// # Errors
    ///
    /// Returns [`GeofenceError::StoreUnavailable`] when a ladder step fails
    /// for any reason other than a missing capability.
    pub async fn validate(
        &self,
        point: Coordinate,
    ) -> Result<LocationValidationResult, GeofenceError> {
        match self.regions.resolve_region_for_point(point).await {
            CapabilityProbe::Success(resolved) => {
                let result = from_resolver(resolved);
                tracing::debug!(%point, is_valid = result.is_valid, "region resolved by store");
                return Ok(result);
            }
            CapabilityProbe::CapabilityAbsent(capability) => {
                tracing::warn!(%capability, "region resolver unavailable; falling back to default region");
            }
            CapabilityProbe::NotConfigured => return Ok(regions_not_configured()),
            CapabilityProbe::HardFailure(source) => {
                return Err(GeofenceError::store("resolve the owning region", source));
            }
        }

        let region = match self.regions.active_default_region().await {
            CapabilityProbe::Success(Some(region)) => region,
            CapabilityProbe::Success(None) => {
                tracing::warn!("no active default region configured");
                return Ok(LocationValidationResult::not_configured(
                    NO_ACTIVE_REGION_MESSAGE,
                ));
            }
            CapabilityProbe::CapabilityAbsent(capability) => {
                tracing::warn!(%capability, "default region lookup unavailable");
                return Ok(regions_not_configured());
            }
            CapabilityProbe::NotConfigured => return Ok(regions_not_configured()),
            CapabilityProbe::HardFailure(source) => {
                return Err(GeofenceError::store("load the default region", source));
            }
        };

        match self.regions.test_containment(point, region.id).await {
            CapabilityProbe::Success(true) => {
                tracing::debug!(%point, region = %region.name, "point inside default region");
                Ok(LocationValidationResult::covered(region))
            }
            CapabilityProbe::Success(false) => {
                tracing::debug!(%point, region = %region.name, "point outside default region");
                Ok(LocationValidationResult::out_of_coverage(Some(region)))
            }
            CapabilityProbe::CapabilityAbsent(capability) => {
                tracing::warn!(
                    %point,
                    %capability,
                    region = %region.name,
                    "no containment capability; accepting location without a spatial check"
                );
                Ok(LocationValidationResult::degraded(region))
            }
            CapabilityProbe::NotConfigured => Ok(regions_not_configured()),
            CapabilityProbe::HardFailure(source) => Err(GeofenceError::store(
                "test containment in the default region",
                source,
            )),
        }
    }
}

fn from_resolver(resolved: Option<ResolvedRegion>) -> LocationValidationResult {
    match resolved {
        Some(ResolvedRegion {
            is_valid: true,
            region: Some(region),
        }) => LocationValidationResult::covered(region),
        Some(ResolvedRegion {
            region: Some(region),
            ..
        }) => LocationValidationResult::out_of_coverage(Some(region)),
        _ => LocationValidationResult::out_of_coverage(None),
    }
}

fn regions_not_configured() -> LocationValidationResult {
    tracing::warn!("service regions are not configured on this database");
    LocationValidationResult::not_configured(REGIONS_NOT_CONFIGURED_MESSAGE)
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
