//! Classification of store failures into capability signatures.
//!
//! Every tiered query in this workspace decides whether to fall through to
//! a weaker tier by asking [`classify`], never by matching on error text.

use crate::DbError;

/// `undefined_function`: the only signature that means "capability absent".
pub const SQLSTATE_UNDEFINED_FUNCTION: &str = "42883";
/// `undefined_table`
pub const SQLSTATE_UNDEFINED_TABLE: &str = "42P01";
/// `invalid_schema_name`
pub const SQLSTATE_INVALID_SCHEMA_NAME: &str = "3F000";
/// `datatype_mismatch`
pub const SQLSTATE_DATATYPE_MISMATCH: &str = "42804";

/// A store-side capability the geofence ladder may probe for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// `core.get_location_region(lon, lat)`
    RegionResolver,
    /// `core.get_active_region()`
    DefaultRegionFunction,
    /// `core.is_location_in_region(lon, lat, region_id)`
    ContainmentFunction,
    /// Raw polygon test on `service_regions.coverage_area`.
    PolygonContainment,
    /// Geodesic ordering via `ST_Distance` on geography.
    DistanceOrdering,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Capability::RegionResolver => "region_resolver",
            Capability::DefaultRegionFunction => "default_region_function",
            Capability::ContainmentFunction => "containment_function",
            Capability::PolygonContainment => "polygon_containment",
            Capability::DistanceOrdering => "distance_ordering",
        };
        f.write_str(name)
    }
}

impl Capability {
    /// Whether this capability reads `core.service_regions`.
    ///
    /// A missing table or schema means "regions not configured" only for
    /// these; for any other table it is a hard failure.
    #[must_use]
    pub fn is_region_lookup(self) -> bool {
        !matches!(self, Capability::DistanceOrdering)
    }
}

/// How a failed store call should steer a fallback ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSignature {
    /// SQLSTATE `42883`: try the next tier.
    CapabilityAbsent,
    /// SQLSTATE `42P01` / `3F000`: the region schema is missing.
    NotConfigured,
    /// Anything else, including timeouts and connection loss.
    HardFailure,
}

/// Map a [`DbError`] onto the signature the ladders act on.
#[must_use]
pub fn classify(err: &DbError) -> ErrorSignature {
    match err.sqlstate().as_deref() {
        Some(SQLSTATE_UNDEFINED_FUNCTION) => ErrorSignature::CapabilityAbsent,
        Some(SQLSTATE_UNDEFINED_TABLE | SQLSTATE_INVALID_SCHEMA_NAME) => {
            ErrorSignature::NotConfigured
        }
        _ => ErrorSignature::HardFailure,
    }
}

/// Whether a native point read failed for a reason a textual read could avoid.
#[must_use]
pub fn is_point_access_failure(err: &DbError) -> bool {
    matches!(
        err.sqlstate().as_deref(),
        Some(SQLSTATE_DATATYPE_MISMATCH | SQLSTATE_UNDEFINED_FUNCTION)
    )
}

/// Outcome of one tiered store call.
#[derive(Debug)]
pub enum CapabilityProbe<T> {
    Success(T),
    CapabilityAbsent(Capability),
    NotConfigured,
    HardFailure(DbError),
}

impl<T> CapabilityProbe<T> {
    /// Fold a query result into a probe, tagging absence with `capability`.
    pub fn from_result(result: Result<T, DbError>, capability: Capability) -> Self {
        match result {
            Ok(value) => CapabilityProbe::Success(value),
            Err(err) => match classify(&err) {
                ErrorSignature::CapabilityAbsent => CapabilityProbe::CapabilityAbsent(capability),
                ErrorSignature::NotConfigured if capability.is_region_lookup() => {
                    CapabilityProbe::NotConfigured
                }
                ErrorSignature::NotConfigured | ErrorSignature::HardFailure => CapabilityProbe::HardFailure(err),
            },
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CapabilityProbe<U> {
        match self {
            CapabilityProbe::Success(value) => CapabilityProbe::Success(f(value)),
            CapabilityProbe::CapabilityAbsent(capability) => {
                CapabilityProbe::CapabilityAbsent(capability)
            }
            CapabilityProbe::NotConfigured => CapabilityProbe::NotConfigured,
            CapabilityProbe::HardFailure(err) => CapabilityProbe::HardFailure(err),
        }
    }

    #[must_use]
    pub fn is_capability_absent(&self) -> bool {
        matches!(self, CapabilityProbe::CapabilityAbsent(_))
    }
}
