//! Region reads, tiered by store capability.

use std::future::Future;
use std::time::Duration;

use plaza_core::{Coordinate, ResolvedRegion, ServiceRegion};
use plaza_db::{Capability, CapabilityProbe, ServiceRegionRow};
use sqlx::PgPool;
use uuid::Uuid;

use crate::bounded::bounded;

/// Read access to coverage regions.
///
/// Methods are listed strongest first. Each reports
/// [`CapabilityProbe::CapabilityAbsent`] only when the store lacks the
/// function it needs; every other failure is a hard failure.
pub trait RegionRepository: Send + Sync {
    /// One round trip: which active region owns `point`.
    fn resolve_region_for_point(
        &self,
        point: Coordinate,
    ) -> impl Future<Output = CapabilityProbe<Option<ResolvedRegion>>> + Send;

    /// The active default region, if one exists.
    fn active_default_region(
        &self,
    ) -> impl Future<Output = CapabilityProbe<Option<ServiceRegion>>> + Send;

    /// Whether `point` lies inside the coverage polygon of `region_id`.
    fn test_containment(
        &self,
        point: Coordinate,
        region_id: Uuid,
    ) -> impl Future<Output = CapabilityProbe<bool>> + Send;
}

/// [`RegionRepository`] over the `core` schema.
#[derive(Debug, Clone)]
pub struct PgRegionRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PgRegionRepository {
    #[must_use]
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

fn into_region(row: Option<ServiceRegionRow>) -> Option<ServiceRegion> {
    row.and_then(ServiceRegionRow::into_region)
}

impl RegionRepository for PgRegionRepository {
    async fn resolve_region_for_point(
        &self,
        point: Coordinate,
    ) -> CapabilityProbe<Option<ResolvedRegion>> {
        let result = bounded(
            self.timeout,
            plaza_db::resolve_location_region(&self.pool, point),
        )
        .await;
        CapabilityProbe::from_result(result, Capability::RegionResolver).map(|row| {
            row.map(|row| ResolvedRegion {
                is_valid: row.is_valid.unwrap_or(false),
                region: row.region.into_region(),
            })
        })
    }

    async fn active_default_region(&self) -> CapabilityProbe<Option<ServiceRegion>> {
        let via_function = CapabilityProbe::from_result(
            bounded(self.timeout, plaza_db::get_active_region_fn(&self.pool)).await,
            Capability::DefaultRegionFunction,
        );
        if !via_function.is_capability_absent() {
            return via_function.map(into_region);
        }
        tracing::debug!("core.get_active_region() missing; querying service_regions directly");

        let direct = CapabilityProbe::from_result(
            bounded(self.timeout, plaza_db::get_active_region_direct(&self.pool)).await,
            Capability::DefaultRegionFunction,
        );
        if !direct.is_capability_absent() {
            return direct.map(into_region);
        }
        tracing::debug!("ST_AsGeoJSON missing; reading default region without its polygon");

        CapabilityProbe::from_result(
            bounded(
                self.timeout,
                plaza_db::get_active_region_direct_without_geojson(&self.pool),
            )
            .await,
            Capability::DefaultRegionFunction,
        )
        .map(into_region)
    }

    async fn test_containment(&self, point: Coordinate, region_id: Uuid) -> CapabilityProbe<bool> {
        let via_function = CapabilityProbe::from_result(
            bounded(
                self.timeout,
                plaza_db::location_in_region_fn(&self.pool, point, region_id),
            )
            .await,
            Capability::ContainmentFunction,
        );
        if !via_function.is_capability_absent() {
            return via_function;
        }
        tracing::debug!(%region_id, "core.is_location_in_region() missing; testing polygon directly");

        CapabilityProbe::from_result(
            bounded(
                self.timeout,
                plaza_db::location_in_region(&self.pool, point, region_id),
            )
            .await,
            Capability::PolygonContainment,
        )
    }
}
