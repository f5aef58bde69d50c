//! Business persistence used by [`crate::BusinessLocationService`].

use std::future::Future;
use std::time::Duration;

use plaza_core::Coordinate;
use plaza_db::{
    is_point_access_failure, AddressFields, BusinessCandidateRow, BusinessLocationRow,
    BusinessStatistics, Capability, CapabilityProbe, DbError, NearestBusinessRow, NewBusiness,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::bounded::bounded;

pub trait BusinessStore: Send + Sync {
    /// Store-side geodesic nearest. Absent when the spatial functions are.
    fn nearest_by_distance(
        &self,
        reference: Coordinate,
        within: Option<Uuid>,
    ) -> impl Future<Output = CapabilityProbe<Option<NearestBusinessRow>>> + Send;

    /// Eligible businesses in store order, for in-process ranking.
    fn nearest_candidates(
        &self,
        within: Option<Uuid>,
    ) -> impl Future<Output = Result<Vec<BusinessCandidateRow>, DbError>> + Send;

    fn create_business(
        &self,
        business: &NewBusiness,
        address: Option<&AddressFields>,
    ) -> impl Future<Output = Result<Uuid, DbError>> + Send;

    /// Returns the address id now attached to the business.
    fn update_business_address(
        &self,
        business_id: Uuid,
        fields: &AddressFields,
        location: Coordinate,
    ) -> impl Future<Output = Result<Uuid, DbError>> + Send;

    /// [`DbError::NotFound`] when no business has `id`.
    fn load_business(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<BusinessLocationRow, DbError>> + Send;

    fn statistics(&self) -> impl Future<Output = Result<BusinessStatistics, DbError>> + Send;
}

/// [`BusinessStore`] over `core.businesses` and `core.addresses`.
#[derive(Debug, Clone)]
pub struct PgBusinessStore {
    pool: PgPool,
    timeout: Duration,
    default_country: String,
}

impl PgBusinessStore {
    #[must_use]
    pub fn new(pool: PgPool, timeout: Duration, default_country: String) -> Self {
        Self {
            pool,
            timeout,
            default_country,
        }
    }
}

impl BusinessStore for PgBusinessStore {
    async fn nearest_by_distance(
        &self,
        reference: Coordinate,
        within: Option<Uuid>,
    ) -> CapabilityProbe<Option<NearestBusinessRow>> {
        let result = bounded(
            self.timeout,
            plaza_db::find_nearest_business(&self.pool, reference, within),
        )
        .await;
        CapabilityProbe::from_result(result, Capability::DistanceOrdering)
    }

    async fn nearest_candidates(
        &self,
        within: Option<Uuid>,
    ) -> Result<Vec<BusinessCandidateRow>, DbError> {
        bounded(
            self.timeout,
            plaza_db::list_nearest_candidates(&self.pool, within),
        )
        .await
    }

    async fn create_business(
        &self,
        business: &NewBusiness,
        address: Option<&AddressFields>,
    ) -> Result<Uuid, DbError> {
        bounded(
            self.timeout,
            plaza_db::create_business(&self.pool, business, address, &self.default_country),
        )
        .await
    }

    async fn update_business_address(
        &self,
        business_id: Uuid,
        fields: &AddressFields,
        location: Coordinate,
    ) -> Result<Uuid, DbError> {
        bounded(
            self.timeout,
            plaza_db::update_business_address(
                &self.pool,
                business_id,
                fields,
                location,
                &self.default_country,
            ),
        )
        .await
    }

    async fn load_business(&self, id: Uuid) -> Result<BusinessLocationRow, DbError> {
        match bounded(self.timeout, plaza_db::get_business_location(&self.pool, id)).await {
            Err(err) if is_point_access_failure(&err) => {
                tracing::debug!(business_id = %id, error = %err, "native point read failed; reading point as text");
                bounded(
                    self.timeout,
                    plaza_db::get_business_location_as_text(&self.pool, id),
                )
                .await
            }
            other => other,
        }
    }

    async fn statistics(&self) -> Result<BusinessStatistics, DbError> {
        bounded(self.timeout, plaza_db::get_business_statistics(&self.pool)).await
    }
}
