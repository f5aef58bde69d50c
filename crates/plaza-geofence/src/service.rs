//! Location-aware business operations.

use chrono::{DateTime, Utc};
use plaza_core::{
    normalize, split_street_number, Coordinate, LocationValidationResult, ServiceRegion,
    ValidationStatus,
};
use plaza_db::{
    AddressFields, BusinessLocationRow, BusinessStatistics, CapabilityProbe, DbError, NewBusiness,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::GeofenceError;
use crate::repository::RegionRepository;
use crate::store::BusinessStore;
use crate::validator::LocationValidator;

const SQLSTATE_UNIQUE_VIOLATION: &str = "23505";

/// Location columns as read back from the store, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedLocationRow {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    /// The point column in whatever shape the read tier produced.
    pub location: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EnrichedLocationRow {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

impl EnrichedLocationRow {
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::new(self.longitude?, self.latitude?).ok()
    }
}

/// Fill longitude/latitude from the stored point when the scalar columns
/// are missing or unusable. Never fails; unknown stays unknown.
#[must_use]
pub fn attach_normalized_location(row: PersistedLocationRow) -> EnrichedLocationRow {
    let scalar = match (row.longitude, row.latitude) {
        (Some(lon), Some(lat)) => Coordinate::new(lon, lat).ok(),
        _ => None,
    };
    let point = scalar.or_else(|| row.location.as_ref().and_then(normalize));
    EnrichedLocationRow {
        longitude: point.map(|p| p.longitude()),
        latitude: point.map(|p| p.latitude()),
    }
}

/// Turn an invalid validation result into the error a writer rejects with.
///
/// # Errors
///
/// [`GeofenceError::RegionsNotConfigured`] when no region is usable,
/// [`GeofenceError::OutOfCoverage`] otherwise.
pub fn ensure_writable(result: &LocationValidationResult) -> Result<(), GeofenceError> {
    if result.is_valid {
        return Ok(());
    }
    match result.status {
        ValidationStatus::NotConfigured => Err(GeofenceError::RegionsNotConfigured {
            message: result.message.clone(),
        }),
        _ => Err(GeofenceError::OutOfCoverage {
            region_name: result.region.as_ref().map(|r| r.name.clone()),
            message: result.message.clone(),
        }),
    }
}

/// Address data as submitted by a client.
///
/// `street` may carry a trailing street number, which is split off unless
/// `street_number` is given explicitly.
#[derive(Debug, Clone, Default)]
pub struct AddressInput {
    pub street: Option<String>,
    pub street_number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl AddressInput {
    fn into_fields(self) -> AddressFields {
        let (street, street_number) = match self.street_number.filter(|n| !n.trim().is_empty()) {
            Some(number) => (self.street, Some(number)),
            None => {
                let parts = split_street_number(self.street.as_deref());
                (parts.street, parts.street_number)
            }
        };
        AddressFields {
            street,
            street_number,
            neighborhood: self.neighborhood,
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            country: self.country,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateBusiness {
    pub owner_id: Option<Uuid>,
    pub business_group_id: Option<Uuid>,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub logo_url: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub location: Coordinate,
    pub address: Option<AddressInput>,
}

/// A business as surfaced to callers, location normalized.
#[derive(Debug, Clone, Serialize)]
pub struct BusinessView {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub business_group_id: Option<Uuid>,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address_id: Option<Uuid>,
    pub formatted_address: Option<String>,
    pub is_active: bool,
    pub accepts_orders: bool,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BusinessLocationRow> for BusinessView {
    fn from(row: BusinessLocationRow) -> Self {
        let location = attach_normalized_location(PersistedLocationRow {
            longitude: row.longitude,
            latitude: row.latitude,
            location: row.location_text.map(Value::String),
        });
        Self {
            id: row.id,
            owner_id: row.owner_id,
            business_group_id: row.business_group_id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            category: row.category,
            phone: row.phone,
            email: row.email,
            address_id: row.address_id,
            formatted_address: row.formatted_address,
            is_active: row.is_active,
            accepts_orders: row.accepts_orders,
            longitude: location.longitude,
            latitude: location.latitude,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A write that passed validation. `validation` may be degraded.
#[derive(Debug, Clone, Serialize)]
pub struct WriteOutcome {
    pub business: BusinessView,
    pub validation: LocationValidationResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct BusinessSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub address_id: Option<Uuid>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub distance_km: f64,
}

pub struct BusinessLocationService<R, B> {
    validator: LocationValidator<R>,
    store: B,
}

impl<R: RegionRepository, B: BusinessStore> BusinessLocationService<R, B> {
    pub fn new(regions: R, store: B) -> Self {
        Self {
            validator: LocationValidator::new(regions),
            store,
        }
    }

    pub fn validator(&self) -> &LocationValidator<R> {
        &self.validator
    }

    /// Validate `point` ahead of a write. Pass-through to the validator.
    ///
    /// # Errors
    ///
    /// Returns [`GeofenceError::StoreUnavailable`] on a hard store failure.
    pub async fn validate_before_write(
        &self,
        point: Coordinate,
    ) -> Result<LocationValidationResult, GeofenceError> {
        self.validator.validate(point).await
    }

    /// The active default region, `None` when there is none.
    ///
    /// # Errors
    ///
    /// [`GeofenceError::RegionsNotConfigured`] when the region schema is
    /// missing; [`GeofenceError::StoreUnavailable`] on hard failures.
    pub async fn active_region(&self) -> Result<Option<ServiceRegion>, GeofenceError> {
        match self.validator.regions().active_default_region().await {
            CapabilityProbe::Success(region) => Ok(region),
            CapabilityProbe::CapabilityAbsent(_) | CapabilityProbe::NotConfigured => {
                Err(GeofenceError::RegionsNotConfigured {
                    message: plaza_core::regions::REGIONS_NOT_CONFIGURED_MESSAGE.to_string(),
                })
            }
            CapabilityProbe::HardFailure(source) => {
                Err(GeofenceError::store("load the default region", source))
            }
        }
    }

    /// Nearest active, order-accepting business to `reference`.
    ///
    /// Uses store-side geodesic ordering when available, otherwise ranks
    /// candidates in process by haversine distance. Equal distances keep
    /// store order.
    ///
    /// # Errors
    ///
    /// [`GeofenceError::NotFound`] when no business qualifies;
    /// [`GeofenceError::StoreUnavailable`] on store failure.
    pub async fn find_nearest(
        &self,
        reference: Coordinate,
        within_business_id: Option<Uuid>,
    ) -> Result<BusinessSummary, GeofenceError> {
        let nearest = match self
            .store
            .nearest_by_distance(reference, within_business_id)
            .await
        {
            CapabilityProbe::Success(row) => row.map(|row| BusinessSummary {
                id: row.id,
                name: row.name,
                slug: row.slug,
                category: row.category,
                address_id: row.address_id,
                longitude: row.longitude,
                latitude: row.latitude,
                distance_km: row.distance_km,
            }),
            CapabilityProbe::CapabilityAbsent(capability) => {
                tracing::warn!(%capability, "geodesic ordering unavailable; ranking in process");
                self.rank_in_process(reference, within_business_id).await?
            }
            CapabilityProbe::NotConfigured => {
                return Err(GeofenceError::store(
                    "find the nearest business",
                    DbError::SchemaMissing,
                ));
            }
            CapabilityProbe::HardFailure(source) => {
                return Err(GeofenceError::store("find the nearest business", source));
            }
        };

        nearest.ok_or_else(|| GeofenceError::NotFound {
            what: "business accepting orders".to_string(),
        })
    }

    async fn rank_in_process(
        &self,
        reference: Coordinate,
        within_business_id: Option<Uuid>,
    ) -> Result<Option<BusinessSummary>, GeofenceError> {
        let candidates = self
            .store
            .nearest_candidates(within_business_id)
            .await
            .map_err(|source| GeofenceError::store("list nearest candidates", source))?;

        Ok(candidates
            .into_iter()
            .filter_map(|candidate| {
                let point = Coordinate::new(candidate.longitude?, candidate.latitude?).ok()?;
                Some((reference.distance_meters(&point), candidate))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(meters, candidate)| BusinessSummary {
                id: candidate.id,
                name: candidate.name,
                slug: candidate.slug,
                category: candidate.category,
                address_id: candidate.address_id,
                longitude: candidate.longitude,
                latitude: candidate.latitude,
                distance_km: meters / 1000.0,
            }))
    }

    /// Validate, persist and read back a new business.
    ///
    /// # Errors
    ///
    /// Rejects with [`GeofenceError::OutOfCoverage`] or
    /// [`GeofenceError::RegionsNotConfigured`] before touching the store;
    /// [`GeofenceError::Conflict`] on a duplicate slug.
    pub async fn create_business(
        &self,
        input: CreateBusiness,
    ) -> Result<WriteOutcome, GeofenceError> {
        let validation = self.validate_before_write(input.location).await?;
        ensure_writable(&validation)?;

        let address = input.address.map(AddressInput::into_fields);
        let business = NewBusiness {
            owner_id: input.owner_id,
            business_group_id: input.business_group_id,
            name: input.name,
            slug: input.slug,
            description: input.description,
            category: input.category,
            logo_url: input.logo_url,
            phone: input.phone,
            email: input.email,
            location: input.location,
        };

        let id = self
            .store
            .create_business(&business, address.as_ref())
            .await
            .map_err(|err| write_error("create the business", err))?;
        tracing::info!(business_id = %id, status = ?validation.status, "business created");

        let business = self.get_business(id).await?;
        Ok(WriteOutcome {
            business,
            validation,
        })
    }

    /// Validate and move a business to a new address.
    ///
    /// # Errors
    ///
    /// Same rejections as [`Self::create_business`], plus
    /// [`GeofenceError::NotFound`] for an unknown business.
    pub async fn update_address(
        &self,
        business_id: Uuid,
        location: Coordinate,
        address: AddressInput,
    ) -> Result<WriteOutcome, GeofenceError> {
        let validation = self.validate_before_write(location).await?;
        ensure_writable(&validation)?;

        let fields = address.into_fields();
        self.store
            .update_business_address(business_id, &fields, location)
            .await
            .map_err(|err| write_error("update the business address", err))?;
        tracing::info!(%business_id, status = ?validation.status, "business address updated");

        let business = self.get_business(business_id).await?;
        Ok(WriteOutcome {
            business,
            validation,
        })
    }

    /// # Errors
    ///
    /// [`GeofenceError::NotFound`] for an unknown business.
    pub async fn get_business(&self, id: Uuid) -> Result<BusinessView, GeofenceError> {
        self.store
            .load_business(id)
            .await
            .map(BusinessView::from)
            .map_err(|err| write_error("load the business", err))
    }

    /// # Errors
    ///
    /// [`GeofenceError::StoreUnavailable`] on store failure.
    pub async fn statistics(&self) -> Result<BusinessStatistics, GeofenceError> {
        self.store
            .statistics()
            .await
            .map_err(|source| GeofenceError::store("compute business statistics", source))
    }
}

fn write_error(context: &'static str, err: DbError) -> GeofenceError {
    match err {
        DbError::NotFound => GeofenceError::NotFound {
            what: "business".to_string(),
        },
        err if err.sqlstate().as_deref() == Some(SQLSTATE_UNIQUE_VIOLATION) => {
            GeofenceError::Conflict {
                message: "a business with that slug already exists".to_string(),
            }
        }
        source => GeofenceError::store(context, source),
    }
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
