//! Geofenced location validation for the marketplace.
//!
//! [`LocationValidator`] walks the capability ladder exposed by a
//! [`RegionRepository`]; [`BusinessLocationService`] gates business writes
//! on it and serves the location-aware reads.

mod bounded;
#[cfg(test)]
mod testing;
pub mod error;
pub mod repository;
pub mod service;
pub mod store;
pub mod validator;

pub use error::GeofenceError;
pub use repository::{PgRegionRepository, RegionRepository};
pub use service::{
    attach_normalized_location, ensure_writable, AddressInput, BusinessLocationService,
    BusinessSummary, BusinessView, CreateBusiness, EnrichedLocationRow, PersistedLocationRow,
    WriteOutcome,
};
pub use store::{BusinessStore, PgBusinessStore};
pub use validator::LocationValidator;

/// The production wiring: both ports backed by Postgres.
pub type PgBusinessLocationService = BusinessLocationService<PgRegionRepository, PgBusinessStore>;

impl PgBusinessLocationService {
    /// Build the Postgres-backed service from a pool and the app config.
    #[must_use]
    pub fn from_pool(pool: sqlx::PgPool, config: &plaza_core::AppConfig) -> Self {
        let timeout = config.store_timeout();
        BusinessLocationService::new(
            PgRegionRepository::new(pool.clone(), timeout),
            PgBusinessStore::new(pool, timeout, config.default_country.clone()),
        )
    }
}
