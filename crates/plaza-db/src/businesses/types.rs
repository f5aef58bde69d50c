//! Row and input types for businesses and addresses.

use chrono::{DateTime, Utc};
use plaza_core::Coordinate;
use uuid::Uuid;

/// Address columns supplied by a create or update request.
///
/// `None` fields are left untouched on update and stored as NULL on insert.
#[derive(Debug, Clone, Default)]
pub struct AddressFields {
    pub street: Option<String>,
    pub street_number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl AddressFields {
    /// Whether any column carries a value worth an address row.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [
            &self.street,
            &self.street_number,
            &self.neighborhood,
            &self.city,
            &self.state,
            &self.postal_code,
        ]
        .iter()
        .all(|field| field.as_deref().is_none_or(|v| v.trim().is_empty()))
    }
}

/// Input record for inserting a business together with its location.
#[derive(Debug, Clone)]
pub struct NewBusiness {
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
}

/// A business joined with its address, location columns split.
///
/// Depending on which read tier produced the row, the point arrives either
/// as `longitude`/`latitude` or as `location_text`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BusinessLocationRow {
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
    pub is_active: bool,
    pub accepts_orders: bool,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub location_text: Option<String>,
    pub formatted_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of the store-side geodesic nearest query.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NearestBusinessRow {
    pub id: Uuid,
    pub name: String,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub address_id: Option<Uuid>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub distance_km: f64,
}

/// A business eligible for nearest ranking, unranked.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BusinessCandidateRow {
    pub id: Uuid,
    pub name: String,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub address_id: Option<Uuid>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryCountRow {
    pub category: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, Default)]
pub struct BusinessStatistics {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub with_location: i64,
    pub by_category: Vec<CategoryCountRow>,
}
