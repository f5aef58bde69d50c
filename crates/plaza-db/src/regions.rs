//! Read operations for `core.service_regions` and the region SQL functions.
//!
//! Each function here is a single tier. Falling through between tiers is
//! the caller's job, driven by [`crate::classify`].

use plaza_core::{Coordinate, ServiceRegion};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A region row as returned by the region functions or the direct query.
///
/// Every column is nullable because `core.get_location_region` answers
/// "no owning region" with a row of NULLs.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct ServiceRegionRow {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub center_longitude: Option<f64>,
    pub center_latitude: Option<f64>,
    pub max_delivery_radius_meters: Option<i32>,
    pub min_order_amount: Option<Decimal>,
    pub is_active: Option<bool>,
    pub is_default: Option<bool>,
    pub coverage_area_geojson: Option<String>,
}

impl ServiceRegionRow {
    /// Convert to a domain region. Rows without an id or name yield `None`.
    #[must_use]
    pub fn into_region(self) -> Option<ServiceRegion> {
        let id = self.id?;
        let name = self.name?;
        let center = match (self.center_longitude, self.center_latitude) {
            (Some(lon), Some(lat)) => Coordinate::new(lon, lat).ok(),
            _ => None,
        };
        Some(ServiceRegion {
            id,
            name,
            description: self.description,
            city: self.city,
            state: self.state,
            country: self.country,
            center,
            max_delivery_radius_meters: self.max_delivery_radius_meters.unwrap_or(0),
            min_order_amount: self.min_order_amount.unwrap_or(Decimal::ZERO),
            is_active: self.is_active.unwrap_or(true),
            is_default: self.is_default.unwrap_or(false),
            coverage_area_geojson: self.coverage_area_geojson,
        })
    }
}

/// The single row produced by `core.get_location_region(lon, lat)`.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct LocationRegionRow {
    #[sqlx(flatten)]
    pub region: ServiceRegionRow,
    pub is_valid: Option<bool>,
}

const DIRECT_REGION_COLUMNS: &str = "sr.id, sr.name, sr.description, sr.city, sr.state, \
     sr.country, \
     (sr.center_point)[0]::DOUBLE PRECISION AS center_longitude, \
     (sr.center_point)[1]::DOUBLE PRECISION AS center_latitude, \
     sr.max_delivery_radius_meters, sr.min_order_amount, sr.is_active, sr.is_default";

/// Ask the store which active region owns `point`.
///
/// Overlaps resolve in whatever order the store function returns.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails; SQLSTATE `42883` means the
/// function is not installed.
pub async fn resolve_location_region(
    pool: &PgPool,
    point: Coordinate,
) -> Result<Option<LocationRegionRow>, DbError> {
    let row = sqlx::query_as::<_, LocationRegionRow>(
        "SELECT id, name, description, city, state, country, \
                center_longitude, center_latitude, max_delivery_radius_meters, \
                min_order_amount, is_active, is_default, coverage_area_geojson, is_valid \
         FROM core.get_location_region($1, $2)",
    )
    .bind(point.longitude())
    .bind(point.latitude())
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch the active default region through `core.get_active_region()`.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_active_region_fn(pool: &PgPool) -> Result<Option<ServiceRegionRow>, DbError> {
    let row = sqlx::query_as::<_, ServiceRegionRow>(
        "SELECT id, name, description, city, state, country, \
                center_longitude, center_latitude, max_delivery_radius_meters, \
                min_order_amount, is_active, is_default, coverage_area_geojson \
         FROM core.get_active_region()",
    )
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch the active default region straight from the table, with the
/// polygon rendered as GeoJSON.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails; `42883` here means `ST_AsGeoJSON`
/// is unavailable.
pub async fn get_active_region_direct(pool: &PgPool) -> Result<Option<ServiceRegionRow>, DbError> {
    let sql = format!(
        "SELECT {DIRECT_REGION_COLUMNS}, \
                ST_AsGeoJSON(sr.coverage_area)::TEXT AS coverage_area_geojson \
         FROM core.service_regions sr \
         WHERE sr.is_default = TRUE AND sr.is_active = TRUE \
         ORDER BY sr.created_at ASC \
         LIMIT 1"
    );
    let row = sqlx::query_as::<_, ServiceRegionRow>(&sql)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Same as [`get_active_region_direct`] but without touching any spatial
/// function. Works on a plain Postgres install.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_active_region_direct_without_geojson(
    pool: &PgPool,
) -> Result<Option<ServiceRegionRow>, DbError> {
    let sql = format!(
        "SELECT {DIRECT_REGION_COLUMNS}, NULL::TEXT AS coverage_area_geojson \
         FROM core.service_regions sr \
         WHERE sr.is_default = TRUE AND sr.is_active = TRUE \
         ORDER BY sr.created_at ASC \
         LIMIT 1"
    );
    let row = sqlx::query_as::<_, ServiceRegionRow>(&sql)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Test `point` against `region_id` via `core.is_location_in_region`.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn location_in_region_fn(
    pool: &PgPool,
    point: Coordinate,
    region_id: Uuid,
) -> Result<bool, DbError> {
    let inside = sqlx::query_scalar::<_, Option<bool>>(
        "SELECT core.is_location_in_region($1, $2, $3)",
    )
    .bind(point.longitude())
    .bind(point.latitude())
    .bind(region_id)
    .fetch_one(pool)
    .await?;
    Ok(inside.unwrap_or(false))
}

/// Raw polygon test of `point` against the coverage area of `region_id`.
///
/// A missing region or a region without a polygon is "not inside".
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn location_in_region(
    pool: &PgPool,
    point: Coordinate,
    region_id: Uuid,
) -> Result<bool, DbError> {
    let inside = sqlx::query_scalar::<_, Option<bool>>(
        "SELECT ST_Covers(sr.coverage_area, ST_SetSRID(ST_MakePoint($1, $2), 4326)) \
         FROM core.service_regions sr \
         WHERE sr.id = $3",
    )
    .bind(point.longitude())
    .bind(point.latitude())
    .bind(region_id)
    .fetch_optional(pool)
    .await?;
    Ok(inside.flatten().unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row() -> ServiceRegionRow {
        ServiceRegionRow {
            id: Some(Uuid::nil()),
            name: Some("La Roma".to_string()),
            description: None,
            city: Some("Ciudad de México".to_string()),
            state: None,
            country: Some("México".to_string()),
            center_longitude: Some(-99.16),
            center_latitude: Some(19.422),
            max_delivery_radius_meters: Some(500),
            min_order_amount: Some(Decimal::new(9_900, 2)),
            is_active: Some(true),
            is_default: Some(true),
            coverage_area_geojson: None,
        }
    }

    #[test]
    fn into_region_maps_columns() {
        let region = full_row().into_region().expect("region");
        assert_eq!(region.name, "La Roma");
        assert_eq!(region.max_delivery_radius_meters, 500);
        let center = region.center.expect("center");
        assert!((center.longitude() + 99.16).abs() < 1e-12);
        assert!(region.is_default);
    }

    #[test]
    fn into_region_requires_id() {
        let row = ServiceRegionRow {
            id: None,
            ..full_row()
        };
        assert!(row.into_region().is_none());
    }

    #[test]
    fn null_row_is_no_region() {
        assert!(ServiceRegionRow::default().into_region().is_none());
    }

    #[test]
    fn invalid_center_is_dropped() {
        let row = ServiceRegionRow {
            center_latitude: Some(123.0),
            ..full_row()
        };
        let region = row.into_region().expect("region");
        assert!(region.center.is_none());
    }
}
