//! Read operations for businesses.

use plaza_core::Coordinate;
use sqlx::PgPool;
use uuid::Uuid;

use super::types::{
    BusinessCandidateRow, BusinessLocationRow, BusinessStatistics, CategoryCountRow,
    NearestBusinessRow,
};
use crate::DbError;

const BUSINESS_COLUMNS: &str = "b.id, b.owner_id, b.business_group_id, b.name, b.slug, \
     b.description, b.category, b.phone, b.email, b.address_id, \
     b.is_active, b.accepts_orders, b.created_at, b.updated_at";

const FORMATTED_ADDRESS: &str = "NULLIF(CONCAT_WS(', ', \
         NULLIF(CONCAT_WS(' ', a.street, a.street_number), ''), \
         a.neighborhood, a.city, a.state, a.postal_code, a.country), '') \
     AS formatted_address";

/// Fetch a business with its coordinates split natively from the point column.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no business has `id`, or [`DbError`] if
/// the query fails. SQLSTATE `42804`/`42883` signal that the point column
/// cannot be subscripted; retry with [`get_business_location_as_text`].
pub async fn get_business_location(
    pool: &PgPool,
    id: Uuid,
) -> Result<BusinessLocationRow, DbError> {
    let sql = format!(
        "SELECT {BUSINESS_COLUMNS}, \
                (b.location)[0]::DOUBLE PRECISION AS longitude, \
                (b.location)[1]::DOUBLE PRECISION AS latitude, \
                NULL::TEXT AS location_text, \
                {FORMATTED_ADDRESS} \
         FROM core.businesses b \
         LEFT JOIN core.addresses a ON a.id = b.address_id \
         WHERE b.id = $1"
    );
    sqlx::query_as::<_, BusinessLocationRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Fetch a business with the point column rendered as text.
///
/// The caller normalizes `location_text` in process.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no business has `id`, or [`DbError`] if
/// the query fails.
pub async fn get_business_location_as_text(
    pool: &PgPool,
    id: Uuid,
) -> Result<BusinessLocationRow, DbError> {
    let sql = format!(
        "SELECT {BUSINESS_COLUMNS}, \
                NULL::DOUBLE PRECISION AS longitude, \
                NULL::DOUBLE PRECISION AS latitude, \
                b.location::TEXT AS location_text, \
                {FORMATTED_ADDRESS} \
         FROM core.businesses b \
         LEFT JOIN core.addresses a ON a.id = b.address_id \
         WHERE b.id = $1"
    );
    sqlx::query_as::<_, BusinessLocationRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Nearest active, order-accepting business to `reference`, ranked by
/// geodesic distance on the geography type.
///
/// When `within` is set, only that business is considered.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails; `42883` means the spatial
/// functions are not installed.
pub async fn find_nearest_business(
    pool: &PgPool,
    reference: Coordinate,
    within: Option<Uuid>,
) -> Result<Option<NearestBusinessRow>, DbError> {
    let row = sqlx::query_as::<_, NearestBusinessRow>(
        "SELECT b.id, b.name, b.slug, b.category, b.address_id, \
                (b.location)[0]::DOUBLE PRECISION AS longitude, \
                (b.location)[1]::DOUBLE PRECISION AS latitude, \
                ST_Distance( \
                    ST_SetSRID(ST_MakePoint((b.location)[0], (b.location)[1]), 4326)::geography, \
                    ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography \
                ) / 1000.0 AS distance_km \
         FROM core.businesses b \
         WHERE b.is_active = TRUE \
           AND b.accepts_orders = TRUE \
           AND b.location IS NOT NULL \
           AND ($3::UUID IS NULL OR b.id = $3) \
         ORDER BY distance_km ASC \
         LIMIT 1",
    )
    .bind(reference.longitude())
    .bind(reference.latitude())
    .bind(within)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// All businesses eligible for nearest ranking, in store order.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn list_nearest_candidates(
    pool: &PgPool,
    within: Option<Uuid>,
) -> Result<Vec<BusinessCandidateRow>, DbError> {
    let rows = sqlx::query_as::<_, BusinessCandidateRow>(
        "SELECT b.id, b.name, b.slug, b.category, b.address_id, \
                (b.location)[0]::DOUBLE PRECISION AS longitude, \
                (b.location)[1]::DOUBLE PRECISION AS latitude \
         FROM core.businesses b \
         WHERE b.is_active = TRUE \
           AND b.accepts_orders = TRUE \
           AND b.location IS NOT NULL \
           AND ($1::UUID IS NULL OR b.id = $1) \
         ORDER BY b.created_at ASC, b.id ASC",
    )
    .bind(within)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Totals across all businesses plus per-category counts.
///
/// Categories are ordered by count, largest first; NULL categories are
/// grouped together.
///
/// # Errors
///
/// Returns [`DbError`] if either query fails.
pub async fn get_business_statistics(pool: &PgPool) -> Result<BusinessStatistics, DbError> {
    let (total, active, inactive, with_location) =
        sqlx::query_as::<_, (i64, i64, i64, i64)>(
            "SELECT COUNT(*), \
                    COUNT(*) FILTER (WHERE is_active = TRUE), \
                    COUNT(*) FILTER (WHERE is_active = FALSE), \
                    COUNT(*) FILTER (WHERE location IS NOT NULL) \
             FROM core.businesses",
        )
        .fetch_one(pool)
        .await?;

    let by_category = sqlx::query_as::<_, CategoryCountRow>(
        "SELECT category, COUNT(*) AS count \
         FROM core.businesses \
         GROUP BY category \
         ORDER BY count DESC, category ASC NULLS LAST",
    )
    .fetch_all(pool)
    .await?;

    Ok(BusinessStatistics {
        total,
        active,
        inactive,
        with_location,
        by_category,
    })
}
