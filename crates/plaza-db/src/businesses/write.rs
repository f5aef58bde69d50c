//! Write operations for businesses and their addresses.
//!
//! Callers validate the location against the coverage regions before
//! calling anything here.

use plaza_core::Coordinate;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::types::{AddressFields, NewBusiness};
use crate::DbError;

const BRANCH_ADDRESS_LABEL: &str = "Local";

/// Insert a business, and its address row when `address` carries any value.
///
/// Returns the new business id. Runs in one transaction.
///
/// # Errors
///
/// Returns [`DbError`] on query failure (a `23505` on `slug` included).
pub async fn create_business(
    pool: &PgPool,
    business: &NewBusiness,
    address: Option<&AddressFields>,
    default_country: &str,
) -> Result<Uuid, DbError> {
    let mut tx = pool.begin().await?;

    let address_id = match address.filter(|a| !a.is_empty()) {
        Some(fields) => Some(
            insert_address(
                &mut tx,
                business.owner_id,
                fields,
                business.location,
                default_country,
            )
            .await?,
        ),
        None => None,
    };

    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO core.businesses \
             (owner_id, business_group_id, name, slug, description, category, \
              logo_url, phone, email, address_id, location, is_active, accepts_orders) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, point($11, $12), TRUE, TRUE) \
         RETURNING id",
    )
    .bind(business.owner_id)
    .bind(business.business_group_id)
    .bind(&business.name)
    .bind(business.slug.as_deref())
    .bind(business.description.as_deref())
    .bind(business.category.as_deref())
    .bind(business.logo_url.as_deref())
    .bind(business.phone.as_deref())
    .bind(business.email.as_deref())
    .bind(address_id)
    .bind(business.location.longitude())
    .bind(business.location.latitude())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(id)
}

/// Point a business at a new address and location.
///
/// Updates the business's existing address row in place, or creates one
/// when it has none. Returns the address id now attached to the business.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no business has `business_id`, or
/// [`DbError`] on query failure.
pub async fn update_business_address(
    pool: &PgPool,
    business_id: Uuid,
    fields: &AddressFields,
    location: Coordinate,
    default_country: &str,
) -> Result<Uuid, DbError> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, (Option<Uuid>, Option<Uuid>)>(
        "SELECT address_id, owner_id FROM core.businesses WHERE id = $1 FOR UPDATE",
    )
    .bind(business_id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some((existing_address, owner_id)) = current else {
        return Err(DbError::NotFound);
    };

    let address_id = match existing_address {
        Some(address_id) => {
            sqlx::query(
                "UPDATE core.addresses SET \
                     street        = COALESCE($2, street), \
                     street_number = COALESCE($3, street_number), \
                     neighborhood  = COALESCE($4, neighborhood), \
                     city          = COALESCE($5, city), \
                     state         = COALESCE($6, state), \
                     postal_code   = COALESCE($7, postal_code), \
                     country       = COALESCE($8, country), \
                     location      = point($9, $10), \
                     updated_at    = NOW() \
                 WHERE id = $1",
            )
            .bind(address_id)
            .bind(fields.street.as_deref())
            .bind(fields.street_number.as_deref())
            .bind(fields.neighborhood.as_deref())
            .bind(fields.city.as_deref())
            .bind(fields.state.as_deref())
            .bind(fields.postal_code.as_deref())
            .bind(fields.country.as_deref())
            .bind(location.longitude())
            .bind(location.latitude())
            .execute(&mut *tx)
            .await?;
            address_id
        }
        None => insert_address(&mut tx, owner_id, fields, location, default_country).await?,
    };

    sqlx::query(
        "UPDATE core.businesses SET \
             address_id = $2, \
             location   = point($3, $4), \
             updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(business_id)
    .bind(address_id)
    .bind(location.longitude())
    .bind(location.latitude())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(address_id)
}

async fn insert_address(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Option<Uuid>,
    fields: &AddressFields,
    location: Coordinate,
    default_country: &str,
) -> Result<Uuid, DbError> {
    let country = fields.country.as_deref().unwrap_or(default_country);
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO core.addresses \
             (user_id, label, street, street_number, neighborhood, city, state, \
              postal_code, country, location, is_default, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, point($10, $11), FALSE, TRUE) \
         RETURNING id",
    )
    .bind(user_id)
    .bind(BRANCH_ADDRESS_LABEL)
    .bind(fields.street.as_deref())
    .bind(fields.street_number.as_deref())
    .bind(fields.neighborhood.as_deref())
    .bind(fields.city.as_deref())
    .bind(fields.state.as_deref())
    .bind(fields.postal_code.as_deref())
    .bind(country)
    .bind(location.longitude())
    .bind(location.latitude())
    .fetch_one(&mut **tx)
    .await?;
    Ok(id)
}
