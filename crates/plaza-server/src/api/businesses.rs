//! Business handlers: geofenced writes, reads, nearest lookup and statistics.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use plaza_core::{normalize, Coordinate, LocationValidationResult};
use plaza_geofence::{AddressInput, BusinessSummary, BusinessView, CreateBusiness, WriteOutcome};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_geofence_error, parse_coordinate, ApiError, ApiResponse, AppState, ResponseMeta};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub(super) struct AddressRequest {
    pub street: Option<String>,
    pub street_number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl From<AddressRequest> for AddressInput {
    fn from(req: AddressRequest) -> Self {
        Self {
            street: req.street,
            street_number: req.street_number,
            neighborhood: req.neighborhood,
            city: req.city,
            state: req.state,
            postal_code: req.postal_code,
            country: req.country,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateBusinessRequest {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub logo_url: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub owner_id: Option<Uuid>,
    pub business_group_id: Option<Uuid>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    /// Any point shape the normalizer accepts, used when the scalar pair
    /// is absent.
    pub location: Option<Value>,
    pub address: Option<AddressRequest>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateAddressRequest {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub location: Option<Value>,
    #[serde(flatten)]
    pub address: AddressRequest,
}

#[derive(Debug, Deserialize)]
pub(super) struct NearestQuery {
    pub longitude: Option<String>,
    pub latitude: Option<String>,
    pub business_id: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct BusinessWriteResponse {
    #[serde(flatten)]
    pub business: BusinessView,
    pub location_validation: LocationValidationResult,
}

impl From<WriteOutcome> for BusinessWriteResponse {
    fn from(outcome: WriteOutcome) -> Self {
        Self {
            business: outcome.business,
            location_validation: outcome.validation,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct CategoryCount {
    pub category: Option<String>,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct BusinessStatisticsResponse {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub with_location: i64,
    pub by_category: Vec<CategoryCount>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The scalar pair wins when both halves are present; otherwise the raw
/// `location` value goes through the normalizer.
fn resolve_location(
    req_id: &str,
    longitude: Option<f64>,
    latitude: Option<f64>,
    location: Option<&Value>,
) -> Result<Coordinate, ApiError> {
    match (longitude, latitude, location) {
        (Some(lon), Some(lat), _) => Coordinate::new(lon, lat)
            .map_err(|e| ApiError::new(req_id, "validation_error", e.to_string())),
        (_, _, Some(raw)) => normalize(raw).ok_or_else(|| {
            ApiError::new(
                req_id,
                "validation_error",
                "location is not a recognizable point",
            )
        }),
        _ => Err(ApiError::new(
            req_id,
            "validation_error",
            "longitude and latitude (or location) are required",
        )),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/businesses
pub(super) async fn create_business(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateBusinessRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BusinessWriteResponse>>), ApiError> {
    let rid = &req_id.0;

    let name = body.name.trim().to_owned();
    if name.is_empty() || name.chars().count() > 200 {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "name must be 1-200 characters",
        ));
    }
    let location = resolve_location(rid, body.longitude, body.latitude, body.location.as_ref())?;

    let outcome = state
        .locations
        .create_business(CreateBusiness {
            owner_id: body.owner_id,
            business_group_id: body.business_group_id,
            name,
            slug: non_blank(body.slug),
            description: body.description,
            category: non_blank(body.category),
            logo_url: body.logo_url,
            phone: body.phone,
            email: body.email,
            location,
            address: body.address.map(AddressInput::from),
        })
        .await
        .map_err(|e| map_geofence_error(rid.clone(), e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: outcome.into(),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// PATCH /api/v1/businesses/{id}/address
pub(super) async fn update_business_address(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateAddressRequest>,
) -> Result<Json<ApiResponse<BusinessWriteResponse>>, ApiError> {
    let rid = &req_id.0;
    let location = resolve_location(rid, body.longitude, body.latitude, body.location.as_ref())?;

    let outcome = state
        .locations
        .update_address(id, location, body.address.into())
        .await
        .map_err(|e| map_geofence_error(rid.clone(), e))?;

    Ok(Json(ApiResponse {
        data: outcome.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/businesses/{id}
pub(super) async fn get_business(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BusinessView>>, ApiError> {
    let business = state
        .locations
        .get_business(id)
        .await
        .map_err(|e| map_geofence_error(req_id.0.clone(), e))?;

    Ok(Json(ApiResponse {
        data: business,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/businesses/nearest
pub(super) async fn nearest_business(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<NearestQuery>,
) -> Result<Json<ApiResponse<BusinessSummary>>, ApiError> {
    let reference = parse_coordinate(
        &req_id.0,
        query.longitude.as_deref(),
        query.latitude.as_deref(),
    )?;

    let nearest = state
        .locations
        .find_nearest(reference, query.business_id)
        .await
        .map_err(|e| map_geofence_error(req_id.0.clone(), e))?;

    Ok(Json(ApiResponse {
        data: nearest,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/businesses/statistics
pub(super) async fn business_statistics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<BusinessStatisticsResponse>>, ApiError> {
    let stats = state
        .locations
        .statistics()
        .await
        .map_err(|e| map_geofence_error(req_id.0.clone(), e))?;

    let data = BusinessStatisticsResponse {
        total: stats.total,
        active: stats.active,
        inactive: stats.inactive,
        with_location: stats.with_location,
        by_category: stats
            .by_category
            .into_iter()
            .map(|row| CategoryCount {
                category: row.category,
                count: row.count,
            })
            .collect(),
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
