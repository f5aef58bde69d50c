use axum::{
    extract::{Query, State},
    Extension, Json,
};
use plaza_core::{regions::NO_ACTIVE_REGION_MESSAGE, LocationValidationResult, ServiceRegion};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_geofence_error, parse_coordinate, ApiError, ApiResponse, AppState, ResponseMeta};

/// Raw coordinate query. Kept as strings so malformed numbers get our own
/// `validation_error` rather than the extractor's rejection.
#[derive(Debug, Deserialize)]
pub(super) struct CoordinateQuery {
    pub longitude: Option<String>,
    pub latitude: Option<String>,
}

pub(super) async fn active_region(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ServiceRegion>>, ApiError> {
    let region = state
        .locations
        .active_region()
        .await
        .map_err(|e| map_geofence_error(req_id.0.clone(), e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", NO_ACTIVE_REGION_MESSAGE))?;

    Ok(Json(ApiResponse {
        data: region,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Reports the validation outcome as data; an uncovered point is a
/// successful answer, not an error.
pub(super) async fn validate_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CoordinateQuery>,
) -> Result<Json<ApiResponse<LocationValidationResult>>, ApiError> {
    let point = parse_coordinate(
        &req_id.0,
        query.longitude.as_deref(),
        query.latitude.as_deref(),
    )?;

    let result = state
        .locations
        .validate_before_write(point)
        .await
        .map_err(|e| map_geofence_error(req_id.0.clone(), e))?;

    Ok(Json(ApiResponse {
        data: result,
        meta: ResponseMeta::new(req_id.0),
    }))
}
