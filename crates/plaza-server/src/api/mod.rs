mod businesses;
mod regions;

use std::{sync::Arc, time::Duration};

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use plaza_core::Coordinate;
use plaza_geofence::{GeofenceError, PgBusinessLocationService};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub locations: Arc<PgBusinessLocationService>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                region_name: None,
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    fn with_region(mut self, region_name: Option<String>) -> Self {
        self.error.region_name = region_name;
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" | "out_of_coverage" | "regions_not_configured" => {
                StatusCode::BAD_REQUEST
            }
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_geofence_error(request_id: String, error: GeofenceError) -> ApiError {
    match error {
        GeofenceError::OutOfCoverage {
            region_name,
            message,
        } => ApiError::new(request_id, "out_of_coverage", message).with_region(region_name),
        GeofenceError::RegionsNotConfigured { message } => {
            ApiError::new(request_id, "regions_not_configured", message)
        }
        GeofenceError::NotFound { what } => {
            ApiError::new(request_id, "not_found", format!("{what} not found"))
        }
        GeofenceError::Conflict { message } => ApiError::new(request_id, "conflict", message),
        GeofenceError::StoreUnavailable { context, source } => {
            tracing::error!(context, error = %source, "location store unavailable");
            // the SQL error text stays in the log
            ApiError::new(
                request_id,
                "service_unavailable",
                format!("store unavailable while trying to {context}"),
            )
        }
    }
}

/// Parse raw query values into a [`Coordinate`].
///
/// Both components must be present, numeric and in range.
pub(super) fn parse_coordinate(
    request_id: &str,
    longitude: Option<&str>,
    latitude: Option<&str>,
) -> Result<Coordinate, ApiError> {
    let (Some(longitude), Some(latitude)) = (longitude, latitude) else {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            "longitude and latitude are required",
        ));
    };

    let parse = |name: &str, raw: &str| {
        raw.trim().parse::<f64>().map_err(|_| {
            ApiError::new(
                request_id,
                "validation_error",
                format!("{name} must be a number"),
            )
        })
    };
    let longitude = parse("longitude", longitude)?;
    let latitude = parse("latitude", latitude)?;

    Coordinate::new(longitude, latitude)
        .map_err(|e| ApiError::new(request_id, "validation_error", e.to_string()))
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/businesses", post(businesses::create_business))
        .route(
            "/api/v1/businesses/statistics",
            get(businesses::business_statistics),
        )
        .route("/api/v1/businesses/{id}", get(businesses::get_business))
        .route(
            "/api/v1/businesses/{id}/address",
            patch(businesses::update_business_address),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/regions/active", get(regions::active_region))
        .route("/api/v1/locations/validate", get(regions::validate_location))
        .route(
            "/api/v1/businesses/nearest",
            get(businesses::nearest_business),
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match plaza_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
