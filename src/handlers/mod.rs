//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the Staffboard API.

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorType};
use crate::models::ServiceInfo;
use crate::server::AppState;

pub mod assignments;
pub mod auth;
pub mod employees;
pub mod organizations;
pub mod submissions;
pub mod teams;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Liveness endpoint that also verifies database connectivity
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unavailable", body = ApiError)
    ),
    tag = "root"
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    crate::db::health_check(&state.db).await.map_err(|e| {
        tracing::error!(error = %e, "Health check failed");
        ApiError::from(ErrorType::ServiceUnavailable)
    })?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}
