//! # Organization Handlers

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Session;
use crate::error::ApiError;
use crate::repositories::OrganizationRepository;
use crate::server::AppState;

/// Request body for organization creation
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrganizationRequest {
    pub name: String,
}

/// Response containing the new organization id
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrganizationResponse {
    pub organization_id: i32,
}

/// Creates an organization (admin only)
#[utoipa::path(
    post,
    path = "/api/organizations",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization created", body = CreateOrganizationResponse),
        (status = 400, description = "Validation error or duplicate name", body = ApiError),
        (status = 401, description = "Not authenticated", body = ApiError),
        (status = 403, description = "Admin privileges required", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "organizations"
)]
pub async fn create_organization(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<CreateOrganizationResponse>), ApiError> {
    session.require_admin()?;

    let org = OrganizationRepository::new(&state.db)
        .create(&payload.name)
        .await?;

    tracing::info!(organization_id = org.id, "Organization created");

    Ok((
        StatusCode::CREATED,
        Json(CreateOrganizationResponse {
            organization_id: org.id,
        }),
    ))
}
