//! # Team Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Session;
use crate::error::ApiError;
use crate::repositories::TeamRepository;
use crate::server::AppState;

/// Request body for team creation
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTeamRequest {
    pub name: String,
    pub organization_id: i32,
    pub manager_id: Option<i32>,
}

/// Response containing the new team id
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTeamResponse {
    pub team_id: i32,
}

/// Request body for adding a team member
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddTeamMemberRequest {
    pub user_id: i32,
}

/// Message-only response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Creates a team (admin only)
#[utoipa::path(
    post,
    path = "/api/teams",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = CreateTeamResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 401, description = "Not authenticated", body = ApiError),
        (status = 403, description = "Admin privileges required", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "teams"
)]
pub async fn create_team(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<CreateTeamResponse>), ApiError> {
    session.require_admin()?;

    let team = TeamRepository::new(&state.db)
        .create(&payload.name, payload.organization_id, payload.manager_id)
        .await?;

    tracing::info!(team_id = team.id, organization_id = team.organization_id, "Team created");

    Ok((StatusCode::CREATED, Json(CreateTeamResponse { team_id: team.id })))
}

/// Adds a user to a team (admin only)
#[utoipa::path(
    post,
    path = "/api/teams/{id}/members",
    params(("id" = i32, Path, description = "Team id")),
    request_body = AddTeamMemberRequest,
    responses(
        (status = 201, description = "Member added", body = MessageResponse),
        (status = 400, description = "Already a member", body = ApiError),
        (status = 401, description = "Not authenticated", body = ApiError),
        (status = 403, description = "Admin privileges required", body = ApiError),
        (status = 404, description = "Team not found", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "teams"
)]
pub async fn add_team_member(
    State(state): State<AppState>,
    session: Session,
    Path(team_id): Path<i32>,
    Json(payload): Json<AddTeamMemberRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    session.require_admin()?;

    TeamRepository::new(&state.db)
        .add_member(team_id, payload.user_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Member added to team".to_string(),
        }),
    ))
}
