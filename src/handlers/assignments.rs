//! # Assignment Handlers
//!
//! CRUD over assignments with role gates and visibility scoping. Responses
//! keep the historical wire shapes (`{"assignments": [...]}` and friends).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{Role, Session};
use crate::error::ApiError;
use crate::repositories::{
    AssignmentRepository,
    assignment::{AssignmentInput, AssignmentWithTargets},
};
use crate::server::AppState;
use crate::visibility::AssignmentScope;

/// Request body for creating or replacing an assignment.
///
/// `employee_ids` accepts a JSON array of ids (numbers or numeric strings)
/// or a comma-separated string; unparseable entries are dropped.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignmentRequest {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub employee_ids: Option<serde_json::Value>,
    pub team_id: Option<i32>,
}

/// One assignment on the wire
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignmentDto {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub is_general: bool,
    pub team_id: Option<i32>,
    pub employee_ids: Vec<i32>,
    pub created_by_id: i32,
}

impl From<AssignmentWithTargets> for AssignmentDto {
    fn from(row: AssignmentWithTargets) -> Self {
        AssignmentDto {
            id: row.assignment.id,
            title: row.assignment.title,
            description: row.assignment.description,
            due_date: row.assignment.due_date,
            is_general: row.assignment.is_general,
            team_id: row.assignment.team_id,
            employee_ids: row.target_ids,
            created_by_id: row.assignment.created_by_id,
        }
    }
}

/// Response for the assignment listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignmentsResponse {
    pub assignments: Vec<AssignmentDto>,
}

/// Response wrapping a single assignment
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignmentResponse {
    pub assignment: AssignmentDto,
}

/// Response for a successful create
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateAssignmentResponse {
    pub assignment_id: i32,
    pub message: String,
}

/// Message-only response for update/delete
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignmentMessageResponse {
    pub message: String,
}

fn to_input(payload: AssignmentRequest) -> AssignmentInput {
    let scope = AssignmentScope::from_payload(payload.team_id, payload.employee_ids.as_ref());
    AssignmentInput {
        title: payload.title,
        description: payload.description,
        due_date: payload.due_date,
        scope,
    }
}

/// Creates an assignment (org_admin or team_manager)
#[utoipa::path(
    post,
    path = "/api/assignments",
    request_body = AssignmentRequest,
    responses(
        (status = 201, description = "Assignment created", body = CreateAssignmentResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 401, description = "Not authenticated", body = ApiError),
        (status = 403, description = "Role not allowed or foreign team", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "assignments"
)]
pub async fn create_assignment(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AssignmentRequest>,
) -> Result<(StatusCode, Json<CreateAssignmentResponse>), ApiError> {
    session.require_role(&[Role::OrgAdmin, Role::TeamManager])?;

    let created = AssignmentRepository::new(&state.db)
        .create(&session, to_input(payload))
        .await?;

    tracing::info!(
        assignment_id = created.assignment.id,
        is_general = created.assignment.is_general,
        "Assignment created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateAssignmentResponse {
            assignment_id: created.assignment.id,
            message: "Assignment created successfully".to_string(),
        }),
    ))
}

/// Lists assignments visible to the requester
#[utoipa::path(
    get,
    path = "/api/assignments",
    responses(
        (status = 200, description = "Visible assignments", body = AssignmentsResponse),
        (status = 401, description = "Not authenticated", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "assignments"
)]
pub async fn list_assignments(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<AssignmentsResponse>, ApiError> {
    let rows = AssignmentRepository::new(&state.db)
        .list_visible(&session)
        .await?;

    Ok(Json(AssignmentsResponse {
        assignments: rows.into_iter().map(AssignmentDto::from).collect(),
    }))
}

/// Fetches one assignment if the requester may see it
#[utoipa::path(
    get,
    path = "/api/assignments/{id}",
    params(("id" = i32, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "The assignment", body = AssignmentResponse),
        (status = 401, description = "Not authenticated", body = ApiError),
        (status = 403, description = "Outside the assignment's audience", body = ApiError),
        (status = 404, description = "No such assignment", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "assignments"
)]
pub async fn get_assignment(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let row = AssignmentRepository::new(&state.db)
        .get_visible(&session, id)
        .await?;

    Ok(Json(AssignmentResponse {
        assignment: AssignmentDto::from(row),
    }))
}

/// Replaces an assignment's fields and target set (org_admin or team_manager)
#[utoipa::path(
    put,
    path = "/api/assignments/{id}",
    params(("id" = i32, Path, description = "Assignment id")),
    request_body = AssignmentRequest,
    responses(
        (status = 200, description = "Assignment updated", body = AssignmentMessageResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 401, description = "Not authenticated", body = ApiError),
        (status = 403, description = "Role not allowed or foreign team", body = ApiError),
        (status = 404, description = "No such assignment", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "assignments"
)]
pub async fn update_assignment(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<AssignmentRequest>,
) -> Result<Json<AssignmentMessageResponse>, ApiError> {
    session.require_role(&[Role::OrgAdmin, Role::TeamManager])?;

    AssignmentRepository::new(&state.db)
        .update(&session, id, to_input(payload))
        .await?;

    tracing::info!(assignment_id = id, "Assignment updated");

    Ok(Json(AssignmentMessageResponse {
        message: "Assignment updated successfully".to_string(),
    }))
}

/// Deletes an assignment and its submissions and targets
#[utoipa::path(
    delete,
    path = "/api/assignments/{id}",
    params(("id" = i32, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Assignment deleted", body = AssignmentMessageResponse),
        (status = 401, description = "Not authenticated", body = ApiError),
        (status = 403, description = "Role not allowed", body = ApiError),
        (status = 404, description = "No such assignment", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "assignments"
)]
pub async fn delete_assignment(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<AssignmentMessageResponse>, ApiError> {
    session.require_role(&[Role::OrgAdmin, Role::TeamManager])?;

    AssignmentRepository::new(&state.db).delete(id).await?;

    tracing::info!(assignment_id = id, "Assignment deleted");

    Ok(Json(AssignmentMessageResponse {
        message: "Assignment deleted successfully".to_string(),
    }))
}
