//! # Submission Handlers
//!
//! Multipart file submission against an assignment, and the manager-facing
//! submission listing.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{Role, Session};
use crate::error::{ApiError, ErrorType, validation_error};
use crate::models::submission;
use crate::repositories::{AssignmentRepository, SubmissionRepository};
use crate::server::AppState;
use crate::uploads::save_submission;

/// One submission record on the wire
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmissionDto {
    pub id: i32,
    pub assignment_id: i32,
    pub employee_id: i32,
    pub file_path: String,
    pub submitted_at: String,
}

impl From<submission::Model> for SubmissionDto {
    fn from(row: submission::Model) -> Self {
        SubmissionDto {
            id: row.id,
            assignment_id: row.assignment_id,
            employee_id: row.employee_id,
            file_path: row.file_path,
            submitted_at: row.submitted_at.to_rfc3339(),
        }
    }
}

/// Response for a recorded submission
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitResponse {
    pub submission_id: i32,
    pub message: String,
}

/// Response for the submission listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmissionsResponse {
    pub submissions: Vec<SubmissionDto>,
}

/// Submits a file against an assignment the requester can see
#[utoipa::path(
    post,
    path = "/api/assignments/{id}/submit",
    params(("id" = i32, Path, description = "Assignment id")),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Submission recorded", body = SubmitResponse),
        (status = 400, description = "Missing file or empty filename", body = ApiError),
        (status = 401, description = "Not authenticated", body = ApiError),
        (status = 403, description = "Outside the assignment's audience", body = ApiError),
        (status = 404, description = "No such assignment", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "submissions"
)]
pub async fn submit_file(
    State(state): State<AppState>,
    session: Session,
    Path(assignment_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    // Visibility is enforced before the upload is touched.
    AssignmentRepository::new(&state.db)
        .get_visible(&session, assignment_id)
        .await?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart.next_field().await.map_err(|_| {
        validation_error(
            "Malformed multipart body",
            serde_json::json!({ "file": "Could not parse multipart form data" }),
        )
    })? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await.map_err(|_| {
                validation_error(
                    "Could not read uploaded file",
                    serde_json::json!({ "file": "Upload was interrupted or too large" }),
                )
            })?;
            upload = Some((filename, data.to_vec()));
            break;
        }
    }

    let Some((filename, data)) = upload else {
        return Err(validation_error(
            "No file provided",
            serde_json::json!({ "file": "A multipart field named 'file' is required" }),
        ));
    };
    if filename.is_empty() {
        return Err(validation_error(
            "No file selected",
            serde_json::json!({ "file": "Filename must not be empty" }),
        ));
    }

    let path = save_submission(
        &state.config.upload_dir,
        assignment_id,
        session.user_id,
        &filename,
        &data,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, assignment_id, "Failed to store submission file");
        ApiError::from(ErrorType::InternalServerError)
    })?;

    let record = SubmissionRepository::new(&state.db)
        .record(assignment_id, session.user_id, &path.to_string_lossy())
        .await?;

    tracing::info!(
        submission_id = record.id,
        assignment_id,
        user_id = session.user_id,
        "Submission recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            submission_id: record.id,
            message: "File submitted successfully".to_string(),
        }),
    ))
}

/// Lists submissions for an assignment (org_admin or team_manager)
#[utoipa::path(
    get,
    path = "/api/assignments/{id}/submissions",
    params(("id" = i32, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Submissions for the assignment", body = SubmissionsResponse),
        (status = 401, description = "Not authenticated", body = ApiError),
        (status = 403, description = "Role not allowed", body = ApiError),
        (status = 404, description = "No such assignment", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "submissions"
)]
pub async fn list_submissions(
    State(state): State<AppState>,
    session: Session,
    Path(assignment_id): Path<i32>,
) -> Result<Json<SubmissionsResponse>, ApiError> {
    session.require_role(&[Role::OrgAdmin, Role::TeamManager])?;

    // Existence check only; managers see submissions regardless of team.
    AssignmentRepository::new(&state.db)
        .ensure_exists(assignment_id)
        .await?;

    let rows = SubmissionRepository::new(&state.db)
        .list_for_assignment(assignment_id)
        .await?;

    Ok(Json(SubmissionsResponse {
        submissions: rows.into_iter().map(SubmissionDto::from).collect(),
    }))
}
