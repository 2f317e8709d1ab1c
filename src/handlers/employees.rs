//! # Employee Directory Handlers

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Session;
use crate::error::ApiError;
use crate::models::employee;
use crate::repositories::{EmployeeRepository, employee::NewEmployee};
use crate::server::AppState;

/// One employee directory row
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmployeeDto {
    pub id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub user_id: Option<i32>,
}

impl From<employee::Model> for EmployeeDto {
    fn from(row: employee::Model) -> Self {
        EmployeeDto {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            position: row.position,
            department: row.department,
            phone: row.phone,
            user_id: row.user_id,
        }
    }
}

/// Request body for adding a directory row
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmployeeRequest {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub user_id: Option<i32>,
}

/// Lists the employee directory
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "Employee directory", body = [EmployeeDto])
    ),
    tag = "employees"
)]
pub async fn list_employees(
    State(state): State<AppState>,
) -> Result<Json<Vec<EmployeeDto>>, ApiError> {
    let rows = EmployeeRepository::new(&state.db).list().await?;
    Ok(Json(rows.into_iter().map(EmployeeDto::from).collect()))
}

/// Adds a row to the employee directory (admin only)
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = EmployeeDto),
        (status = 400, description = "Validation error or duplicate email", body = ApiError),
        (status = 401, description = "Not authenticated", body = ApiError),
        (status = 403, description = "Admin privileges required", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "employees"
)]
pub async fn create_employee(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<EmployeeDto>), ApiError> {
    session.require_admin()?;

    let row = EmployeeRepository::new(&state.db)
        .create(NewEmployee {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            position: payload.position,
            department: payload.department,
            phone: payload.phone,
            user_id: payload.user_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(EmployeeDto::from(row))))
}
