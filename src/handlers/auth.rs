//! # Authentication Handlers
//!
//! Signup, login and session introspection endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{MaybeSession, Role, Session, issue_token};
use crate::error::{ApiError, unauthorized, validation_error};
use crate::password::{hash_password, verify_password};
use crate::repositories::UserRepository;
use crate::server::AppState;

/// Request body for account signup
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub organization_id: Option<i32>,
}

/// Response for a successful signup
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignupResponse {
    pub message: String,
    pub user_id: i32,
}

/// Request body for login
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for a successful login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub id: i32,
    pub email: String,
    pub role: Role,
    pub organization_id: Option<i32>,
    pub is_admin: bool,
}

/// Identity response for `GET /api/user`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CurrentUserResponse {
    pub id: Option<i32>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub organization_id: Option<i32>,
    pub is_admin: bool,
}

/// Registers a new account with the default employee role
#[utoipa::path(
    post,
    path = "/api/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = SignupResponse),
        (status = 400, description = "Validation error or duplicate email", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(validation_error(
            "A valid email address is required",
            serde_json::json!({ "email": "Must be a valid email address" }),
        ));
    }
    if payload.password.len() < 6 {
        return Err(validation_error(
            "Password is too short",
            serde_json::json!({ "password": "Must be at least 6 characters" }),
        ));
    }

    let user = UserRepository::new(&state.db)
        .create(
            &email,
            &hash_password(&payload.password),
            Role::Employee,
            payload.organization_id,
        )
        .await?;

    tracing::info!(user_id = user.id, "Account created");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created successfully".to_string(),
            user_id: user.id,
        }),
    ))
}

/// Authenticates a user and issues a session token
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = payload.email.trim().to_lowercase();

    // The same message for unknown accounts and wrong passwords, so login
    // does not leak which emails exist.
    let user = UserRepository::new(&state.db)
        .find_by_email(&email)
        .await?
        .ok_or_else(|| unauthorized(Some("Invalid email or password")))?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(unauthorized(Some("Invalid email or password")));
    }

    let session = Session::for_user(&user)?;
    let token = issue_token(&state.config, &session)?;

    tracing::info!(user_id = session.user_id, role = %session.role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        id: session.user_id,
        email: session.email,
        role: session.role,
        organization_id: session.organization_id,
        is_admin: session.is_admin,
    }))
}

/// Returns the identity behind the request, or an anonymous shape
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Current identity (anonymous fields are null)", body = CurrentUserResponse)
    ),
    tag = "auth"
)]
pub async fn current_user(MaybeSession(session): MaybeSession) -> Json<CurrentUserResponse> {
    match session {
        Some(session) => Json(CurrentUserResponse {
            id: Some(session.user_id),
            email: Some(session.email),
            role: Some(session.role),
            organization_id: session.organization_id,
            is_admin: session.is_admin,
        }),
        None => Json(CurrentUserResponse {
            id: None,
            email: None,
            role: None,
            organization_id: None,
            is_admin: false,
        }),
    }
}
