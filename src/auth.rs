//! # Authentication and Authorization
//!
//! This module provides bearer-token session authentication for protected
//! API endpoints. Tokens are signed JWTs carrying the user's identity, role
//! and organization.

use std::{fmt, str::FromStr, sync::Arc};

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::{ApiError, forbidden, unauthorized};

/// User roles recognized by the API. Flat, not hierarchical; operations
/// check against explicit allow-lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    OrgAdmin,
    TeamManager,
    Employee,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::OrgAdmin => "org_admin",
            Role::TeamManager => "team_manager",
            Role::Employee => "employee",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Admin-ness as derived at login time.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::OrgAdmin | Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "org_admin" => Ok(Role::OrgAdmin),
            "team_manager" => Ok(Role::TeamManager),
            "employee" => Ok(Role::Employee),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Error returned when a role string is not recognized.
#[derive(Debug, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

/// Claims embedded in a session token.
///
/// `is_admin` is computed once at login and trusted for the token lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
    pub organization_id: Option<i32>,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated session, available as an extension on protected requests.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
    pub organization_id: Option<i32>,
    pub is_admin: bool,
}

impl Session {
    pub fn for_user(user: &crate::models::user::Model) -> Result<Self, ApiError> {
        let role: Role = user.role.parse().map_err(|_| {
            tracing::error!(user_id = user.id, role = %user.role, "Stored role is invalid");
            ApiError::from(crate::error::ErrorType::InternalServerError)
        })?;

        Ok(Session {
            user_id: user.id,
            email: user.email.clone(),
            role,
            organization_id: user.organization_id,
            is_admin: role.is_admin(),
        })
    }

    /// Returns an error unless the session holds one of the given roles.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(forbidden(Some("Insufficient role for this operation")))
        }
    }

    /// Gate on the admin flag captured at login.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(forbidden(Some("Admin privileges required")))
        }
    }
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Session {
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
            organization_id: claims.organization_id,
            is_admin: claims.is_admin,
        }
    }
}

/// Optional session extractor for endpoints that behave differently when
/// authenticated but do not require it.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

/// Issues a signed session token for the given user identity.
pub fn issue_token(config: &AppConfig, session: &Session) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        user_id: session.user_id,
        email: session.email.clone(),
        role: session.role,
        organization_id: session.organization_id,
        is_admin: session.is_admin,
        iat: now.timestamp(),
        exp: (now + chrono::Duration::hours(config.session_ttl_hours as i64)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.session_secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to sign session token");
        ApiError::from(crate::error::ErrorType::InternalServerError)
    })
}

/// Decodes and validates a session token.
pub fn decode_token(config: &AppConfig, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.session_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| unauthorized(Some("Invalid or expired session token")))
}

/// Authentication middleware that validates bearer session tokens.
///
/// On success the decoded [`Session`] is inserted into request extensions
/// for handlers and extractors.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?.to_owned();
    let claims = decode_token(&config, &token)?;
    let session = Session::from(claims);

    tracing::debug!(
        user_id = session.user_id,
        role = %session.role,
        organization_id = session.organization_id,
        "Authenticated request"
    );

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized(Some("Missing Authorization header")))
        .and_then(|value| {
            value
                .to_str()
                .map_err(|_| unauthorized(Some("Invalid Authorization header")))
        })
        .and_then(|header| {
            header
                .strip_prefix("Bearer ")
                .ok_or_else(|| unauthorized(Some("Authorization header must use Bearer scheme")))
        })
}

impl<S> FromRequestParts<S> for Session
where
    Arc<AppConfig>: FromRef<S>,
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| unauthorized(Some("Authentication required")))
    }
}

impl<S> FromRequestParts<S> for MaybeSession
where
    Arc<AppConfig>: FromRef<S>,
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extension first (behind the middleware), then a best-effort parse
        // of the header for routes outside it.
        if let Some(session) = parts.extensions.get::<Session>().cloned() {
            return Ok(MaybeSession(Some(session)));
        }

        let config = Arc::<AppConfig>::from_ref(state);
        let session = extract_bearer_token(&parts.headers)
            .ok()
            .and_then(|token| decode_token(&config, token).ok())
            .map(Session::from);

        Ok(MaybeSession(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    fn test_config() -> Arc<AppConfig> {
        Arc::new(AppConfig {
            session_secret: "test-secret".to_string(),
            ..Default::default()
        })
    }

    fn test_session(role: Role) -> Session {
        Session {
            user_id: 7,
            email: "user@example.com".to_string(),
            role,
            organization_id: Some(1),
            is_admin: role.is_admin(),
        }
    }

    async fn run_middleware(config: Arc<AppConfig>, request: Request<Body>) -> Response {
        async fn handler(session: Session) -> String {
            format!("user {}", session.user_id)
        }

        Router::new()
            .route("/test", get(handler))
            .layer(axum::middleware::from_fn_with_state(
                Arc::clone(&config),
                auth_middleware,
            ))
            .with_state(crate::server::AppState {
                config,
                db: sea_orm::DatabaseConnection::default(),
            })
            .oneshot(request)
            .await
            .unwrap()
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [
            Role::OrgAdmin,
            Role::TeamManager,
            Role::Employee,
            Role::SuperAdmin,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn admin_flag_derivation() {
        assert!(Role::OrgAdmin.is_admin());
        assert!(Role::SuperAdmin.is_admin());
        assert!(!Role::TeamManager.is_admin());
        assert!(!Role::Employee.is_admin());
    }

    #[test]
    fn issue_and_decode_token() {
        let config = test_config();
        let token = issue_token(&config, &test_session(Role::Employee)).unwrap();
        let claims = decode_token(&config, &token).unwrap();

        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.role, Role::Employee);
        assert_eq!(claims.organization_id, Some(1));
        assert!(!claims.is_admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_rejected() {
        let config = test_config();
        let other = Arc::new(AppConfig {
            session_secret: "different-secret".to_string(),
            ..Default::default()
        });

        let token = issue_token(&other, &test_session(Role::Employee)).unwrap();
        assert!(decode_token(&config, &token).is_err());
    }

    #[test]
    fn require_role_enforced() {
        let session = test_session(Role::TeamManager);
        assert!(
            session
                .require_role(&[Role::OrgAdmin, Role::TeamManager])
                .is_ok()
        );
        assert!(session.require_role(&[Role::Employee]).is_err());
        assert!(session.require_admin().is_err());
        assert!(test_session(Role::OrgAdmin).require_admin().is_ok());
    }

    #[tokio::test]
    async fn missing_auth_header_returns_401() {
        let request = Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = run_middleware(test_config(), request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_token_returns_401() {
        let request = Request::builder()
            .uri("/test")
            .header("Authorization", "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();

        let response = run_middleware(test_config(), request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_passes_through() {
        let config = test_config();
        let token = issue_token(&config, &test_session(Role::Employee)).unwrap();

        let request = Request::builder()
            .uri("/test")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = run_middleware(config, request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
