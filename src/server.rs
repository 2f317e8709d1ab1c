//! # Server Configuration
//!
//! This module contains the server setup and configuration for the
//! Staffboard API.

use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    http::{HeaderValue, Method, header},
    middleware,
    routing::get,
    routing::post,
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::auth_middleware;
use crate::config::AppConfig;
use crate::handlers;
use crate::telemetry::trace_context_middleware;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.config)
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/signup", post(handlers::auth::signup))
        .route("/api/login", post(handlers::auth::login))
        .route("/api/user", get(handlers::auth::current_user))
        .route("/api/employees", get(handlers::employees::list_employees));

    let protected = Router::new()
        .route("/api/employees", post(handlers::employees::create_employee))
        .route(
            "/api/organizations",
            post(handlers::organizations::create_organization),
        )
        .route("/api/teams", post(handlers::teams::create_team))
        .route(
            "/api/teams/{id}/members",
            post(handlers::teams::add_team_member),
        )
        .route(
            "/api/assignments",
            get(handlers::assignments::list_assignments)
                .post(handlers::assignments::create_assignment),
        )
        .route(
            "/api/assignments/{id}",
            get(handlers::assignments::get_assignment)
                .put(handlers::assignments::update_assignment)
                .delete(handlers::assignments::delete_assignment),
        )
        .route(
            "/api/assignments/{id}/submit",
            post(handlers::submissions::submit_file),
        )
        .route(
            "/api/assignments/{id}/submissions",
            get(handlers::submissions::list_submissions),
        )
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.config),
            auth_middleware,
        ));

    let cors = cors_layer(&state.config);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_context_middleware))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    match config.cors_allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!(
                origin = %config.cors_allowed_origin,
                "Invalid CORS origin, cross-origin requests will be rejected"
            );
            layer
        }
    }
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    // Resolve the configured bind address
    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;

    let profile = config.profile.clone();
    let state = AppState {
        config: Arc::new(config),
        db,
    };
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::auth::signup,
        crate::handlers::auth::login,
        crate::handlers::auth::current_user,
        crate::handlers::employees::list_employees,
        crate::handlers::employees::create_employee,
        crate::handlers::organizations::create_organization,
        crate::handlers::teams::create_team,
        crate::handlers::teams::add_team_member,
        crate::handlers::assignments::create_assignment,
        crate::handlers::assignments::list_assignments,
        crate::handlers::assignments::get_assignment,
        crate::handlers::assignments::update_assignment,
        crate::handlers::assignments::delete_assignment,
        crate::handlers::submissions::submit_file,
        crate::handlers::submissions::list_submissions,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::handlers::HealthResponse,
            crate::handlers::auth::SignupRequest,
            crate::handlers::auth::SignupResponse,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::LoginResponse,
            crate::handlers::auth::CurrentUserResponse,
            crate::handlers::employees::EmployeeDto,
            crate::handlers::employees::CreateEmployeeRequest,
            crate::handlers::organizations::CreateOrganizationRequest,
            crate::handlers::organizations::CreateOrganizationResponse,
            crate::handlers::teams::CreateTeamRequest,
            crate::handlers::teams::CreateTeamResponse,
            crate::handlers::teams::AddTeamMemberRequest,
            crate::handlers::teams::MessageResponse,
            crate::handlers::assignments::AssignmentRequest,
            crate::handlers::assignments::AssignmentDto,
            crate::handlers::assignments::AssignmentsResponse,
            crate::handlers::assignments::AssignmentResponse,
            crate::handlers::assignments::CreateAssignmentResponse,
            crate::handlers::assignments::AssignmentMessageResponse,
            crate::handlers::submissions::SubmissionDto,
            crate::handlers::submissions::SubmitResponse,
            crate::handlers::submissions::SubmissionsResponse,
            crate::auth::Role,
            crate::error::ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Staffboard API",
        description = "API for managing organizations, teams, assignments and submissions",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
