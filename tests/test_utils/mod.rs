//! Test utilities for integration testing.
//!
//! Provides an in-memory SQLite database with migrations applied, a fully
//! wired router, and helpers for issuing requests and sessions.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tower::ServiceExt;

use staffboard::auth::{Role, Session, issue_token};
use staffboard::config::AppConfig;
use staffboard::repositories::{OrganizationRepository, TeamRepository, UserRepository};
use staffboard::server::{AppState, create_app};

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// A wired application over an in-memory database.
pub struct TestApp {
    pub app: Router,
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    _upload_dir: tempfile::TempDir,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let db = setup_test_db().await?;
        let upload_dir = tempfile::tempdir()?;
        let config = Arc::new(AppConfig {
            session_secret: "integration-test-secret".to_string(),
            upload_dir: upload_dir.path().to_string_lossy().into_owned(),
            ..Default::default()
        });
        let state = AppState {
            config: Arc::clone(&config),
            db: db.clone(),
        };

        Ok(TestApp {
            app: create_app(state),
            db,
            config,
            _upload_dir: upload_dir,
        })
    }

    /// Sends a request with an optional JSON body and bearer token.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    /// Sends a multipart POST with a single `file` field.
    pub async fn request_multipart(
        &self,
        path: &str,
        token: &str,
        filename: Option<&str>,
        contents: &[u8],
    ) -> (StatusCode, serde_json::Value) {
        let boundary = "staffboard-test-boundary";
        let disposition = match filename {
            Some(name) => format!("form-data; name=\"file\"; filename=\"{}\"", name),
            None => "form-data; name=\"file\"".to_string(),
        };

        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(format!("Content-Disposition: {}\r\n", disposition).as_bytes());
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    /// Issues a session token for a stored user.
    pub fn token_for(&self, user: &staffboard::models::user::Model) -> String {
        let session = Session::for_user(user).unwrap();
        issue_token(&self.config, &session).unwrap()
    }
}

/// A seeded organization with one user per role and a managed team.
pub struct Fixture {
    pub org_id: i32,
    pub team_id: i32,
    pub admin: staffboard::models::user::Model,
    pub manager: staffboard::models::user::Model,
    pub member: staffboard::models::user::Model,
    pub outsider: staffboard::models::user::Model,
    pub admin_token: String,
    pub manager_token: String,
    pub member_token: String,
    pub outsider_token: String,
}

/// Seeds the standard fixture: org "Acme", an org_admin, a team_manager
/// managing "Dev", one employee in the team and one outside it.
pub async fn seed_fixture(app: &TestApp) -> Result<Fixture> {
    let org = OrganizationRepository::new(&app.db).create("Acme").await?;
    let users = UserRepository::new(&app.db);

    let hash = staffboard::password::hash_password("password123");
    let admin = users
        .create("admin@acme.test", &hash, Role::OrgAdmin, Some(org.id))
        .await?;
    let manager = users
        .create("manager@acme.test", &hash, Role::TeamManager, Some(org.id))
        .await?;
    let member = users
        .create("member@acme.test", &hash, Role::Employee, Some(org.id))
        .await?;
    let outsider = users
        .create("outsider@acme.test", &hash, Role::Employee, Some(org.id))
        .await?;

    let teams = TeamRepository::new(&app.db);
    let team = teams.create("Dev", org.id, Some(manager.id)).await?;
    teams.add_member(team.id, member.id).await?;

    Ok(Fixture {
        org_id: org.id,
        team_id: team.id,
        admin_token: app.token_for(&admin),
        manager_token: app.token_for(&manager),
        member_token: app.token_for(&member),
        outsider_token: app.token_for(&outsider),
        admin,
        manager,
        member,
        outsider,
    })
}
