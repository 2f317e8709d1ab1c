//! Integration tests for organization, team and employee directory endpoints.

mod test_utils;

use serde_json::json;
use test_utils::{TestApp, seed_fixture};

#[tokio::test]
async fn organization_creation_is_admin_gated() {
    let app = TestApp::spawn().await.unwrap();
    let fixture = seed_fixture(&app).await.unwrap();

    let (status, body) = app
        .request(
            "POST",
            "/api/organizations",
            Some(&fixture.admin_token),
            Some(json!({ "name": "Globex" })),
        )
        .await;
    assert_eq!(status, 201);
    assert!(body["organization_id"].is_i64());

    // Duplicate name is a validation failure with a specific message.
    let (status, body) = app
        .request(
            "POST",
            "/api/organizations",
            Some(&fixture.admin_token),
            Some(json!({ "name": "Globex" })),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "VALIDATION_FAILED");

    let (status, _) = app
        .request(
            "POST",
            "/api/organizations",
            Some(&fixture.member_token),
            Some(json!({ "name": "Initech" })),
        )
        .await;
    assert_eq!(status, 403);
}

#[tokio::test]
async fn team_and_membership_endpoints() {
    let app = TestApp::spawn().await.unwrap();
    let fixture = seed_fixture(&app).await.unwrap();

    let (status, body) = app
        .request(
            "POST",
            "/api/teams",
            Some(&fixture.admin_token),
            Some(json!({ "name": "Ops", "organization_id": fixture.org_id })),
        )
        .await;
    assert_eq!(status, 201);
    let team_id = body["team_id"].as_i64().unwrap();

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/teams/{}/members", team_id),
            Some(&fixture.admin_token),
            Some(json!({ "user_id": fixture.outsider.id })),
        )
        .await;
    assert_eq!(status, 201);

    // Adding the same pair again is a duplicate.
    let (status, _) = app
        .request(
            "POST",
            &format!("/api/teams/{}/members", team_id),
            Some(&fixture.admin_token),
            Some(json!({ "user_id": fixture.outsider.id })),
        )
        .await;
    assert_eq!(status, 400);

    let (status, _) = app
        .request(
            "POST",
            "/api/teams/999/members",
            Some(&fixture.admin_token),
            Some(json!({ "user_id": fixture.outsider.id })),
        )
        .await;
    assert_eq!(status, 404);

    // Managers are not admins.
    let (status, _) = app
        .request(
            "POST",
            "/api/teams",
            Some(&fixture.manager_token),
            Some(json!({ "name": "Shadow", "organization_id": fixture.org_id })),
        )
        .await;
    assert_eq!(status, 403);
}

#[tokio::test]
async fn employee_directory_listing_and_creation() {
    let app = TestApp::spawn().await.unwrap();
    let fixture = seed_fixture(&app).await.unwrap();

    // The listing is public.
    let (status, body) = app.request("GET", "/api/employees", None, None).await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 0);

    let (status, _) = app
        .request(
            "POST",
            "/api/employees",
            Some(&fixture.admin_token),
            Some(json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": "ada@acme.test",
                "position": "Engineer",
                "department": "R&D"
            })),
        )
        .await;
    assert_eq!(status, 201);

    let (_, body) = app.request("GET", "/api/employees", None, None).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["first_name"], "Ada");

    // Creation requires the admin flag.
    let (status, _) = app
        .request(
            "POST",
            "/api/employees",
            Some(&fixture.member_token),
            Some(json!({ "first_name": "Eve" })),
        )
        .await;
    assert_eq!(status, 403);

    let (status, _) = app
        .request(
            "POST",
            "/api/employees",
            None,
            Some(json!({ "first_name": "Eve" })),
        )
        .await;
    assert_eq!(status, 401);
}
