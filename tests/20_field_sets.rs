//! Field set CRUD and the ownership / role rules around it.

mod common;

use axum::http::StatusCode;
use uuid::Uuid;

use common::TestApp;
use intake_api::database::models::Role;

#[tokio::test]
async fn create_and_list_sets() {
    let app = TestApp::new();
    let (_, token) = app.seed_teacher().await;

    let (status, body) = app
        .post_form(
            &token,
            "/api/fields/create_set",
            &[("name", "Enrollment Basics"), ("description", "Core info")],
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = app.post_form(&token, "/api/fields/list_sets", &[]).await;
    assert_eq!(status, StatusCode::OK);
    let sets = body["sets"].as_array().unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0]["name"], "Enrollment Basics");
    assert_eq!(sets[0]["description"], "Core info");
}

#[tokio::test]
async fn create_set_requires_name() {
    let app = TestApp::new();
    let (_, token) = app.seed_teacher().await;

    let (status, body) = app
        .post_form(&token, "/api/fields/create_set", &[("name", "   ")])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name is required");
}

#[tokio::test]
async fn update_and_delete_set() {
    let app = TestApp::new();
    let (_, token) = app.seed_teacher().await;
    let set_id = app.create_set(&token, "Draft").await;

    let (status, _) = app
        .post_form(
            &token,
            "/api/fields/update_set",
            &[("id", &set_id.to_string()), ("name", "Final")],
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.post_form(&token, "/api/fields/list_sets", &[]).await;
    assert_eq!(body["sets"][0]["name"], "Final");

    let (status, _) = app
        .post_form(
            &token,
            "/api/fields/delete_set",
            &[("id", &set_id.to_string())],
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.post_form(&token, "/api/fields/list_sets", &[]).await;
    assert!(body["sets"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn sets_are_isolated_per_teacher() {
    let app = TestApp::new();
    let (_, token_a) = app.seed_user(Role::Teacher, "a@example.com").await;
    let (_, token_b) = app.seed_user(Role::Teacher, "b@example.com").await;
    let set_id = app.create_set(&token_a, "Teacher A Set").await;

    // Teacher B sees nothing and cannot touch A's set.
    let (_, body) = app.post_form(&token_b, "/api/fields/list_sets", &[]).await;
    assert!(body["sets"].as_array().unwrap().is_empty());

    let (status, body) = app
        .post_form(
            &token_b,
            "/api/fields/update_set",
            &[("id", &set_id.to_string()), ("name", "Hijack")],
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Field set not found");

    let (status, _) = app
        .post_form(
            &token_b,
            "/api/fields/delete_set",
            &[("id", &set_id.to_string())],
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn students_are_denied() {
    let app = TestApp::new();
    let (_, token) = app.seed_student().await;

    let (status, body) = app.post_form(&token, "/api/fields/list_sets", &[]).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied");
}

#[tokio::test]
async fn unknown_action_is_rejected() {
    let app = TestApp::new();
    let (_, token) = app.seed_teacher().await;

    let (status, body) = app
        .post_form(&token, "/api/fields/frobnicate", &[])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown action: frobnicate");
}

#[tokio::test]
async fn missing_set_is_not_found() {
    let app = TestApp::new();
    let (_, token) = app.seed_teacher().await;

    let (status, body) = app
        .get(&token, &format!("/api/fields/sets/{}", Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Field set not found");
}
