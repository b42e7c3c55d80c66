//! End-to-end intake: validation of submitted answers, persistence, and the
//! teacher-on-behalf path.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::TestApp;
use intake_api::database::models::Role;
use intake_api::database::store::Datastore;

/// Teacher with a course, a set assigned to it, and one select field
/// ("Shirt Size": S/M/L, required). Returns (course_id, shirt field id).
async fn shirt_size_setup(app: &TestApp, teacher_id: Uuid, token: &str) -> (Uuid, Uuid) {
    let course_id = app.seed_course(teacher_id, "Pottery 101", "POT-101").await;
    let set_id = app.create_set(token, "Merch").await;

    let (status, body) = app
        .post_form(
            token,
            &format!("/api/fields/sets/{set_id}/create_field"),
            &[
                ("name", "Shirt Size"),
                ("type", "select"),
                ("options", "S\nM\nL"),
                ("required", "on"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::OK, "create_field failed: {body}");

    let (status, _) = app
        .post_form(
            token,
            "/api/fields/assign_to_course",
            &[
                ("field_set_id", &set_id.to_string()),
                ("course_id", &course_id.to_string()),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let fields = app.list_fields(token, set_id).await;
    let field_id = Uuid::parse_str(fields[0]["id"].as_str().unwrap()).unwrap();
    (course_id, field_id)
}

#[tokio::test]
async fn student_submission_stores_values_and_enrolls() {
    let app = TestApp::new();
    let (teacher_id, teacher_token) = app.seed_teacher().await;
    let (student_id, student_token) = app.seed_student().await;
    let (course_id, field_id) = shirt_size_setup(&app, teacher_id, &teacher_token).await;

    let (status, body) = app
        .post_form(
            &student_token,
            &format!("/api/courses/{course_id}/intake"),
            &[(&format!("field_{field_id}"), "M")],
        )
        .await;
    assert_eq!(status, StatusCode::OK, "intake failed: {body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["stored"], 1);

    let value = app
        .store
        .field_value(student_id, course_id, field_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(value.value, json!("M"));
    assert!(app.store.is_enrolled(student_id, course_id).await);
}

#[tokio::test]
async fn invalid_option_fails_and_stores_nothing() {
    let app = TestApp::new();
    let (teacher_id, teacher_token) = app.seed_teacher().await;
    let (_, student_token) = app.seed_student().await;
    let (course_id, field_id) = shirt_size_setup(&app, teacher_id, &teacher_token).await;

    let (status, body) = app
        .post_form(
            &student_token,
            &format!("/api/courses/{course_id}/intake"),
            &[(&format!("field_{field_id}"), "XL")],
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Shirt Size must be one of the provided options");
    assert_eq!(app.store.value_count().await, 0);
}

#[tokio::test]
async fn missing_required_answer_is_rejected() {
    let app = TestApp::new();
    let (teacher_id, teacher_token) = app.seed_teacher().await;
    let (_, student_token) = app.seed_student().await;
    let (course_id, _) = shirt_size_setup(&app, teacher_id, &teacher_token).await;

    let (status, body) = app
        .post_form(
            &student_token,
            &format!("/api/courses/{course_id}/intake"),
            &[],
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required field: Shirt Size");
    assert_eq!(app.store.value_count().await, 0);
}

#[tokio::test]
async fn failing_batch_writes_nothing() {
    let app = TestApp::new();
    let (teacher_id, teacher_token) = app.seed_teacher().await;
    let (_, student_token) = app.seed_student().await;
    let course_id = app.seed_course(teacher_id, "Pottery 101", "POT-101").await;
    let set_id = app.create_set(&teacher_token, "Basics").await;

    for (name, ty) in [("Nickname", "text"), ("Guest Count", "number")] {
        let (status, _) = app
            .post_form(
                &teacher_token,
                &format!("/api/fields/sets/{set_id}/create_field"),
                &[("name", name), ("type", ty), ("required", "on")],
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    app.post_form(
        &teacher_token,
        "/api/fields/assign_to_course",
        &[
            ("field_set_id", &set_id.to_string()),
            ("course_id", &course_id.to_string()),
        ],
    )
    .await;

    let fields = app.list_fields(&teacher_token, set_id).await;
    let nickname = fields[0]["id"].as_str().unwrap();
    let count = fields[1]["id"].as_str().unwrap();

    // First field is valid, second fails: nothing at all is stored.
    let (status, body) = app
        .post_form(
            &student_token,
            &format!("/api/courses/{course_id}/intake"),
            &[
                (&format!("field_{nickname}"), "Sam"),
                (&format!("field_{count}"), "lots"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Guest Count must be a number");
    assert_eq!(app.store.value_count().await, 0);
}

#[tokio::test]
async fn resubmission_overwrites_the_value() {
    let app = TestApp::new();
    let (teacher_id, teacher_token) = app.seed_teacher().await;
    let (student_id, student_token) = app.seed_student().await;
    let (course_id, field_id) = shirt_size_setup(&app, teacher_id, &teacher_token).await;
    let path = format!("/api/courses/{course_id}/intake");
    let key = format!("field_{field_id}");

    for size in ["S", "L"] {
        let (status, _) = app
            .post_form(&student_token, &path, &[(&key, size)])
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(app.store.value_count().await, 1);
    let value = app
        .store
        .field_value(student_id, course_id, field_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(value.value, json!("L"));
}

#[tokio::test]
async fn teacher_submits_on_behalf_of_a_student() {
    let app = TestApp::new();
    let (teacher_id, teacher_token) = app.seed_teacher().await;
    let (student_id, _) = app.seed_student().await;
    let (course_id, field_id) = shirt_size_setup(&app, teacher_id, &teacher_token).await;
    let path = format!("/api/courses/{course_id}/intake");

    let (status, body) = app
        .post_form(
            &teacher_token,
            &path,
            &[
                ("student_id", student_id.to_string().as_str()),
                (&format!("field_{field_id}"), "S"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::OK, "intake failed: {body}");

    let value = app
        .store
        .field_value(student_id, course_id, field_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(value.value, json!("S"));
}

#[tokio::test]
async fn teacher_on_behalf_requires_a_real_student() {
    let app = TestApp::new();
    let (teacher_id, teacher_token) = app.seed_teacher().await;
    let (other_teacher, _) = app.seed_user(Role::Teacher, "other@example.com").await;
    let (course_id, _) = shirt_size_setup(&app, teacher_id, &teacher_token).await;
    let path = format!("/api/courses/{course_id}/intake");

    let (status, body) = app.post_form(&teacher_token, &path, &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing student ID");

    let (status, body) = app
        .post_form(
            &teacher_token,
            &path,
            &[("student_id", Uuid::new_v4().to_string().as_str())],
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Student not found");

    let (status, body) = app
        .post_form(
            &teacher_token,
            &path,
            &[("student_id", other_teacher.to_string().as_str())],
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User exists but is not a student");
}

#[tokio::test]
async fn teacher_cannot_submit_for_someone_elses_course() {
    let app = TestApp::new();
    let (teacher_id, teacher_token) = app.seed_teacher().await;
    let (_, other_token) = app.seed_user(Role::Teacher, "other@example.com").await;
    let (student_id, _) = app.seed_student().await;
    let (course_id, _) = shirt_size_setup(&app, teacher_id, &teacher_token).await;

    let (status, body) = app
        .post_form(
            &other_token,
            &format!("/api/courses/{course_id}/intake"),
            &[("student_id", student_id.to_string().as_str())],
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Course not found");
}

#[tokio::test]
async fn admins_cannot_submit_intake() {
    let app = TestApp::new();
    let (teacher_id, teacher_token) = app.seed_teacher().await;
    let (_, admin_token) = app.seed_user(Role::Admin, "admin@example.com").await;
    let (course_id, _) = shirt_size_setup(&app, teacher_id, &teacher_token).await;

    let (status, body) = app
        .post_form(
            &admin_token,
            &format!("/api/courses/{course_id}/intake"),
            &[],
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied");
}

#[tokio::test]
async fn student_intake_against_missing_course_is_not_found() {
    let app = TestApp::new();
    let (_, student_token) = app.seed_student().await;

    let (status, body) = app
        .post_form(
            &student_token,
            &format!("/api/courses/{}/intake", Uuid::new_v4()),
            &[],
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Course not found");
}
