//! Shared harness for the integration suites: a full router over the
//! in-memory store, driven through tower's `oneshot` without binding a port.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use intake_api::app::app;
use intake_api::auth::{generate_jwt, Claims};
use intake_api::database::memory::MemoryStore;
use intake_api::database::models::{Course, Profile, Role};
use intake_api::state::AppState;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let router = app(AppState::new(store.clone()));
        Self { router, store }
    }

    /// Seed a profile and return its id plus a bearer token for it.
    pub async fn seed_user(&self, role: Role, email: &str) -> (Uuid, String) {
        let id = Uuid::new_v4();
        self.store
            .add_profile(Profile {
                id,
                role,
                first_name: Some("Test".into()),
                last_name: Some("User".into()),
                email: email.to_string(),
            })
            .await;
        (id, token_for(id, role, email))
    }

    pub async fn seed_teacher(&self) -> (Uuid, String) {
        self.seed_user(Role::Teacher, "teacher@example.com").await
    }

    pub async fn seed_student(&self) -> (Uuid, String) {
        self.seed_user(Role::Student, "student@example.com").await
    }

    pub async fn seed_course(&self, teacher_id: Uuid, title: &str, code: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.store
            .add_course(Course {
                id,
                teacher_id,
                title: title.to_string(),
                course_code: code.to_string(),
            })
            .await;
        id
    }

    pub async fn get(&self, token: &str, path: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        send(self.router.clone(), request).await
    }

    pub async fn post_form(
        &self,
        token: &str,
        path: &str,
        fields: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let body = serde_urlencoded::to_string(fields).unwrap();
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        send(self.router.clone(), request).await
    }

    /// Create a field set and return its id.
    pub async fn create_set(&self, token: &str, name: &str) -> Uuid {
        let (status, body) = self
            .post_form(token, "/api/fields/create_set", &[("name", name)])
            .await;
        assert_eq!(status, StatusCode::OK, "create_set failed: {body}");

        let (status, body) = self.post_form(token, "/api/fields/list_sets", &[]).await;
        assert_eq!(status, StatusCode::OK);
        let id = body["sets"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["name"] == name)
            .and_then(|s| s["id"].as_str())
            .unwrap()
            .to_string();
        Uuid::parse_str(&id).unwrap()
    }

    /// Fields of a set, in order, as raw JSON.
    pub async fn list_fields(&self, token: &str, set_id: Uuid) -> Vec<Value> {
        let (status, body) = self
            .get(token, &format!("/api/fields/sets/{set_id}"))
            .await;
        assert_eq!(status, StatusCode::OK, "set detail failed: {body}");
        body["fields"].as_array().unwrap().clone()
    }
}

pub fn token_for(id: Uuid, role: Role, email: &str) -> String {
    let claims = Claims::new(id, role, email.to_string());
    generate_jwt(&claims).unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
