use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::config;
use crate::handlers;
use crate::middleware::auth::bearer_auth_middleware;
use crate::state::AppState;

/// Assemble the full router over the given state.
///
/// Everything under `/api` requires a valid bearer token; the root banner
/// and the health endpoint stay public.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/fields/:action", post(handlers::fields::set_action))
        .route(
            "/api/fields/sets/:field_set_id",
            get(handlers::field_items::set_detail),
        )
        .route(
            "/api/fields/sets/:field_set_id/:action",
            post(handlers::field_items::field_action),
        )
        .route("/api/courses", get(handlers::courses::list))
        .route(
            "/api/courses/:course_id/intake",
            post(handlers::intake::submit),
        )
        .route_layer(middleware::from_fn(bearer_auth_middleware));

    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(protected);

    if config().security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "intake-api",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok"
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = state.store.ping().await.is_ok();
    Json(json!({
        "status": if database { "healthy" } else { "degraded" },
        "database": database
    }))
}
