use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::auth::{guard, Principal};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/courses - the acting teacher's courses, ordered by title
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, ApiError> {
    guard::require_teacher(&principal)?;
    let courses = state.store.courses_for_teacher(principal.id).await?;
    Ok(Json(json!({ "success": true, "courses": courses })))
}
