use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Extension, Form, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::actions::FormPayload;
use crate::auth::Principal;
use crate::error::ApiError;
use crate::services::IntakeService;
use crate::state::AppState;

/// POST /api/courses/:course_id/intake - submit intake answers
///
/// Raw answers arrive keyed by convention as `field_<field id>`. Validation
/// runs over every active field of the course and the submission is
/// all-or-nothing: the first invalid answer fails the request and nothing
/// is stored.
pub async fn submit(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(course_id): Path<Uuid>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let form = FormPayload::new(form);
    let stored = IntakeService::new(state.store.clone())
        .submit(&principal, course_id, &form)
        .await?;
    Ok(Json(json!({ "success": true, "stored": stored })))
}
