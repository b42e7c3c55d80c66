use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Extension, Form, Json,
};
use serde_json::{json, Value};

use crate::actions::{FormPayload, SetAction};
use crate::auth::Principal;
use crate::error::ApiError;
use crate::services::{AssignmentService, FieldSetService};
use crate::state::AppState;

/// POST /api/fields/:action - field-set level actions
///
/// Dispatches the named action against the parsed, typed request. The
/// returned envelope is always `{ success, ... }`; failures are turned into
/// the same shape by [`ApiError`].
pub async fn set_action(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(action): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let form = FormPayload::new(form);
    let action = SetAction::parse(&action, &form)?;

    match action {
        SetAction::ListSets => {
            let sets = FieldSetService::new(state.store.clone())
                .list(&principal)
                .await?;
            Ok(Json(json!({ "success": true, "sets": sets })))
        }
        SetAction::CreateSet { name, description } => {
            FieldSetService::new(state.store.clone())
                .create(&principal, &name, description.as_deref())
                .await?;
            Ok(Json(json!({ "success": true })))
        }
        SetAction::UpdateSet {
            id,
            name,
            description,
        } => {
            FieldSetService::new(state.store.clone())
                .update(&principal, id, &name, description.as_deref())
                .await?;
            Ok(Json(json!({ "success": true })))
        }
        SetAction::DeleteSet { id } => {
            FieldSetService::new(state.store.clone())
                .delete(&principal, id)
                .await?;
            Ok(Json(json!({ "success": true })))
        }
        SetAction::AssignToCourse {
            field_set_id,
            course_id,
        } => {
            AssignmentService::new(state.store.clone())
                .assign(&principal, field_set_id, course_id)
                .await?;
            Ok(Json(json!({ "success": true })))
        }
        SetAction::UnassignFromCourse {
            field_set_id,
            course_id,
        } => {
            AssignmentService::new(state.store.clone())
                .unassign(&principal, field_set_id, course_id)
                .await?;
            Ok(Json(json!({ "success": true })))
        }
        SetAction::GetCourseAssignments { field_set_id } => {
            let assignments = AssignmentService::new(state.store.clone())
                .assigned_courses(&principal, field_set_id)
                .await?;
            Ok(Json(json!({ "success": true, "assignments": assignments })))
        }
    }
}
