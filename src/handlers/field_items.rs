use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Extension, Form, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::actions::{FieldAction, FormPayload};
use crate::auth::{guard, Principal};
use crate::error::ApiError;
use crate::services::FieldService;
use crate::state::AppState;

/// GET /api/fields/sets/:field_set_id - field set detail with its fields
pub async fn set_detail(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(field_set_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let set = guard::owned_field_set(state.store.as_ref(), &principal, field_set_id).await?;
    let fields = state.store.fields_for_set(field_set_id).await?;
    Ok(Json(json!({ "success": true, "field_set": set, "fields": fields })))
}

/// POST /api/fields/sets/:field_set_id/:action - field level actions
///
/// The field-set id comes from the path, exactly like the original page
/// route; for field mutations it must match the targeted field's actual
/// parent set.
pub async fn field_action(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((field_set_id, action)): Path<(Uuid, String)>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let form = FormPayload::new(form);
    let action = FieldAction::parse(&action, &form)?;
    let service = FieldService::new(state.store.clone());

    match action {
        FieldAction::ListFields => {
            let fields = service.list(&principal, field_set_id).await?;
            Ok(Json(json!({ "success": true, "fields": fields })))
        }
        FieldAction::CreateField { input } => {
            service.create(&principal, field_set_id, input).await?;
            Ok(Json(json!({ "success": true })))
        }
        FieldAction::UpdateField { field_id, input } => {
            service
                .update(&principal, field_set_id, field_id, input)
                .await?;
            Ok(Json(json!({ "success": true })))
        }
        FieldAction::DeleteField { field_id } => {
            service.delete(&principal, field_set_id, field_id).await?;
            Ok(Json(json!({ "success": true })))
        }
        FieldAction::UpdateFieldOrder { orders } => {
            service.reorder(&principal, field_set_id, orders).await?;
            Ok(Json(json!({ "success": true })))
        }
        FieldAction::DuplicateField { field_id } => {
            service
                .duplicate(&principal, field_set_id, field_id)
                .await?;
            Ok(Json(json!({ "success": true })))
        }
    }
}
