use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::actions::FieldInput;
use crate::auth::{guard, Principal};
use crate::database::models::{derive_key, FieldDefinition};
use crate::database::store::{Datastore, FieldPatch, NewField};
use crate::error::ApiError;

/// Field-definition operations within one field set. Every mutation verifies
/// the ownership chain (field -> field set -> teacher) first; the field-set
/// id always comes from the request path and must match the field's actual
/// parent.
pub struct FieldService {
    store: Arc<dyn Datastore>,
}

impl FieldService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }

    /// Fields of the set in display/validation order.
    pub async fn list(
        &self,
        principal: &Principal,
        field_set_id: Uuid,
    ) -> Result<Vec<FieldDefinition>, ApiError> {
        guard::owned_field_set(self.store.as_ref(), principal, field_set_id).await?;
        Ok(self.store.fields_for_set(field_set_id).await?)
    }

    /// Appends a field at the next free order index (0 for an empty set).
    pub async fn create(
        &self,
        principal: &Principal,
        field_set_id: Uuid,
        input: FieldInput,
    ) -> Result<FieldDefinition, ApiError> {
        guard::owned_field_set(self.store.as_ref(), principal, field_set_id).await?;

        let order_index = self
            .store
            .max_order_index(field_set_id)
            .await?
            .map(|max| max + 1)
            .unwrap_or(0);

        let field = self
            .store
            .insert_field(
                NewField {
                    field_set_id,
                    key: derive_key(&input.label),
                    label: input.label,
                    field_type: input.field_type,
                    required: input.required,
                    options: input.options,
                    half_width: input.half_width,
                },
                order_index,
            )
            .await?;
        tracing::info!(field_id = %field.id, set_id = %field_set_id, "created field");
        Ok(field)
    }

    /// Overwrites the field's editable columns, recomputing the key.
    pub async fn update(
        &self,
        principal: &Principal,
        field_set_id: Uuid,
        field_id: Uuid,
        input: FieldInput,
    ) -> Result<(), ApiError> {
        guard::owned_field(self.store.as_ref(), principal, field_id, Some(field_set_id)).await?;

        self.store
            .update_field(
                field_id,
                FieldPatch {
                    key: derive_key(&input.label),
                    label: input.label,
                    field_type: input.field_type,
                    required: input.required,
                    options: input.options,
                    half_width: input.half_width,
                },
            )
            .await?;
        Ok(())
    }

    /// Deletes the field; stored values cascade.
    pub async fn delete(
        &self,
        principal: &Principal,
        field_set_id: Uuid,
        field_id: Uuid,
    ) -> Result<(), ApiError> {
        guard::owned_field(self.store.as_ref(), principal, field_id, Some(field_set_id)).await?;
        self.store.delete_field(field_id).await?;
        tracing::info!(field_id = %field_id, "deleted field");
        Ok(())
    }

    /// Applies the submitted ordering. Entries for ids outside the set were
    /// already dropped during parsing or are skipped by the store; the
    /// surviving batch is applied atomically.
    pub async fn reorder(
        &self,
        principal: &Principal,
        field_set_id: Uuid,
        orders: Vec<(Uuid, i32)>,
    ) -> Result<(), ApiError> {
        guard::owned_field_set(self.store.as_ref(), principal, field_set_id).await?;
        self.store.set_field_orders(field_set_id, &orders).await?;
        Ok(())
    }

    /// Copies a field to the slot immediately after the source, shifting
    /// every later field up by one. The label gains a " (Copy)" suffix and
    /// the key a millisecond timestamp so it stays unique within the set.
    pub async fn duplicate(
        &self,
        principal: &Principal,
        field_set_id: Uuid,
        field_id: Uuid,
    ) -> Result<FieldDefinition, ApiError> {
        let (source, _) = guard::owned_field(
            self.store.as_ref(),
            principal,
            field_id,
            Some(field_set_id),
        )
        .await?;

        let label = format!("{} (Copy)", source.label);
        let key = format!("{}_{}", derive_key(&label), Utc::now().timestamp_millis());

        let copy = self
            .store
            .insert_field_at(
                NewField {
                    field_set_id: source.field_set_id,
                    key,
                    label,
                    field_type: source.field_type,
                    required: source.required,
                    options: source.options,
                    half_width: source.half_width,
                },
                source.order_index + 1,
            )
            .await?;
        tracing::info!(field_id = %field_id, copy_id = %copy.id, "duplicated field");
        Ok(copy)
    }
}
