use std::sync::Arc;

use uuid::Uuid;

use crate::auth::{guard, Principal};
use crate::database::models::FieldSet;
use crate::database::store::Datastore;
use crate::error::ApiError;

/// CRUD over teacher-owned field sets.
pub struct FieldSetService {
    store: Arc<dyn Datastore>,
}

impl FieldSetService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }

    /// All field sets of the acting teacher, newest first.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<FieldSet>, ApiError> {
        guard::require_teacher(principal)?;
        Ok(self.store.field_sets_for_teacher(principal.id).await?)
    }

    pub async fn create(
        &self,
        principal: &Principal,
        name: &str,
        description: Option<&str>,
    ) -> Result<FieldSet, ApiError> {
        guard::require_teacher(principal)?;
        let set = self
            .store
            .insert_field_set(principal.id, name, description)
            .await?;
        tracing::info!(set_id = %set.id, teacher_id = %principal.id, "created field set");
        Ok(set)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<(), ApiError> {
        guard::owned_field_set(self.store.as_ref(), principal, id).await?;
        self.store.update_field_set(id, name, description).await?;
        Ok(())
    }

    /// Deletes the set; its fields and assignments cascade at the storage
    /// layer.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), ApiError> {
        guard::owned_field_set(self.store.as_ref(), principal, id).await?;
        self.store.delete_field_set(id).await?;
        tracing::info!(set_id = %id, "deleted field set");
        Ok(())
    }
}
