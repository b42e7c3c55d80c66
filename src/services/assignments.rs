use std::sync::Arc;

use uuid::Uuid;

use crate::auth::{guard, Principal};
use crate::database::models::AssignedCourse;
use crate::database::store::Datastore;
use crate::error::ApiError;

/// The field-set <-> course assignment map. Both sides of an assignment must
/// belong to the acting teacher.
pub struct AssignmentService {
    store: Arc<dyn Datastore>,
}

impl AssignmentService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }

    /// Assign the set to a course, upserting onto any existing row so
    /// repeated calls cannot create duplicates.
    pub async fn assign(
        &self,
        principal: &Principal,
        field_set_id: Uuid,
        course_id: Uuid,
    ) -> Result<(), ApiError> {
        guard::owned_field_set(self.store.as_ref(), principal, field_set_id).await?;
        guard::owned_course(self.store.as_ref(), principal, course_id).await?;

        self.store
            .upsert_assignment(course_id, field_set_id, true)
            .await?;
        tracing::info!(set_id = %field_set_id, course_id = %course_id, "assigned field set to course");
        Ok(())
    }

    pub async fn unassign(
        &self,
        principal: &Principal,
        field_set_id: Uuid,
        course_id: Uuid,
    ) -> Result<(), ApiError> {
        guard::owned_field_set(self.store.as_ref(), principal, field_set_id).await?;
        guard::owned_course(self.store.as_ref(), principal, course_id).await?;

        self.store.delete_assignment(course_id, field_set_id).await?;
        Ok(())
    }

    /// Courses the set is actively assigned to, with display columns.
    pub async fn assigned_courses(
        &self,
        principal: &Principal,
        field_set_id: Uuid,
    ) -> Result<Vec<AssignedCourse>, ApiError> {
        guard::owned_field_set(self.store.as_ref(), principal, field_set_id).await?;
        Ok(self.store.assigned_courses(field_set_id).await?)
    }
}
