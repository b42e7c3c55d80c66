use std::sync::Arc;

use uuid::Uuid;

use crate::actions::FormPayload;
use crate::auth::{guard, Principal};
use crate::database::models::Role;
use crate::database::store::Datastore;
use crate::error::ApiError;
use crate::services::validator::validate_batch;

/// Student intake: validates every active field of a course against the
/// submitted form and persists the answers.
///
/// The whole batch is validated before anything is written, so a failing
/// submission stores no values at all.
pub struct IntakeService {
    store: Arc<dyn Datastore>,
}

impl IntakeService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }

    /// Process an intake submission for a course. Students submit for
    /// themselves; a teacher may submit on behalf of a student by passing
    /// `student_id`, but only for a course they own.
    ///
    /// Returns the number of values stored.
    pub async fn submit(
        &self,
        principal: &Principal,
        course_id: Uuid,
        form: &FormPayload,
    ) -> Result<usize, ApiError> {
        let student_id = match principal.role {
            Role::Teacher => {
                guard::owned_course(self.store.as_ref(), principal, course_id).await?;
                let student_id = form.uuid("student_id", "Missing student ID")?;
                let profile = self
                    .store
                    .profile(student_id)
                    .await?
                    .ok_or_else(|| ApiError::not_found("Student not found"))?;
                if profile.role != Role::Student {
                    return Err(ApiError::validation("User exists but is not a student"));
                }
                student_id
            }
            Role::Student => {
                if self.store.course(course_id).await?.is_none() {
                    return Err(ApiError::not_found("Course not found"));
                }
                principal.id
            }
            Role::Admin => return Err(ApiError::forbidden("Access denied")),
        };

        // Fields arrive ordered by (field_set_id, order_index); validation
        // walks them in that order and stops at the first failure.
        let fields = self.store.active_fields_for_course(course_id).await?;
        let values = validate_batch(&fields, |field| form.raw(&format!("field_{}", field.id)))?;

        for (field_id, value) in &values {
            self.store
                .upsert_value(student_id, course_id, *field_id, value)
                .await?;
        }
        self.store.ensure_enrollment(student_id, course_id).await?;

        tracing::info!(
            student_id = %student_id,
            course_id = %course_id,
            stored = values.len(),
            "intake submission stored"
        );
        Ok(values.len())
    }
}
