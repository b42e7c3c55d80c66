//! Centralized ownership checks, run before every mutating operation.
//!
//! All lookups resolve through the admin-privileged store, so row-level
//! policy does not apply; these functions are the manual cross-tenant guard.
//! A missing resource and a resource owned by someone else produce the same
//! `NotFound`, so the error never reveals whether a foreign id exists.

use uuid::Uuid;

use crate::auth::Principal;
use crate::database::models::{Course, FieldDefinition, FieldSet, Role};
use crate::database::store::Datastore;
use crate::error::ApiError;

/// Role gate: every field-set mutation requires the teacher role.
pub fn require_teacher(principal: &Principal) -> Result<(), ApiError> {
    if principal.role != Role::Teacher {
        return Err(ApiError::forbidden("Access denied"));
    }
    Ok(())
}

/// Resolve a field set and verify the principal owns it.
pub async fn owned_field_set(
    store: &dyn Datastore,
    principal: &Principal,
    field_set_id: Uuid,
) -> Result<FieldSet, ApiError> {
    require_teacher(principal)?;
    match store.field_set(field_set_id).await? {
        Some(set) if set.teacher_id == principal.id => Ok(set),
        _ => Err(ApiError::not_found("Field set not found")),
    }
}

/// Resolve a course and verify the principal owns it.
pub async fn owned_course(
    store: &dyn Datastore,
    principal: &Principal,
    course_id: Uuid,
) -> Result<Course, ApiError> {
    require_teacher(principal)?;
    match store.course(course_id).await? {
        Some(course) if course.teacher_id == principal.id => Ok(course),
        _ => Err(ApiError::not_found("Course not found")),
    }
}

/// Resolve a field through its parent set and verify the full ownership
/// chain (field -> field set -> teacher).
///
/// When the request carries a parent field-set id it must match the field's
/// actual parent: a foreign field id submitted alongside an owned-but-wrong
/// parent id is rejected, not trusted.
pub async fn owned_field(
    store: &dyn Datastore,
    principal: &Principal,
    field_id: Uuid,
    expected_set: Option<Uuid>,
) -> Result<(FieldDefinition, FieldSet), ApiError> {
    require_teacher(principal)?;

    let field = match store.field(field_id).await? {
        Some(f) => f,
        None => return Err(ApiError::not_found("Field not found")),
    };

    if let Some(expected) = expected_set {
        if field.field_set_id != expected {
            return Err(ApiError::not_found("Field not found"));
        }
    }

    let set = match store.field_set(field.field_set_id).await? {
        Some(s) if s.teacher_id == principal.id => s,
        _ => return Err(ApiError::not_found("Field not found")),
    };

    Ok((field, set))
}
