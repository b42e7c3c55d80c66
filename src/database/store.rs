use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{
    AssignedCourse, Course, FieldDefinition, FieldSet, FieldType, FieldValue, Profile,
};

/// Errors from the persistence layer. Messages are passed through to the
/// action boundary verbatim.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Query(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Column values for a new field definition. The order index is supplied
/// separately because append and duplicate place fields differently.
#[derive(Debug, Clone)]
pub struct NewField {
    pub field_set_id: Uuid,
    pub key: String,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub options: Vec<String>,
    pub half_width: bool,
}

/// Full overwrite of a field's editable columns, as produced by the
/// update_field action. `key` is recomputed from the label by the caller.
#[derive(Debug, Clone)]
pub struct FieldPatch {
    pub key: String,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub options: Vec<String>,
    pub half_width: bool,
}

/// Row-level persistence primitives for the intake domain.
///
/// Production uses the Postgres implementation; tests and DB-less development
/// use the in-memory one. Implementations must make `set_field_orders` and
/// `insert_field_at` atomic: a crash mid-way must not leave a partially
/// shifted ordering.
#[async_trait]
pub trait Datastore: Send + Sync {
    // --- profiles ---
    async fn profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError>;

    // --- courses ---
    async fn course(&self, id: Uuid) -> Result<Option<Course>, StoreError>;
    async fn courses_for_teacher(&self, teacher_id: Uuid) -> Result<Vec<Course>, StoreError>;

    // --- field sets ---
    async fn field_set(&self, id: Uuid) -> Result<Option<FieldSet>, StoreError>;
    async fn field_sets_for_teacher(&self, teacher_id: Uuid) -> Result<Vec<FieldSet>, StoreError>;
    async fn insert_field_set(
        &self,
        teacher_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<FieldSet, StoreError>;
    async fn update_field_set(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<(), StoreError>;
    /// Deletes the set; fields and assignments cascade at the storage layer.
    async fn delete_field_set(&self, id: Uuid) -> Result<(), StoreError>;

    // --- field definitions ---
    async fn field(&self, id: Uuid) -> Result<Option<FieldDefinition>, StoreError>;
    /// Fields of a set ordered by `order_index`.
    async fn fields_for_set(&self, field_set_id: Uuid) -> Result<Vec<FieldDefinition>, StoreError>;
    async fn max_order_index(&self, field_set_id: Uuid) -> Result<Option<i32>, StoreError>;
    async fn insert_field(
        &self,
        field: NewField,
        order_index: i32,
    ) -> Result<FieldDefinition, StoreError>;
    async fn update_field(&self, id: Uuid, patch: FieldPatch) -> Result<(), StoreError>;
    /// Deletes the field and cascades its stored values.
    async fn delete_field(&self, id: Uuid) -> Result<(), StoreError>;
    /// Overwrites order_index for the given (field id, index) pairs.
    /// Ids not belonging to the set are skipped; the surviving batch is
    /// applied atomically.
    async fn set_field_orders(
        &self,
        field_set_id: Uuid,
        orders: &[(Uuid, i32)],
    ) -> Result<(), StoreError>;
    /// Shifts every field of the set with `order_index >= order_index` up by
    /// one and inserts the new field at that slot, in one transaction.
    async fn insert_field_at(
        &self,
        field: NewField,
        order_index: i32,
    ) -> Result<FieldDefinition, StoreError>;

    // --- course assignments ---
    /// Keyed on (course_id, field_set_id); repeated calls upsert.
    async fn upsert_assignment(
        &self,
        course_id: Uuid,
        field_set_id: Uuid,
        active: bool,
    ) -> Result<(), StoreError>;
    async fn delete_assignment(
        &self,
        course_id: Uuid,
        field_set_id: Uuid,
    ) -> Result<(), StoreError>;
    /// Courses a field set is actively assigned to, with display columns.
    async fn assigned_courses(&self, field_set_id: Uuid) -> Result<Vec<AssignedCourse>, StoreError>;
    /// All fields of the set's active assignments for a course, ordered by
    /// (field_set_id, order_index).
    async fn active_fields_for_course(
        &self,
        course_id: Uuid,
    ) -> Result<Vec<FieldDefinition>, StoreError>;

    // --- field values / enrollment ---
    /// Idempotent upsert keyed on (student, course, field); last write wins.
    async fn upsert_value(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        field_id: Uuid,
        value: &Value,
    ) -> Result<(), StoreError>;
    async fn field_value(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        field_id: Uuid,
    ) -> Result<Option<FieldValue>, StoreError>;
    /// Creates the enrollment row if it does not exist yet.
    async fn ensure_enrollment(&self, student_id: Uuid, course_id: Uuid)
        -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
