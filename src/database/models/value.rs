use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// The stored answer for one field, scoped to one student within one course.
/// Keyed on the (student, course, field) triple; re-submission overwrites.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FieldValue {
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub field_id: Uuid,
    pub value: Value,
    pub updated_at: DateTime<Utc>,
}
