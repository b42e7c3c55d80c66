use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named, teacher-owned collection of custom intake fields.
///
/// `teacher_id` is immutable after creation; renames and description edits
/// go through the owning teacher only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FieldSet {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
