use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A course, exclusively owned by one teacher.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub title: String,
    pub course_code: String,
}
