use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Assignment joined with course display columns, as returned by
/// the get_course_assignments action.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssignedCourse {
    pub course_id: Uuid,
    pub title: String,
    pub course_code: String,
}
