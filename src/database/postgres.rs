use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::{
    AssignedCourse, Course, FieldDefinition, FieldSet, FieldValue, Profile,
};
use crate::database::store::{Datastore, FieldPatch, NewField, StoreError};

const FIELD_COLUMNS: &str =
    r#"id, field_set_id, "key", label, "type", required, options, half_width, order_index, created_at"#;

const FIELD_COLUMNS_QUALIFIED: &str = r#"f.id, f.field_set_id, f."key", f.label, f."type", f.required, f.options, f.half_width, f.order_index, f.created_at"#;

/// Production datastore backed by the application's Postgres database.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect via `DATABASE_URL` using the shared pool manager.
    pub async fn from_env() -> Result<Self, StoreError> {
        Ok(Self::new(DatabaseManager::pool().await?))
    }
}

#[async_trait]
impl Datastore for PostgresStore {
    async fn profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query_as::<_, Profile>(
            "SELECT id, role, first_name, last_name, email FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn course(&self, id: Uuid) -> Result<Option<Course>, StoreError> {
        let row = sqlx::query_as::<_, Course>(
            "SELECT id, teacher_id, title, course_code FROM courses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn courses_for_teacher(&self, teacher_id: Uuid) -> Result<Vec<Course>, StoreError> {
        let rows = sqlx::query_as::<_, Course>(
            "SELECT id, teacher_id, title, course_code FROM courses \
             WHERE teacher_id = $1 ORDER BY title ASC",
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn field_set(&self, id: Uuid) -> Result<Option<FieldSet>, StoreError> {
        let row = sqlx::query_as::<_, FieldSet>(
            "SELECT id, teacher_id, name, description, created_at \
             FROM student_field_sets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn field_sets_for_teacher(&self, teacher_id: Uuid) -> Result<Vec<FieldSet>, StoreError> {
        let rows = sqlx::query_as::<_, FieldSet>(
            "SELECT id, teacher_id, name, description, created_at \
             FROM student_field_sets WHERE teacher_id = $1 ORDER BY created_at DESC",
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_field_set(
        &self,
        teacher_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<FieldSet, StoreError> {
        let row = sqlx::query_as::<_, FieldSet>(
            "INSERT INTO student_field_sets (teacher_id, name, description) \
             VALUES ($1, $2, $3) \
             RETURNING id, teacher_id, name, description, created_at",
        )
        .bind(teacher_id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_field_set(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE student_field_sets SET name = $2, description = $3 WHERE id = $1")
            .bind(id)
            .bind(name)
            .bind(description)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_field_set(&self, id: Uuid) -> Result<(), StoreError> {
        // fields, assignments and values cascade via FKs
        sqlx::query("DELETE FROM student_field_sets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn field(&self, id: Uuid) -> Result<Option<FieldDefinition>, StoreError> {
        let sql = format!("SELECT {} FROM student_fields WHERE id = $1", FIELD_COLUMNS);
        let row = sqlx::query_as::<_, FieldDefinition>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn fields_for_set(&self, field_set_id: Uuid) -> Result<Vec<FieldDefinition>, StoreError> {
        let sql = format!(
            "SELECT {} FROM student_fields WHERE field_set_id = $1 ORDER BY order_index ASC",
            FIELD_COLUMNS
        );
        let rows = sqlx::query_as::<_, FieldDefinition>(&sql)
            .bind(field_set_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn max_order_index(&self, field_set_id: Uuid) -> Result<Option<i32>, StoreError> {
        let max: Option<i32> = sqlx::query_scalar(
            "SELECT MAX(order_index) FROM student_fields WHERE field_set_id = $1",
        )
        .bind(field_set_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(max)
    }

    async fn insert_field(
        &self,
        field: NewField,
        order_index: i32,
    ) -> Result<FieldDefinition, StoreError> {
        let sql = format!(
            "INSERT INTO student_fields \
             (field_set_id, \"key\", label, \"type\", required, options, half_width, order_index) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {}",
            FIELD_COLUMNS
        );
        let row = sqlx::query_as::<_, FieldDefinition>(&sql)
            .bind(field.field_set_id)
            .bind(&field.key)
            .bind(&field.label)
            .bind(field.field_type)
            .bind(field.required)
            .bind(serde_json::json!(field.options))
            .bind(field.half_width)
            .bind(order_index)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_field(&self, id: Uuid, patch: FieldPatch) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE student_fields \
             SET \"key\" = $2, label = $3, \"type\" = $4, required = $5, options = $6, half_width = $7 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&patch.key)
        .bind(&patch.label)
        .bind(patch.field_type)
        .bind(patch.required)
        .bind(serde_json::json!(patch.options))
        .bind(patch.half_width)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_field(&self, id: Uuid) -> Result<(), StoreError> {
        // stored values cascade via the field_id FK
        sqlx::query("DELETE FROM student_fields WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_field_orders(
        &self,
        field_set_id: Uuid,
        orders: &[(Uuid, i32)],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for (field_id, order_index) in orders {
            // the field_set_id predicate skips ids outside the target set
            sqlx::query(
                "UPDATE student_fields SET order_index = $3 \
                 WHERE id = $1 AND field_set_id = $2",
            )
            .bind(field_id)
            .bind(field_set_id)
            .bind(order_index)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn insert_field_at(
        &self,
        field: NewField,
        order_index: i32,
    ) -> Result<FieldDefinition, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE student_fields SET order_index = order_index + 1 \
             WHERE field_set_id = $1 AND order_index >= $2",
        )
        .bind(field.field_set_id)
        .bind(order_index)
        .execute(&mut *tx)
        .await?;

        let sql = format!(
            "INSERT INTO student_fields \
             (field_set_id, \"key\", label, \"type\", required, options, half_width, order_index) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {}",
            FIELD_COLUMNS
        );
        let row = sqlx::query_as::<_, FieldDefinition>(&sql)
            .bind(field.field_set_id)
            .bind(&field.key)
            .bind(&field.label)
            .bind(field.field_type)
            .bind(field.required)
            .bind(serde_json::json!(field.options))
            .bind(field.half_width)
            .bind(order_index)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn upsert_assignment(
        &self,
        course_id: Uuid,
        field_set_id: Uuid,
        active: bool,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO course_field_sets (course_id, field_set_id, active) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (course_id, field_set_id) DO UPDATE SET active = EXCLUDED.active",
        )
        .bind(course_id)
        .bind(field_set_id)
        .bind(active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_assignment(
        &self,
        course_id: Uuid,
        field_set_id: Uuid,
    ) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM course_field_sets WHERE course_id = $1 AND field_set_id = $2")
            .bind(course_id)
            .bind(field_set_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn assigned_courses(&self, field_set_id: Uuid) -> Result<Vec<AssignedCourse>, StoreError> {
        let rows = sqlx::query_as::<_, AssignedCourse>(
            "SELECT cfs.course_id, c.title, c.course_code \
             FROM course_field_sets cfs \
             JOIN courses c ON c.id = cfs.course_id \
             WHERE cfs.field_set_id = $1 AND cfs.active",
        )
        .bind(field_set_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn active_fields_for_course(
        &self,
        course_id: Uuid,
    ) -> Result<Vec<FieldDefinition>, StoreError> {
        let sql = format!(
            "SELECT {} FROM student_fields f \
             JOIN course_field_sets cfs ON cfs.field_set_id = f.field_set_id \
             WHERE cfs.course_id = $1 AND cfs.active \
             ORDER BY f.field_set_id, f.order_index",
            FIELD_COLUMNS_QUALIFIED
        );
        let rows = sqlx::query_as::<_, FieldDefinition>(&sql)
            .bind(course_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn upsert_value(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        field_id: Uuid,
        value: &Value,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO student_field_values (student_id, course_id, field_id, value) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (student_id, course_id, field_id) \
             DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
        )
        .bind(student_id)
        .bind(course_id)
        .bind(field_id)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn field_value(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        field_id: Uuid,
    ) -> Result<Option<FieldValue>, StoreError> {
        let row = sqlx::query_as::<_, FieldValue>(
            "SELECT student_id, course_id, field_id, value, updated_at \
             FROM student_field_values \
             WHERE student_id = $1 AND course_id = $2 AND field_id = $3",
        )
        .bind(student_id)
        .bind(course_id)
        .bind(field_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn ensure_enrollment(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO student_courses (student_id, course_id) VALUES ($1, $2) \
             ON CONFLICT (student_id, course_id) DO NOTHING",
        )
        .bind(student_id)
        .bind(course_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
