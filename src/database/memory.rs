//! In-memory datastore used by the test suites and for running the service
//! without a database. Mirrors the Postgres implementation's behavior,
//! including cascades and upsert keys.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::database::models::{
    AssignedCourse, Course, FieldDefinition, FieldSet, FieldValue, Profile,
};
use crate::database::store::{Datastore, FieldPatch, NewField, StoreError};

#[derive(Default)]
struct State {
    profiles: HashMap<Uuid, Profile>,
    courses: HashMap<Uuid, Course>,
    field_sets: HashMap<Uuid, FieldSet>,
    fields: HashMap<Uuid, FieldDefinition>,
    // keyed on (course_id, field_set_id), value is the active flag
    assignments: HashMap<(Uuid, Uuid), bool>,
    // keyed on (student_id, course_id, field_id)
    values: HashMap<(Uuid, Uuid, Uuid), FieldValue>,
    enrollments: HashMap<(Uuid, Uuid), String>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Seed helpers for data owned by the external platform.

    pub async fn add_profile(&self, profile: Profile) {
        self.state.lock().await.profiles.insert(profile.id, profile);
    }

    pub async fn add_course(&self, course: Course) {
        self.state.lock().await.courses.insert(course.id, course);
    }

    pub async fn is_enrolled(&self, student_id: Uuid, course_id: Uuid) -> bool {
        self.state
            .lock()
            .await
            .enrollments
            .contains_key(&(student_id, course_id))
    }

    pub async fn value_count(&self) -> usize {
        self.state.lock().await.values.len()
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(self.state.lock().await.profiles.get(&id).cloned())
    }

    async fn course(&self, id: Uuid) -> Result<Option<Course>, StoreError> {
        Ok(self.state.lock().await.courses.get(&id).cloned())
    }

    async fn courses_for_teacher(&self, teacher_id: Uuid) -> Result<Vec<Course>, StoreError> {
        let state = self.state.lock().await;
        let mut courses: Vec<Course> = state
            .courses
            .values()
            .filter(|c| c.teacher_id == teacher_id)
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(courses)
    }

    async fn field_set(&self, id: Uuid) -> Result<Option<FieldSet>, StoreError> {
        Ok(self.state.lock().await.field_sets.get(&id).cloned())
    }

    async fn field_sets_for_teacher(&self, teacher_id: Uuid) -> Result<Vec<FieldSet>, StoreError> {
        let state = self.state.lock().await;
        let mut sets: Vec<FieldSet> = state
            .field_sets
            .values()
            .filter(|s| s.teacher_id == teacher_id)
            .cloned()
            .collect();
        sets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sets)
    }

    async fn insert_field_set(
        &self,
        teacher_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<FieldSet, StoreError> {
        let set = FieldSet {
            id: Uuid::new_v4(),
            teacher_id,
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: Utc::now(),
        };
        self.state.lock().await.field_sets.insert(set.id, set.clone());
        Ok(set)
    }

    async fn update_field_set(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if let Some(set) = state.field_sets.get_mut(&id) {
            set.name = name.to_string();
            set.description = description.map(str::to_string);
        }
        Ok(())
    }

    async fn delete_field_set(&self, id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.field_sets.remove(&id);
        let field_ids: Vec<Uuid> = state
            .fields
            .values()
            .filter(|f| f.field_set_id == id)
            .map(|f| f.id)
            .collect();
        for field_id in field_ids {
            state.fields.remove(&field_id);
            state.values.retain(|&(_, _, fid), _| fid != field_id);
        }
        state.assignments.retain(|&(_, set_id), _| set_id != id);
        Ok(())
    }

    async fn field(&self, id: Uuid) -> Result<Option<FieldDefinition>, StoreError> {
        Ok(self.state.lock().await.fields.get(&id).cloned())
    }

    async fn fields_for_set(&self, field_set_id: Uuid) -> Result<Vec<FieldDefinition>, StoreError> {
        let state = self.state.lock().await;
        let mut fields: Vec<FieldDefinition> = state
            .fields
            .values()
            .filter(|f| f.field_set_id == field_set_id)
            .cloned()
            .collect();
        fields.sort_by_key(|f| f.order_index);
        Ok(fields)
    }

    async fn max_order_index(&self, field_set_id: Uuid) -> Result<Option<i32>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .fields
            .values()
            .filter(|f| f.field_set_id == field_set_id)
            .map(|f| f.order_index)
            .max())
    }

    async fn insert_field(
        &self,
        field: NewField,
        order_index: i32,
    ) -> Result<FieldDefinition, StoreError> {
        let row = FieldDefinition {
            id: Uuid::new_v4(),
            field_set_id: field.field_set_id,
            key: field.key,
            label: field.label,
            field_type: field.field_type,
            required: field.required,
            options: field.options,
            half_width: field.half_width,
            order_index,
            created_at: Utc::now(),
        };
        self.state.lock().await.fields.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_field(&self, id: Uuid, patch: FieldPatch) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if let Some(field) = state.fields.get_mut(&id) {
            field.key = patch.key;
            field.label = patch.label;
            field.field_type = patch.field_type;
            field.required = patch.required;
            field.options = patch.options;
            field.half_width = patch.half_width;
        }
        Ok(())
    }

    async fn delete_field(&self, id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.fields.remove(&id);
        state.values.retain(|&(_, _, fid), _| fid != id);
        Ok(())
    }

    async fn set_field_orders(
        &self,
        field_set_id: Uuid,
        orders: &[(Uuid, i32)],
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        for &(field_id, order_index) in orders {
            if let Some(field) = state.fields.get_mut(&field_id) {
                if field.field_set_id == field_set_id {
                    field.order_index = order_index;
                }
            }
        }
        Ok(())
    }

    async fn insert_field_at(
        &self,
        field: NewField,
        order_index: i32,
    ) -> Result<FieldDefinition, StoreError> {
        let mut state = self.state.lock().await;
        for existing in state.fields.values_mut() {
            if existing.field_set_id == field.field_set_id && existing.order_index >= order_index {
                existing.order_index += 1;
            }
        }
        let row = FieldDefinition {
            id: Uuid::new_v4(),
            field_set_id: field.field_set_id,
            key: field.key,
            label: field.label,
            field_type: field.field_type,
            required: field.required,
            options: field.options,
            half_width: field.half_width,
            order_index,
            created_at: Utc::now(),
        };
        state.fields.insert(row.id, row.clone());
        Ok(row)
    }

    async fn upsert_assignment(
        &self,
        course_id: Uuid,
        field_set_id: Uuid,
        active: bool,
    ) -> Result<(), StoreError> {
        self.state
            .lock()
            .await
            .assignments
            .insert((course_id, field_set_id), active);
        Ok(())
    }

    async fn delete_assignment(
        &self,
        course_id: Uuid,
        field_set_id: Uuid,
    ) -> Result<(), StoreError> {
        self.state
            .lock()
            .await
            .assignments
            .remove(&(course_id, field_set_id));
        Ok(())
    }

    async fn assigned_courses(&self, field_set_id: Uuid) -> Result<Vec<AssignedCourse>, StoreError> {
        let state = self.state.lock().await;
        let mut assigned = Vec::new();
        for (&(course_id, set_id), &active) in &state.assignments {
            if set_id != field_set_id || !active {
                continue;
            }
            if let Some(course) = state.courses.get(&course_id) {
                assigned.push(AssignedCourse {
                    course_id,
                    title: course.title.clone(),
                    course_code: course.course_code.clone(),
                });
            }
        }
        Ok(assigned)
    }

    async fn active_fields_for_course(
        &self,
        course_id: Uuid,
    ) -> Result<Vec<FieldDefinition>, StoreError> {
        let state = self.state.lock().await;
        let active_sets: Vec<Uuid> = state
            .assignments
            .iter()
            .filter(|(&(cid, _), &active)| cid == course_id && active)
            .map(|(&(_, set_id), _)| set_id)
            .collect();
        let mut fields: Vec<FieldDefinition> = state
            .fields
            .values()
            .filter(|f| active_sets.contains(&f.field_set_id))
            .cloned()
            .collect();
        fields.sort_by_key(|f| (f.field_set_id, f.order_index));
        Ok(fields)
    }

    async fn upsert_value(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        field_id: Uuid,
        value: &Value,
    ) -> Result<(), StoreError> {
        self.state.lock().await.values.insert(
            (student_id, course_id, field_id),
            FieldValue {
                student_id,
                course_id,
                field_id,
                value: value.clone(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn field_value(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        field_id: Uuid,
    ) -> Result<Option<FieldValue>, StoreError> {
        Ok(self
            .state
            .lock()
            .await
            .values
            .get(&(student_id, course_id, field_id))
            .cloned())
    }

    async fn ensure_enrollment(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<(), StoreError> {
        self.state
            .lock()
            .await
            .enrollments
            .entry((student_id, course_id))
            .or_insert_with(|| "pending".to_string());
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
