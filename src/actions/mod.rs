//! Typed action registry for the form-action boundary.
//!
//! Incoming requests are flat key/value form payloads plus an action name.
//! Everything is parsed up front into a tagged request enum; handlers and
//! services never do runtime property lookup on raw maps.

use std::collections::HashMap;

use uuid::Uuid;

use crate::database::models::{parse_options, FieldType};
use crate::error::ApiError;

/// A flat form payload. Identifier and label lookups trim their input the
/// way the original form handling did; raw value lookups do not, since
/// trailing whitespace can be meaningful in submitted values.
#[derive(Debug, Default, Clone)]
pub struct FormPayload {
    inner: HashMap<String, String>,
}

impl FormPayload {
    pub fn new(inner: HashMap<String, String>) -> Self {
        Self { inner }
    }

    /// Trimmed value, or the empty string when absent.
    pub fn trimmed(&self, key: &str) -> &str {
        self.inner.get(key).map(|v| v.trim()).unwrap_or("")
    }

    /// The value exactly as submitted.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    /// Checkbox-style flag: present as "on" (HTML checkbox) or "true".
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.trimmed(key), "on" | "true")
    }

    /// Trimmed value, or None when empty (stored as NULL).
    pub fn optional(&self, key: &str) -> Option<String> {
        let v = self.trimmed(key);
        if v.is_empty() {
            None
        } else {
            Some(v.to_string())
        }
    }

    /// Parse a required UUID field; `missing` is the error when the field
    /// is absent or blank.
    pub fn uuid(&self, key: &str, missing: &str) -> Result<Uuid, ApiError> {
        let v = self.trimmed(key);
        if v.is_empty() {
            return Err(ApiError::validation(missing));
        }
        Uuid::parse_str(v).map_err(|_| ApiError::validation(format!("Invalid {}", key)))
    }
}

/// Validated column values for a create_field / update_field submission.
/// Section titles never take input, so `required` and `half_width` are
/// forced off for them here, before anything reaches storage.
#[derive(Debug, Clone)]
pub struct FieldInput {
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub options: Vec<String>,
    pub half_width: bool,
}

impl FieldInput {
    pub fn from_form(form: &FormPayload) -> Result<Self, ApiError> {
        let label = form.trimmed("name");
        let type_raw = form.trimmed("type");

        if label.is_empty() || type_raw.is_empty() {
            return Err(ApiError::validation("Name and type are required"));
        }

        let field_type = FieldType::parse(type_raw)
            .ok_or_else(|| ApiError::validation("Invalid field type"))?;

        let options = if field_type.needs_options() {
            let parsed = parse_options(form.trimmed("options"));
            if parsed.is_empty() {
                return Err(ApiError::validation("Options are required for select fields"));
            }
            parsed
        } else {
            Vec::new()
        };

        let section = field_type == FieldType::SectionTitle;
        Ok(Self {
            label: label.to_string(),
            field_type,
            required: !section && form.flag("required"),
            options,
            half_width: !section && form.flag("half_width"),
        })
    }
}

/// Actions on field sets and their course assignments.
#[derive(Debug, Clone)]
pub enum SetAction {
    ListSets,
    CreateSet {
        name: String,
        description: Option<String>,
    },
    UpdateSet {
        id: Uuid,
        name: String,
        description: Option<String>,
    },
    DeleteSet {
        id: Uuid,
    },
    AssignToCourse {
        field_set_id: Uuid,
        course_id: Uuid,
    },
    UnassignFromCourse {
        field_set_id: Uuid,
        course_id: Uuid,
    },
    GetCourseAssignments {
        field_set_id: Uuid,
    },
}

impl SetAction {
    pub fn parse(action: &str, form: &FormPayload) -> Result<Self, ApiError> {
        match action {
            "list_sets" => Ok(Self::ListSets),
            "create_set" => {
                let name = form.trimmed("name");
                if name.is_empty() {
                    return Err(ApiError::validation("Name is required"));
                }
                Ok(Self::CreateSet {
                    name: name.to_string(),
                    description: form.optional("description"),
                })
            }
            "update_set" => {
                let id = form.uuid("id", "Missing required fields")?;
                let name = form.trimmed("name");
                if name.is_empty() {
                    return Err(ApiError::validation("Missing required fields"));
                }
                Ok(Self::UpdateSet {
                    id,
                    name: name.to_string(),
                    description: form.optional("description"),
                })
            }
            "delete_set" => Ok(Self::DeleteSet {
                id: form.uuid("id", "Missing id")?,
            }),
            "assign_to_course" => Ok(Self::AssignToCourse {
                field_set_id: form.uuid("field_set_id", "Missing required fields")?,
                course_id: form.uuid("course_id", "Missing required fields")?,
            }),
            "unassign_from_course" => Ok(Self::UnassignFromCourse {
                field_set_id: form.uuid("field_set_id", "Missing required fields")?,
                course_id: form.uuid("course_id", "Missing required fields")?,
            }),
            "get_course_assignments" => Ok(Self::GetCourseAssignments {
                field_set_id: form.uuid("field_set_id", "Missing field set ID")?,
            }),
            other => Err(ApiError::validation(format!("Unknown action: {}", other))),
        }
    }
}

/// Actions on the fields of one field set (set id comes from the path).
#[derive(Debug, Clone)]
pub enum FieldAction {
    ListFields,
    CreateField {
        input: FieldInput,
    },
    UpdateField {
        field_id: Uuid,
        input: FieldInput,
    },
    DeleteField {
        field_id: Uuid,
    },
    UpdateFieldOrder {
        orders: Vec<(Uuid, i32)>,
    },
    DuplicateField {
        field_id: Uuid,
    },
}

impl FieldAction {
    pub fn parse(action: &str, form: &FormPayload) -> Result<Self, ApiError> {
        match action {
            "list_fields" => Ok(Self::ListFields),
            "create_field" => Ok(Self::CreateField {
                input: FieldInput::from_form(form)?,
            }),
            "update_field" => Ok(Self::UpdateField {
                field_id: form.uuid("field_id", "Missing required fields")?,
                input: FieldInput::from_form(form)?,
            }),
            "delete_field" => Ok(Self::DeleteField {
                field_id: form.uuid("field_id", "Missing field ID")?,
            }),
            "update_field_order" => Ok(Self::UpdateFieldOrder {
                orders: parse_field_orders(form.trimmed("field_orders"))?,
            }),
            "duplicate_field" => Ok(Self::DuplicateField {
                field_id: form.uuid("field_id", "Missing field ID")?,
            }),
            other => Err(ApiError::validation(format!("Unknown action: {}", other))),
        }
    }
}

/// Parse the serialized `field_orders` list: a JSON array of
/// `{"id": <uuid>, "order_index": <int>}` objects. Entries with a malformed
/// id or a non-integer index are silently skipped; only a payload that is
/// not a JSON array at all fails the action.
fn parse_field_orders(raw: &str) -> Result<Vec<(Uuid, i32)>, ApiError> {
    let parsed: serde_json::Value = serde_json::from_str(raw)
        .map_err(|_| ApiError::validation("field_orders must be a JSON array"))?;
    let entries = parsed
        .as_array()
        .ok_or_else(|| ApiError::validation("field_orders must be a JSON array"))?;

    let mut orders = Vec::new();
    for entry in entries {
        let id = entry
            .get("id")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok());
        let order_index = entry
            .get("order_index")
            .and_then(|v| v.as_i64())
            .and_then(|n| i32::try_from(n).ok());
        if let (Some(id), Some(order_index)) = (id, order_index) {
            orders.push((id, order_index));
        }
    }
    Ok(orders)
}
