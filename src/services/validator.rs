//! Pure validation and coercion of raw submitted values against field
//! definitions. No I/O: callers resolve definitions and persist results.

use serde_json::Value;
use uuid::Uuid;

use crate::database::models::{FieldDefinition, FieldType};
use crate::error::ApiError;

/// Outcome of validating one raw value.
#[derive(Debug, Clone, PartialEq)]
pub enum Validated {
    /// No value to store: the field is a section title, or an optional
    /// field was left empty.
    Skip,
    Value(Value),
}

/// Validate a single raw form value against its field definition.
///
/// `raw` is the value exactly as submitted; `None` and whitespace-only input
/// are both treated as empty.
pub fn validate_value(field: &FieldDefinition, raw: Option<&str>) -> Result<Validated, ApiError> {
    // Section titles never carry user input.
    if field.field_type == FieldType::SectionTitle {
        return Ok(Validated::Skip);
    }

    let raw = match raw {
        Some(r) if !r.trim().is_empty() => r,
        _ => {
            if field.required {
                return Err(ApiError::validation(format!(
                    "Missing required field: {}",
                    field.label
                )));
            }
            return Ok(Validated::Skip);
        }
    };

    let value = match field.field_type {
        FieldType::Number => {
            let n: f64 = raw.trim().parse().map_err(|_| {
                ApiError::validation(format!("{} must be a number", field.label))
            })?;
            let n = serde_json::Number::from_f64(n).ok_or_else(|| {
                ApiError::validation(format!("{} must be a number", field.label))
            })?;
            Value::Number(n)
        }
        FieldType::Boolean => Value::Bool(raw == "true"),
        // kept as submitted; calendar validation is the client's concern
        FieldType::Date => Value::String(raw.to_string()),
        FieldType::Multiselect => {
            let parsed: Value = serde_json::from_str(raw).map_err(|_| {
                ApiError::validation(format!("{} must be an array", field.label))
            })?;
            let items = parsed.as_array().ok_or_else(|| {
                ApiError::validation(format!("{} must be an array", field.label))
            })?;
            let all_valid = items.iter().all(|item| {
                item.as_str()
                    .map(|s| field.options.iter().any(|opt| opt == s))
                    .unwrap_or(false)
            });
            if !all_valid {
                return Err(ApiError::validation(format!(
                    "{} has invalid selection(s)",
                    field.label
                )));
            }
            parsed
        }
        FieldType::Select => {
            if !field.options.iter().any(|opt| opt == raw) {
                return Err(ApiError::validation(format!(
                    "{} must be one of the provided options",
                    field.label
                )));
            }
            Value::String(raw.to_string())
        }
        // text, textarea, email, phone: raw string as-is
        _ => Value::String(raw.to_string()),
    };

    Ok(Validated::Value(value))
}

/// Validate a batch of fields against a form, in the given (order_index)
/// order, short-circuiting on the first failure. Returns the (field id,
/// typed value) pairs to persist; skipped fields produce no pair.
pub fn validate_batch<'a, F>(
    fields: &[FieldDefinition],
    raw_for: F,
) -> Result<Vec<(Uuid, Value)>, ApiError>
where
    F: Fn(&FieldDefinition) -> Option<&'a str>,
{
    let mut validated = Vec::new();
    for field in fields {
        match validate_value(field, raw_for(field))? {
            Validated::Skip => {}
            Validated::Value(value) => validated.push((field.id, value)),
        }
    }
    Ok(validated)
}
