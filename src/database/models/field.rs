use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The recognized field types. Stored as snake_case text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Boolean,
    Date,
    Email,
    Phone,
    Select,
    Multiselect,
    SectionTitle,
}

impl FieldType {
    /// Parse the form-submitted type name. Returns None for anything
    /// outside the enum, which callers treat as a validation failure.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "textarea" => Some(Self::Textarea),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "date" => Some(Self::Date),
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            "select" => Some(Self::Select),
            "multiselect" => Some(Self::Multiselect),
            "section_title" => Some(Self::SectionTitle),
            _ => None,
        }
    }

    /// Select and multiselect fields must carry a non-empty option list.
    pub fn needs_options(self) -> bool {
        matches!(self, Self::Select | Self::Multiselect)
    }
}

/// One typed, ordered field within a field set.
///
/// `key` is derived from `label` (see [`derive_key`]) and recomputed on every
/// label change. `order_index` is unique within the set by construction and
/// defines display and validation order; deletion leaves gaps.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FieldDefinition {
    pub id: Uuid,
    pub field_set_id: Uuid,
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    /// Ordered option labels; non-empty exactly for select/multiselect.
    #[sqlx(json)]
    pub options: Vec<String>,
    pub half_width: bool,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

/// Derive the storage key for a label: lower-case it, then replace every
/// character outside `[a-z0-9]` with an underscore, one for one.
pub fn derive_key(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '_' })
        .collect()
}

/// Parse newline-separated option input: trim each line, drop empties,
/// preserve order. Duplicates are kept as submitted.
pub fn parse_options(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
