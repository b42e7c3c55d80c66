pub mod assignment;
pub mod course;
pub mod field;
pub mod field_set;
pub mod profile;
pub mod value;

pub use assignment::AssignedCourse;
pub use course::Course;
pub use field::{derive_key, parse_options, FieldDefinition, FieldType};
pub use field_set::FieldSet;
pub use profile::{Profile, Role};
pub use value::FieldValue;
