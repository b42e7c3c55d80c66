pub mod courses;
pub mod field_items;
pub mod fields;
pub mod intake;
