pub mod assignments;
pub mod field_sets;
pub mod fields;
pub mod intake;
pub mod validator;

pub use assignments::AssignmentService;
pub use field_sets::FieldSetService;
pub use fields::FieldService;
pub use intake::IntakeService;
