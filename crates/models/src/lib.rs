pub mod errors;
pub mod student;
