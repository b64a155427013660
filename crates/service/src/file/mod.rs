pub mod student_store;
