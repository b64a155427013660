//! Service layer providing business-oriented CRUD operations on top of models.
//! - Separates record semantics from file persistence.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod students;
pub mod file;
