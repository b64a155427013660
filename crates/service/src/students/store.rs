use async_trait::async_trait;
use models::student::{NewStudent, Student, StudentUpdate};

use crate::errors::ServiceError;

/// Trait abstraction for student record storage.
/// Implementations can be file-backed, database-backed, or remote.
#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Student>, ServiceError>;
    async fn get(&self, id: u64) -> Result<Option<Student>, ServiceError>;
    async fn create(&self, input: NewStudent) -> Result<Student, ServiceError>;
    async fn update(&self, id: u64, update: StudentUpdate) -> Result<Student, ServiceError>;
    async fn delete(&self, id: u64) -> Result<bool, ServiceError>;
}
