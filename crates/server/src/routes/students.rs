use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use models::student::{NewStudent, Student, StudentUpdate};
use service::students::store::StudentStore;

use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<dyn StudentStore>,
}

#[derive(Serialize)]
pub struct StudentResponse {
    pub message: &'static str,
    pub data: Student,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// List all student records in stored order.
pub async fn list_students(
    State(state): State<ServerState>,
) -> Result<Json<Vec<Student>>, JsonApiError> {
    let students = state.store.list().await?;
    info!(count = students.len(), "list students");
    Ok(Json(students))
}

/// Get a single student by id.
pub async fn get_student(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> Result<Json<Student>, JsonApiError> {
    match state.store.get(id).await? {
        Some(student) => Ok(Json(student)),
        None => Err(JsonApiError::not_found("Student not found")),
    }
}

/// Create a student from a full record body; `average` is derived.
pub async fn create_student(
    State(state): State<ServerState>,
    Json(input): Json<NewStudent>,
) -> Result<Json<StudentResponse>, JsonApiError> {
    let created = state.store.create(input).await?;
    info!(id = created.id, "student created");
    Ok(Json(StudentResponse { message: "Student added successfully", data: created }))
}

/// Merge the supplied fields into an existing student.
pub async fn patch_student(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    Json(update): Json<StudentUpdate>,
) -> Result<Json<StudentResponse>, JsonApiError> {
    let updated = state.store.update(id, update).await?;
    info!(id, "student updated");
    Ok(Json(StudentResponse { message: "Student partially updated", data: updated }))
}

/// Delete a student by id.
pub async fn delete_student(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> Result<Json<MessageResponse>, JsonApiError> {
    if !state.store.delete(id).await? {
        return Err(JsonApiError::not_found("Student not found"));
    }
    info!(id, "student deleted");
    Ok(Json(MessageResponse { message: "Student deleted successfully" }))
}
