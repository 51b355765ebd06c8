//! Student CRUD handlers. Each one performs at most one store call.

use crate::dtos::{
    CreateStudentResponse, ListStudentsParams, StudentListResponse, StudentResponse,
    StudentSummary,
};
use crate::error::StudentError;
use crate::models::{parse_student_id, NewStudent};
use crate::services::{StudentFilter, LIST_LIMIT};
use crate::startup::AppState;
use crate::utils::{PatchBody, ValidatedJson, ValidatedQuery};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

fn student_id(raw: &str) -> Result<ObjectId, StudentError> {
    parse_student_id(raw).ok_or(StudentError::InvalidId)
}

#[tracing::instrument(skip(state, student), fields(name = %student.name))]
pub async fn create_student(
    State(state): State<AppState>,
    ValidatedJson(student): ValidatedJson<NewStudent>,
) -> Result<(StatusCode, Json<CreateStudentResponse>), StudentError> {
    let id = state.store.insert(&student).await?;

    metrics::counter!("students_created_total").increment(1);
    tracing::info!(student_id = %id, "Student created");

    Ok((
        StatusCode::CREATED,
        Json(CreateStudentResponse { id: id.to_hex() }),
    ))
}

#[tracing::instrument(skip(state))]
pub async fn list_students(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<ListStudentsParams>,
) -> Result<Json<StudentListResponse>, StudentError> {
    let filter = StudentFilter::from(params);
    let documents = state.store.find(&filter, LIST_LIMIT).await?;

    if documents.is_empty() {
        return Err(StudentError::NoMatches);
    }

    let data = documents
        .into_iter()
        .map(StudentSummary::try_from)
        .collect::<Result<Vec<_>, AppError>>()?;

    tracing::debug!(count = data.len(), "Students listed");
    Ok(Json(StudentListResponse { data }))
}

#[tracing::instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StudentResponse>, StudentError> {
    let id = student_id(&id)?;

    let document = state
        .store
        .find_by_id(id)
        .await?
        .ok_or(StudentError::NotFound)?;

    Ok(Json(StudentResponse::try_from(document)?))
}

/// Merge-patches arbitrary fields into one student.
#[tracing::instrument(skip(state, patch))]
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    patch: PatchBody,
) -> Result<StatusCode, StudentError> {
    let id = student_id(&id)?;

    if patch.0.is_empty() {
        return Err(StudentError::EmptyUpdate);
    }

    let matched = state.store.update(id, patch.to_document()).await?;
    if matched == 0 {
        return Err(StudentError::NotFound);
    }

    metrics::counter!("students_updated_total").increment(1);
    tracing::info!(student_id = %id, fields = patch.0.len(), "Student updated");
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StudentError> {
    let id = student_id(&id)?;

    let deleted = state.store.delete(id).await?;
    if deleted == 0 {
        return Err(StudentError::NotFound);
    }

    metrics::counter!("students_deleted_total").increment(1);
    tracing::info!(student_id = %id, "Student deleted");
    Ok(StatusCode::OK)
}
