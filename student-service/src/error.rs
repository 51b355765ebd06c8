use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use service_core::error::AppError;
use thiserror::Error;

/// Failures of the student endpoints.
///
/// The client-facing kinds are sent as HTTP 200 with the intended status
/// embedded in the body (`{"error": ..., "status_code": ...}`); existing
/// clients read `status_code` rather than the HTTP status line.
#[derive(Debug, Error)]
pub enum StudentError {
    #[error("Invalid ID")]
    InvalidId,

    #[error("Student not found")]
    NotFound,

    #[error("No students found for the applied filter")]
    NoMatches,

    #[error("No data passed")]
    EmptyUpdate,

    #[error(transparent)]
    App(#[from] AppError),
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub status_code: u16,
}

impl StudentError {
    /// Status code carried inside the envelope body.
    pub fn embedded_status(&self) -> StatusCode {
        match self {
            StudentError::InvalidId | StudentError::EmptyUpdate => StatusCode::BAD_REQUEST,
            StudentError::NotFound | StudentError::NoMatches => StatusCode::NOT_FOUND,
            StudentError::App(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StudentError {
    fn into_response(self) -> Response {
        if let StudentError::App(err) = self {
            return err.into_response();
        }

        let status = self.embedded_status();
        tracing::info!(error = %self, status_code = status.as_u16(), "Student request rejected");

        let envelope = ErrorEnvelope {
            error: self.to_string(),
            status_code: status.as_u16(),
        };
        (StatusCode::OK, Json(envelope)).into_response()
    }
}
