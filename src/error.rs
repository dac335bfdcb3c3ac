use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::workflow::WorkflowError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Certificate rendering failed: {0}")]
    Certificate(String),
}

impl AppError {
    /// Maps a failed write, turning a unique violation that raced past the
    /// guards into `AlreadyExists`.
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return AppError::Workflow(WorkflowError::AlreadyExists);
            }
        }
        AppError::Database(err)
    }

    pub fn status(&self) -> StatusCode {
        let err = match self {
            AppError::Workflow(err) => *err,
            AppError::Database(_) | AppError::Certificate(_) => {
                return StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        match err {
            WorkflowError::NotFound => StatusCode::NOT_FOUND,
            WorkflowError::Unauthenticated => StatusCode::UNAUTHORIZED,
            WorkflowError::AlreadyChair
            | WorkflowError::AlreadyMember
            | WorkflowError::AlreadyBid
            | WorkflowError::AlreadyAssigned
            | WorkflowError::AlreadyEvaluated
            | WorkflowError::AlreadyExists
            | WorkflowError::AlreadyRegistered
            | WorkflowError::HasSection => StatusCode::CONFLICT,
            WorkflowError::InvalidDates
            | WorkflowError::InvalidWebsite
            | WorkflowError::InvalidGrade
            | WorkflowError::InvalidField
            | WorkflowError::DateNotAdvanced => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Workflow(err) => serde_json::json!({
                "status": "error",
                "code": err.code(),
                "message": err.to_string(),
            }),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                serde_json::json!({
                    "status": "error",
                    "code": "Internal",
                    "message": "Database error.",
                })
            }
            AppError::Certificate(e) => {
                tracing::error!("Certificate rendering failed: {}", e);
                serde_json::json!({
                    "status": "error",
                    "code": "Internal",
                    "message": "Could not render the certificate.",
                })
            }
        };
        (status, Json(body)).into_response()
    }
}
