use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures of the storage layer.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Database connection failed: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Forbidden: Insufficient permissions")]
    Forbidden,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Professor not found")]
    ProfessorNotFound,

    #[error("Slot not available")]
    SlotUnavailable,

    #[error("You already have an appointment at this time")]
    DuplicateBooking,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("Storage failure: {0}")]
    Backend(BackendError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::DuplicateUsername => AppError::DuplicateUsername,
            other => AppError::Backend(other),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidToken | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::InvalidInput(_)
            | AppError::DuplicateUsername
            | AppError::SlotUnavailable
            | AppError::DuplicateBooking => StatusCode::BAD_REQUEST,
            AppError::ProfessorNotFound | AppError::AppointmentNotFound => StatusCode::NOT_FOUND,
            AppError::Backend(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Backend(_) | AppError::Internal(_) => {
                error!(err = %self, "Request failed");
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
