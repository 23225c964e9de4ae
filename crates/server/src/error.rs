use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use services::services::{
    auth::AuthError, submission::SubmissionError, timesheet::TimesheetError,
};

/// Route-boundary error: every failure is rendered as `{"error": ...}` with
/// the mapped status. Database errors are logged and masked.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    fn internal(err: &sqlx::Error) -> Self {
        tracing::error!("database error: {err}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::Database(e) => Self::internal(e),
            AuthError::Unauthorized => Self::new(StatusCode::UNAUTHORIZED, err.to_string()),
            AuthError::Forbidden => Self::new(StatusCode::FORBIDDEN, err.to_string()),
            AuthError::NotFound => Self::new(StatusCode::NOT_FOUND, err.to_string()),
        }
    }
}

impl From<TimesheetError> for ApiError {
    fn from(err: TimesheetError) -> Self {
        match err {
            TimesheetError::Database(e) => Self::internal(&e),
            TimesheetError::Auth(e) => e.into(),
            TimesheetError::InvalidRange(_) | TimesheetError::MissingFreelancerParam => {
                Self::bad_request(err.to_string())
            }
            TimesheetError::EntryNotFound => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            TimesheetError::EntryLocked => Self::new(StatusCode::CONFLICT, err.to_string()),
        }
    }
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Database(e) => Self::internal(&e),
            SubmissionError::Auth(e) => e.into(),
            SubmissionError::AlreadySubmitted => Self::new(StatusCode::CONFLICT, err.to_string()),
            SubmissionError::NoEntries
            | SubmissionError::ZeroHours
            | SubmissionError::InvalidWindow => Self::bad_request(err.to_string()),
        }
    }
}
