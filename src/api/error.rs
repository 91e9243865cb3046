use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use crate::store::StoreError;
use crate::tracker::AttendanceError;

/// Body of every rejected request under the API scope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = false)]
    pub success: bool,
    #[schema(example = "no_entry_yet")]
    pub kind: String,
    #[schema(example = "No entry has been registered today")]
    pub message: String,
}

impl ErrorBody {
    pub fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            kind: kind.to_string(),
            message: message.into(),
        }
    }
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::EmployeeNotFound => StatusCode::NOT_FOUND,
            AttendanceError::EmployeeInactive => StatusCode::FORBIDDEN,
            AttendanceError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // backend details stay in the logs
            AttendanceError::StoreUnavailable(_) => "Attendance store unavailable".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self.kind(), message))
    }
}

/// Errors of the admin endpoints, which talk to the stores directly.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Invalid(String),
    #[error("An employee with this document number already exists")]
    DuplicateDocument,
    #[error("Storage backend failure")]
    Store(#[from] StoreError),
}

impl ResponseError for AdminError {
    fn status_code(&self) -> StatusCode {
        match self {
            AdminError::NotFound(_) => StatusCode::NOT_FOUND,
            AdminError::Invalid(_) | AdminError::DuplicateDocument => StatusCode::BAD_REQUEST,
            AdminError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let kind = match self {
            AdminError::NotFound(_) => "not_found",
            AdminError::Invalid(_) => "invalid_request",
            AdminError::DuplicateDocument => "duplicate_document",
            AdminError::Store(_) => "store_unavailable",
        };
        HttpResponse::build(self.status_code()).json(ErrorBody::new(kind, self.to_string()))
    }
}
