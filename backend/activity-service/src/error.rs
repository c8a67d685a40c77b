//! Error taxonomy for activity-service
//!
//! Every entry point (query adapters, the Kafka consumer) classifies failures
//! through [`ActivityError::kind`] so callers see the same kinds regardless of
//! which adapter triggered the call.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

pub type Result<T> = std::result::Result<T, ActivityError>;

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// Unparseable inbound message. Consumer-internal, never returned to query callers.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Closed set of failure kinds exposed to adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Storage,
    Decode,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Storage => "STORAGE_ERROR",
            ErrorKind::Decode => "DECODE_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::Validation | ErrorKind::Decode => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ActivityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActivityError::Validation(_) => ErrorKind::Validation,
            ActivityError::NotFound(_) => ErrorKind::NotFound,
            ActivityError::Storage(_) => ErrorKind::Storage,
            ActivityError::Decode(_) => ErrorKind::Decode,
        }
    }

    /// Message without the kind prefix added by `Display`.
    pub fn message(&self) -> &str {
        match self {
            ActivityError::Validation(msg)
            | ActivityError::NotFound(msg)
            | ActivityError::Storage(msg)
            | ActivityError::Decode(msg) => msg,
        }
    }

    /// Log the error at the level its kind deserves.
    ///
    /// Business failures are warnings, storage failures are errors.
    pub fn report(&self) {
        match self.kind() {
            ErrorKind::Validation => warn!(code = self.kind().code(), "Validation error: {}", self.message()),
            ErrorKind::NotFound => warn!(code = self.kind().code(), "Resource not found: {}", self.message()),
            ErrorKind::Decode => warn!(code = self.kind().code(), "Poison message: {}", self.message()),
            ErrorKind::Storage => error!(code = self.kind().code(), "Storage error: {}", self.message()),
        }
    }
}

impl From<sqlx::Error> for ActivityError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ActivityError::NotFound("row not found".to_string()),
            other => ActivityError::Storage(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for ActivityError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        ActivityError::Storage(format!("migration failed: {}", err))
    }
}

impl From<serde_json::Error> for ActivityError {
    fn from(err: serde_json::Error) -> Self {
        ActivityError::Decode(err.to_string())
    }
}

/// Structured error body handed to adapters.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub code: &'static str,
    pub status: u16,
    pub message: String,
}

impl From<&ActivityError> for ErrorResponse {
    fn from(err: &ActivityError) -> Self {
        let kind = err.kind();
        Self {
            kind,
            code: kind.code(),
            status: kind.status_code().as_u16(),
            message: err.message().to_string(),
        }
    }
}

impl ResponseError for ActivityError {
    fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::from(self))
    }
}
