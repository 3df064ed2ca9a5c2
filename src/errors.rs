use std::fmt;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::models::domain::GenerationStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtractionErrorKind {
    InvalidUrl,
    Unreachable,
    Blocked,
    Empty,
}

impl fmt::Display for ExtractionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionErrorKind::InvalidUrl => write!(f, "invalid URL"),
            ExtractionErrorKind::Unreachable => write!(f, "source unreachable"),
            ExtractionErrorKind::Blocked => write!(f, "URL blocked"),
            ExtractionErrorKind::Empty => write!(f, "no usable content"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct ExtractionError {
    pub kind: ExtractionErrorKind,
    pub message: String,
}

impl ExtractionError {
    pub fn new(kind: ExtractionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::InvalidUrl, message)
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::Unreachable, message)
    }

    pub fn blocked(message: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::Blocked, message)
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::Empty, message)
    }
}

/// A stage exhausted its attempts. `last_raw_output` keeps whatever the
/// model said on the final attempt for diagnosis.
#[derive(Debug, Clone, Error)]
#[error("{stage} stage failed: {reason}")]
pub struct GenerationError {
    pub stage: GenerationStage,
    pub reason: String,
    pub last_raw_output: Option<String>,
}

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("A quiz already exists for {0}")]
    DuplicateUrl(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Extraction(e) => match e.kind {
                ExtractionErrorKind::InvalidUrl => "INVALID_URL",
                ExtractionErrorKind::Unreachable => "SOURCE_UNREACHABLE",
                ExtractionErrorKind::Blocked => "URL_BLOCKED",
                ExtractionErrorKind::Empty => "CONTENT_TOO_SHORT",
            },
            AppError::Generation(_) => "LLM_GENERATION_FAILED",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::DuplicateUrl(_) => "DUPLICATE_URL",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::PersistenceError(_) => "PERSISTENCE_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    pub status: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Extraction(e) => match e.kind {
                ExtractionErrorKind::InvalidUrl | ExtractionErrorKind::Blocked => {
                    StatusCode::BAD_REQUEST
                }
                ExtractionErrorKind::Empty => StatusCode::UNPROCESSABLE_ENTITY,
                ExtractionErrorKind::Unreachable => StatusCode::BAD_GATEWAY,
            },
            AppError::Generation(_) => StatusCode::BAD_GATEWAY,
            AppError::ValidationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateUrl(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PersistenceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: self.error_code(),
            status: self.status_code().as_u16(),
        })
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::PersistenceError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
