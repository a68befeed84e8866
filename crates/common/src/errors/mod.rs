//! Error types for Medicast services
//!
//! Provides:
//! - Distinct error types for local validation and remote-call failures
//! - HTTP status code mapping
//! - Structured `{success: false, code, error}` responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    MissingParameters,
    IndexOutOfRange,
    MissingDoi,

    // Local storage errors (2xxx)
    LocalFileError,
    EmptyFile,

    // Resource errors (4xxx)
    NoPapersFound,
    PodcastNotFound,

    // External service errors (8xxx)
    ExtractionError,
    CompletionError,
    SynthesisError,
    StorageError,
    MalformedResponse,
    MissingCredential,

    // Internal errors (9xxx)
    InternalError,
    GenerationFailed,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::MissingParameters => 1002,
            ErrorCode::IndexOutOfRange => 1003,
            ErrorCode::MissingDoi => 1004,

            ErrorCode::LocalFileError => 2001,
            ErrorCode::EmptyFile => 2002,

            ErrorCode::NoPapersFound => 4001,
            ErrorCode::PodcastNotFound => 4002,

            ErrorCode::ExtractionError => 8002,
            ErrorCode::CompletionError => 8003,
            ErrorCode::SynthesisError => 8004,
            ErrorCode::StorageError => 8005,
            ErrorCode::MalformedResponse => 8006,
            ErrorCode::MissingCredential => 8007,

            ErrorCode::InternalError => 9001,
            ErrorCode::GenerationFailed => 9002,
            ErrorCode::SerializationError => 9004,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("{message}")]
    MissingParameters { message: String },

    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Paper index {index} is out of range")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No DOI found for paper '{title}'")]
    MissingDoi { title: String },

    // Local storage errors
    #[error("Failed to load {file}: {reason}")]
    LocalFile { file: String, reason: String },

    #[error("File '{file}' is empty")]
    EmptyFile { file: String },

    // Resource errors
    #[error("No papers found{}", .source_name.as_ref().map(|s| format!(" in {}", s)).unwrap_or_default())]
    NoPapersFound { source_name: Option<String> },

    #[error("Podcast not found")]
    PodcastNotFound { id: String },

    // External service errors
    #[error("{name} environment variable not set")]
    MissingCredential { name: &'static str },

    #[error("Extraction service error: {message}")]
    Extraction { message: String },

    #[error("Completion service error: {message}")]
    Completion { message: String },

    #[error("Speech synthesis error: {message}")]
    Synthesis { message: String },

    #[error("Object storage error: {message}")]
    Storage { message: String },

    #[error("Malformed response from {service}: {message}")]
    MalformedResponse {
        service: &'static str,
        message: String,
    },

    // Internal errors
    #[error("{message}")]
    GenerationFailed { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::MissingParameters { .. } => ErrorCode::MissingParameters,
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::IndexOutOfRange { .. } => ErrorCode::IndexOutOfRange,
            AppError::MissingDoi { .. } => ErrorCode::MissingDoi,
            AppError::LocalFile { .. } => ErrorCode::LocalFileError,
            AppError::EmptyFile { .. } => ErrorCode::EmptyFile,
            AppError::NoPapersFound { .. } => ErrorCode::NoPapersFound,
            AppError::PodcastNotFound { .. } => ErrorCode::PodcastNotFound,
            AppError::MissingCredential { .. } => ErrorCode::MissingCredential,
            AppError::Extraction { .. } => ErrorCode::ExtractionError,
            AppError::Completion { .. } => ErrorCode::CompletionError,
            AppError::Synthesis { .. } => ErrorCode::SynthesisError,
            AppError::Storage { .. } => ErrorCode::StorageError,
            AppError::MalformedResponse { .. } => ErrorCode::MalformedResponse,
            AppError::GenerationFailed { .. } => ErrorCode::GenerationFailed,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::MissingParameters { .. } |
            AppError::Validation { .. } |
            AppError::IndexOutOfRange { .. } |
            AppError::MissingDoi { .. } => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::NoPapersFound { .. } |
            AppError::PodcastNotFound { .. } => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            AppError::LocalFile { .. } |
            AppError::EmptyFile { .. } |
            AppError::MissingCredential { .. } |
            AppError::GenerationFailed { .. } |
            AppError::Internal { .. } |
            AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::Extraction { .. } |
            AppError::Completion { .. } |
            AppError::Synthesis { .. } |
            AppError::Storage { .. } |
            AppError::MalformedResponse { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error body, shared with the failure arm of `Outcome`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: ErrorCode,
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let body = ErrorResponse {
            success: false,
            code,
            error: message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}
