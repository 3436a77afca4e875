//! Error types for tick
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, missing vault, unknown task id)
//! - 4: Operation failed (I/O error, line rewrite out of bounds)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the tick CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for tick operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Vault directory not found: {0}")]
    VaultNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid priority '{0}', expected p1..p4 or none")]
    InvalidPriority(String),

    // Operation failures (exit code 4)
    #[error("Line {line} is out of bounds for {path} ({line_count} lines)")]
    LineOutOfBounds {
        path: PathBuf,
        line: usize,
        line_count: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::VaultNotFound(_)
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::TaskNotFound(_)
            | Error::InvalidDate(_)
            | Error::InvalidPriority(_) => exit_codes::USER_ERROR,

            // Operation failures
            Error::LineOutOfBounds { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for the JSON error envelope, where they exist
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::LineOutOfBounds {
                path,
                line,
                line_count,
            } => Some(serde_json::json!({
                "path": path.display().to_string(),
                "line": line,
                "line_count": line_count,
            })),
            _ => None,
        }
    }
}

/// Result type alias for tick operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
