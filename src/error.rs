//! Error types for tasktrail
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad pattern, bad arguments, bad config)
//! - 3: Batch rejected (at least one task failed validation, nothing approved)
//! - 4: Operation failed (I/O, malformed input files)

use std::path::PathBuf;
use serde::Serialize;
use thiserror::Error;

use crate::batch::BatchError;
use crate::ladder::Subject;
use crate::pattern::ParseError;

/// Exit codes for the tasktrail CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const BATCH_REJECTED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for tasktrail operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid pattern: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(PathBuf),

    // Batch rejection (exit code 3)
    #[error("Validation failed for {} task(s); no tasks were modified", .0.task_count())]
    BatchRejected(BatchError),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::Parse(_)
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::SnapshotNotFound(_) => exit_codes::USER_ERROR,

            Error::BatchRejected(_) => exit_codes::BATCH_REJECTED,

            // Operation failures
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::WorkerPool(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for machine-readable error output.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::Parse(err) => Some(serde_json::json!({
                "message": err.message,
                "position": err.position,
            })),
            Error::InvalidConfig(message) | Error::InvalidArgument(message) => {
                Some(serde_json::json!({ "message": message }))
            }
            Error::SnapshotNotFound(path) => Some(serde_json::json!({
                "path": path.to_string_lossy(),
            })),
            Error::BatchRejected(batch) => serde_json::to_value(batch).ok(),
            _ => None,
        }
    }
}

impl From<BatchError> for Error {
    fn from(err: BatchError) -> Self {
        Error::BatchRejected(err)
    }
}

/// Why a single edit request was rejected. Collected per task, never raised
/// on its own.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("Task is on multiple boards ({}); specify --board", .boards.join(", "))]
    Ambiguous { boards: Vec<String> },

    #[error("Task is not on any board; specify --board")]
    NotOnAnyBoard,

    #[error("Board '{board}' not found")]
    UnknownBoard { board: String },

    #[error("Column '{column}' not found on board '{board}'. Available: {}", .choices.join(", "))]
    UnknownColumn {
        board: String,
        column: String,
        choices: Vec<String>,
    },

    #[error("Invalid {field} '{value}'. Valid values: {}", .choices.join(", "))]
    UnknownValue {
        field: Subject,
        value: String,
        choices: Vec<String>,
    },

    #[error("Task {task_id} not found")]
    UnknownTask { task_id: String },
}

impl ValidationError {
    pub fn is_ambiguity(&self) -> bool {
        matches!(self, ValidationError::Ambiguous { .. })
    }
}

/// Result type alias for tasktrail operations
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
