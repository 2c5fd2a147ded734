//! Error types for susmeter.
//!
//! This module defines all error types used throughout the susmeter crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The main error type for susmeter operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Submission Errors ===
    /// A survey answer was missing, malformed or out of range.
    #[error("invalid answer for {question}: {reason}")]
    InvalidResponse {
        /// Question key, e.g. `q3`.
        question: String,
        /// Description of what is wrong with the answer.
        reason: String,
    },

    // === History Errors ===
    /// No evaluation results have been recorded yet.
    #[error("No results available yet. Please complete the SUS evaluation first.")]
    NoData,

    /// The stored history file exists but could not be parsed.
    #[error("result history at {path} is corrupt: {source}")]
    CorruptHistory {
        /// Path to the history file.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Another writer held the history lock for too long.
    #[error("timed out after {waited:?} waiting for lock {path}")]
    LockTimeout {
        /// Path to the lock file.
        path: PathBuf,
        /// How long we waited before giving up.
        waited: Duration,
    },

    /// The evaluation was stored but the CSV export copy could not be rewritten.
    #[error("evaluation was recorded, but the CSV export at {path} could not be refreshed: {source}")]
    MirrorRefresh {
        /// Path to the CSV export.
        path: PathBuf,
        /// Why the rewrite failed.
        #[source]
        source: Box<Error>,
    },

    /// The requested export encoding is not supported.
    #[error("unsupported export format '{0}' (expected json, csv or excel)")]
    UnsupportedFormat(String),

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// The database carries a schema version this build cannot use.
    #[error("unsupported database schema: {message}")]
    SchemaVersion {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for susmeter operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new invalid response error.
    #[must_use]
    pub fn invalid_response(question: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            question: question.into(),
            reason: reason.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means the history is empty.
    #[must_use]
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }

    /// Check if this error was caused by a rejected submission.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::InvalidResponse { .. })
    }
}
