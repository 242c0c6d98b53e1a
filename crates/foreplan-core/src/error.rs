//! Core error types for foreplan-core.
//!
//! This module defines the error hierarchy using thiserror: one enum per
//! concern (validation, database, integration, configuration) rolled up
//! into a single [`CoreError`] for callers that do not care which layer
//! failed.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Core error type for foreplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Integration-related errors
    #[error("Integration error: {0}")]
    Integration(#[from] IntegrationError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Validation errors raised while building or mutating the project model.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Three-point estimate out of order
    #[error(
        "Invalid estimate: expected optimistic <= most_likely <= pessimistic, \
         got {optimistic}/{most_likely}/{pessimistic}"
    )]
    EstimateOrder {
        optimistic: u32,
        most_likely: u32,
        pessimistic: u32,
    },

    /// Negative or non-finite monetary amount
    #[error("Invalid amount for '{field}': {value} (must be finite and >= 0)")]
    InvalidAmount { field: String, value: f64 },

    /// Two tasks share a name
    #[error("Duplicate task name: '{name}'")]
    DuplicateTask { name: String },

    /// Dependency missing from the list or not scheduled earlier
    #[error(
        "Task '{task}' depends on '{dependency}', which is missing or does not \
         precede it"
    )]
    InvalidDependency { task: String, dependency: String },

    /// Referenced task does not exist
    #[error("Unknown task: '{name}'")]
    UnknownTask { name: String },

    /// Referenced developer does not exist
    #[error("Unknown developer: {id}")]
    UnknownDeveloper { id: Uuid },

    /// Completion recorded on a task that never started
    #[error("Task '{name}' cannot complete before it is started")]
    TaskNotStarted { name: String },

    /// Completion date precedes the start date
    #[error("Task '{name}' completion date precedes its start date")]
    CompletionBeforeStart { name: String },

    /// Time frame must cover at least one day
    #[error("Project time frame must be at least 1 day")]
    InvalidTimeFrame,

    /// Coverage ratio outside [0, 1]
    #[error("Invalid coverage ratio: {value} (must be within 0..=1)")]
    InvalidCoverage { value: f64 },

    /// Repository reference that is neither `owner/repo` nor a GitHub URL
    #[error("Invalid GitHub repository reference: '{value}'")]
    InvalidRepo { value: String },
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Stored document failed to round-trip
    #[error("Corrupt stored record for {what}: {message}")]
    CorruptRecord { what: String, message: String },

    /// Lookup missed
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Errors from external service clients.
#[derive(Error, Debug)]
pub enum IntegrationError {
    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("GitHub API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// OS keyring access failed
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// Operation requires a stored token
    #[error("No GitHub token stored; run auth login first")]
    MissingToken,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read or write the config file
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("Failed to serialize configuration: {0}")]
    Format(#[from] toml::ser::Error),
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(DatabaseError::from(err))
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
