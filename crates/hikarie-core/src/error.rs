//! Core error types for hikarie-core.
//!
//! Errors are grouped by the layer that raises them: check-in rejections
//! from the scoring engine, configuration and catalogue problems found at
//! startup, and storage failures from SQLite.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// Core error type for hikarie-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A check-in was rejected by the scoring engine
    #[error("Check-in rejected: {0}")]
    Scoring(#[from] ScoringError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Reasons a single check-in cannot be scored.
///
/// None of these are fatal: the caller decides how to answer the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    /// The user already has a check-in for this date
    #[error("{user_id} already checked in on {date}")]
    DuplicateCheckIn { user_id: String, date: NaiveDate },

    /// Time of day is malformed or outside the accepted window
    #[error("arrival time {time} is outside the valid window {window_start}-{window_end}")]
    InvalidTimestamp {
        time: NaiveTime,
        window_start: NaiveTime,
        window_end: NaiveTime,
    },

    /// The check-in predates the latest recorded one
    #[error("check-in on {date} is older than the last recorded check-in on {last}")]
    OutOfOrderCheckIn { date: NaiveDate, last: NaiveDate },

    /// The event belongs to a different user than the one being evaluated
    #[error("event for {event_user} cannot be evaluated for {user_id}")]
    UserMismatch { user_id: String, event_user: String },
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

    /// Stored data could not be decoded
    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },

    /// A uniqueness constraint rejected the write
    #[error("Constraint violated: {0}")]
    UniqueViolation(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// The badge catalogue is malformed
    #[error("Invalid badge catalogue: {0}")]
    InvalidCatalogue(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked
                    || code.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else if code.code == rusqlite::ErrorCode::ConstraintViolation {
                    DatabaseError::UniqueViolation(err.to_string())
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
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
