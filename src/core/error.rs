//! # Errors
//!
//! `RpaError` is the one error type of the crate. Logging calls never return
//! it; it comes out of settings loading, logger construction, explicit
//! queries and workflow steps.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Serialize)]
pub enum RpaError {
    /// Error related to configuration loading or merging.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The log directory could not be created. No logging is possible at all.
    #[error("Cannot create log directory {path}: {reason}")]
    LogDirectoryError {
        /// The directory that was requested.
        path: String,
        /// The underlying I/O failure.
        reason: String,
    },

    /// Connection, probe or query failure reported by the database driver.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Database integration is switched off because credentials are missing.
    #[error("Database integration is disabled in settings")]
    DatabaseDisabled,

    /// An operation needed a live connection and none could be established.
    #[error("No database connection available")]
    NotConnected,

    /// A workflow step failed.
    #[error("Workflow step '{step}' failed: {reason}")]
    WorkflowError {
        /// Name of the step (`extract`, `transform` or `load`).
        step: String,
        /// Description supplied by the step.
        reason: String,
    },

    /// Error related to internal logic or state.
    #[error("Internal error: {0}")]
    InternalError(String),
}
