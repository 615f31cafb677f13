/*!
 * Error types for the readalong application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Malformed transcript lines are not represented here: the parser drops them
 * silently, and an empty transcript is a state rather than an error.
 */

use thiserror::Error;

/// Errors raised by the playback synchronizer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Jump or navigation request outside the loaded transcript
    #[error("Line index {index} is out of range (transcript has {len} lines)")]
    IndexOutOfRange {
        /// Requested line index
        index: usize,
        /// Number of lines in the transcript
        len: usize,
    },
}

/// Errors that can occur when working with book configuration
#[derive(Error, Debug)]
pub enum BookError {
    /// Unit index outside the configured unit list
    #[error("Unit index {index} is out of range (book has {count} units)")]
    UnitOutOfRange {
        /// Requested unit index
        index: usize,
        /// Number of configured units
        count: usize,
    },

    /// Book configuration could not be interpreted
    #[error("Invalid book configuration: {0}")]
    InvalidConfig(String),

    /// Resource could not be fetched
    #[error("Failed to fetch {location}: {message}")]
    FetchFailed {
        /// Local path or URL of the resource
        location: String,
        /// Underlying failure
        message: String,
    },
}

/// Errors raised by key/value persistence backends
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error reported by SQLite
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Store could not be opened
    #[error("Failed to open store: {0}")]
    Open(String),
}
