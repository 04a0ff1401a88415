//! Error types for trackprep.
//!
//! This module defines all error types used throughout the trackprep crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for trackprep operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Input Errors ===
    /// No CSV files were found in the input directory.
    #[error("no CSV files found in directory {}", .dir.display())]
    NoInputFiles {
        /// The directory that was searched.
        dir: PathBuf,
    },

    /// A CSV file could not be read or parsed.
    #[error("failed to read CSV file {}: {source}", .path.display())]
    CsvRead {
        /// Path to the offending file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: csv::Error,
    },

    /// CSV encoding or decoding failed outside of a specific file.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // === Frame Errors ===
    /// A column did not have the same number of rows as its frame.
    #[error("column '{column}' has {actual} rows, frame has {expected}")]
    ShapeMismatch {
        /// Name of the column being set.
        column: String,
        /// Row count of the frame.
        expected: usize,
        /// Row count of the column.
        actual: usize,
    },

    /// A required column is absent.
    #[error("missing column: {0}")]
    MissingColumn(String),

    // === Encoding Errors ===
    /// A row broke the one-hot encoding rules for an indicator group.
    #[error("one-hot violation in group '{group}' at row {row}: {reason}")]
    OneHotViolation {
        /// Source column of the indicator group.
        group: String,
        /// Zero-based row index.
        row: usize,
        /// What was wrong with the row.
        reason: String,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {}: {source}", .path.display())]
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
    #[error("failed to create directory {}: {source}", .path.display())]
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

/// A specialized Result type for trackprep operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a one-hot violation error.
    #[must_use]
    pub fn one_hot_violation(group: impl Into<String>, row: usize, reason: impl Into<String>) -> Self {
        Self::OneHotViolation {
            group: group.into(),
            row,
            reason: reason.into(),
        }
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error means there was nothing to process.
    #[must_use]
    pub fn is_no_input(&self) -> bool {
        matches!(self, Self::NoInputFiles { .. })
    }

    /// Check if this error is an encoding rule violation.
    #[must_use]
    pub fn is_one_hot_violation(&self) -> bool {
        matches!(self, Self::OneHotViolation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_input_files_display() {
        let err = Error::NoInputFiles {
            dir: PathBuf::from("/data/raw"),
        };
        assert_eq!(err.to_string(), "no CSV files found in directory /data/raw");
        assert!(err.is_no_input());
    }

    #[test]
    fn test_one_hot_violation_display() {
        let err = Error::one_hot_violation("Sex", 4, "2 indicators set");
        assert_eq!(
            err.to_string(),
            "one-hot violation in group 'Sex' at row 4: 2 indicators set"
        );
        assert!(err.is_one_hot_violation());
        assert!(!err.is_no_input());
    }

    #[test]
    fn test_shape_mismatch_display() {
        let err = Error::ShapeMismatch {
            column: "month".to_string(),
            expected: 10,
            actual: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("month"));
        assert!(msg.contains("10"));
        assert!(msg.contains('3'));
    }

    #[test]
    fn test_missing_column_display() {
        let err = Error::MissingColumn("Latitude".to_string());
        assert_eq!(err.to_string(), "missing column: Latitude");
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::config_validation("knn_neighbors must be greater than 0");
        assert!(err.to_string().contains("knn_neighbors"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
