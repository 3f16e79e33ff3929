//! Error types for the release tooling
//!
//! Provides structured error handling with context and proper error chains.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the release routines
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// A required input file does not exist
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// A required input directory does not exist
    #[error("Directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// A declaration line the routine depends on is missing
    #[error("Couldn't find a line matching '{pattern}' in {}", path.display())]
    PatternNotFound { pattern: String, path: PathBuf },

    /// File system operation errors
    #[error("File system error: {operation} failed on {}", path.display())]
    FileSystem {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Process execution errors
    #[error("Process error: {command} failed (exit code: {exit_code:?})")]
    Process {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl ReleaseError {
    /// Create a new missing file error
    pub fn file_not_found<P: Into<PathBuf>>(path: P) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new missing directory error
    pub fn directory_not_found<P: Into<PathBuf>>(path: P) -> Self {
        Self::DirectoryNotFound { path: path.into() }
    }

    /// Create a new missing pattern error
    pub fn pattern_not_found<P: Into<PathBuf>>(pattern: impl Into<String>, path: P) -> Self {
        Self::PatternNotFound {
            pattern: pattern.into(),
            path: path.into(),
        }
    }

    /// Create a new file system error
    pub fn file_system<P: Into<PathBuf>>(
        operation: impl Into<String>,
        path: P,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a new process error
    pub fn process(
        command: impl Into<String>,
        exit_code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::Process {
            command: command.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ReleaseError>;
