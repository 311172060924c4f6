// Copyright (c) 2025 Chetan Conikee <conikee@gmail.com>
// Licensed under the MIT License

//! Error handling for commit-lint.
//!
//! Pattern compilation, override bookkeeping, persistence and configuration
//! all report through [`LintError`]. Matching itself never fails past the
//! analyzer boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for commit-lint operations.
pub type Result<T> = std::result::Result<T, LintError>;

/// Error type for all commit-lint operations.
#[derive(Error, Debug)]
pub enum LintError {
    /// A pattern definition could not be compiled or failed validation.
    #[error("Invalid pattern '{id}': {reason}")]
    InvalidPattern {
        /// Identifier of the offending pattern.
        id: String,
        /// Why the pattern was rejected.
        reason: String,
    },

    /// A pattern id was referenced that is not registered.
    #[error("Pattern not found: {id}")]
    PatternNotFound {
        /// The unknown pattern id.
        id: String,
    },

    /// An override request was rejected.
    #[error("Invalid override for pattern '{pattern_id}': {reason}")]
    InvalidOverride {
        /// Pattern the override targeted.
        pattern_id: String,
        /// Why the override was rejected.
        reason: String,
    },

    /// Error occurred during file system operations.
    #[error("File system error for path '{path}': {source}")]
    FileSystem {
        /// The file path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An invalid data format was encountered.
    #[error("Invalid data format in {context}: {reason}")]
    InvalidFormat {
        /// The context where the invalid format was encountered.
        context: String,
        /// The reason for the format invalidity.
        reason: String,
    },

    /// Configuration could not be resolved.
    #[error("Configuration error: {reason}")]
    Config {
        /// The reason for the configuration failure.
        reason: String,
    },
}

impl LintError {
    /// Creates a new invalid pattern error.
    pub fn invalid_pattern(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new pattern-not-found error.
    pub fn pattern_not_found(id: impl Into<String>) -> Self {
        Self::PatternNotFound { id: id.into() }
    }

    /// Creates a new invalid override error.
    pub fn invalid_override(pattern_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOverride {
            pattern_id: pattern_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new file system error.
    pub fn file_system(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// Creates a new invalid format error.
    pub fn invalid_format(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for LintError {
    fn from(error: serde_json::Error) -> Self {
        Self::InvalidFormat {
            context: "JSON serialization/deserialization".to_string(),
            reason: error.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for LintError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::InvalidFormat {
            context: "YAML serialization/deserialization".to_string(),
            reason: error.to_string(),
        }
    }
}
