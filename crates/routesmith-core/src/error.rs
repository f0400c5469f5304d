//! Error handling for the routesmith generation library.
//!
//! This module defines the main error type `Error` used throughout the
//! library, along with a convenient `Result` type alias. It uses `thiserror`
//! for easy error handling and implements conversions from common error types.
//!
//! # Examples
//!
//! ```
//! use routesmith_core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     // Operations that might fail...
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Result type for routesmith generation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for routesmith generation operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Source file could not be parsed into a syntax tree
    #[error("failed to parse source {file}: {message}")]
    Parse { file: PathBuf, message: String },

    /// Validation specification file is malformed
    #[error("invalid specification {file}: {message}")]
    Spec { file: PathBuf, message: String },

    /// Template engine error
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Input synthesis error
    #[error("synthesis error: {0}")]
    Synth(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new source-parse error carrying the offending file path
    pub fn parse(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a new specification error carrying the offending file path
    pub fn spec(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Spec {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a new synthesis error
    pub fn synth<S: Into<String>>(msg: S) -> Self {
        Self::Synth(msg.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Config(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Config(s)
    }
}
