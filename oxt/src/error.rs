//! Error handling module for the oxt CLI.
//!
//! This module provides custom error types using `thiserror` for
//! structured error handling throughout the application.

use thiserror::Error;

/// Main error type for the oxt CLI application.
#[derive(Error, Debug)]
pub enum OxtError {
    /// Error when a required configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error when input validation fails.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Compilation failed.
    #[error(transparent)]
    Compile(#[from] oxc_proj::ProjectError),

    /// Error when IO operations fail.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using OxtError.
pub type Result<T> = std::result::Result<T, OxtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = OxtError::Config("missing entry point".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing entry point");
    }

    #[test]
    fn test_validation_error_display() {
        let err = OxtError::Validation("not a project".to_string());
        assert_eq!(err.to_string(), "Validation error: not a project");
    }

    #[test]
    fn test_compile_error_passthrough() {
        let inner = oxc_proj::ProjectError::FileNotFound {
            path: "ghost.ox".into(),
        };
        let err: OxtError = inner.into();
        assert_eq!(err.to_string(), "file not found: ghost.ox");
    }
}
