//! Core error types for examplan-core.
//!
//! Every fallible operation in the library returns [`CoreError`]. The wizard
//! reduces these to a short user-visible message and keeps the typed error
//! for the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for examplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The upload step was triggered without an image.
    #[error("No file selected")]
    NoFileSelected,

    /// The model service could not be reached or answered with an error.
    #[error("Model service error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Service {
        status: Option<u16>,
        message: String,
    },

    /// The model answered, but not in the expected shape.
    #[error("Failed to parse model response: {0}")]
    Parse(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors raised at the input boundary.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Confidence set for a subject that is not on the exam list
    #[error("Unknown subject '{0}': not on the extracted exam list")]
    UnknownSubject(String),

    /// Confidence level outside low/medium/high
    #[error("Invalid confidence level '{0}': expected low, medium or high")]
    InvalidConfidence(String),

    /// Activity field name not recognised
    #[error("Unknown activity field '{0}'")]
    UnknownField(String),

    /// Value kind does not match the field (text vs. flag)
    #[error("Field '{field}' expects {expected}")]
    WrongValueKind {
        field: String,
        expected: &'static str,
    },

    /// Image extension is not PNG or JPEG
    #[error("Unsupported image type for {path}: expected .png, .jpg or .jpeg")]
    UnsupportedImage { path: PathBuf },

    /// Image exceeds the configured upload limit
    #[error("Image is {size} bytes, larger than the {limit} byte limit")]
    ImageTooLarge { size: u64, limit: u64 },

    /// Upload attempted after the wizard left the first step
    #[error("Uploads are only accepted on step 1; the wizard is on step {step}")]
    UploadNotAllowed { step: u8 },
}

impl CoreError {
    pub fn service(message: impl Into<String>) -> Self {
        CoreError::Service {
            status: None,
            message: message.into(),
        }
    }

    /// Whether this error came from the model service or the network.
    pub fn is_service(&self) -> bool {
        matches!(self, CoreError::Service { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, CoreError::Parse(_))
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        CoreError::Service {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_includes_status_when_known() {
        let err = CoreError::Service {
            status: Some(503),
            message: "overloaded".into(),
        };
        assert_eq!(err.to_string(), "Model service error (HTTP 503): overloaded");

        let err = CoreError::service("connection refused");
        assert_eq!(err.to_string(), "Model service error: connection refused");
        assert!(err.is_service());
    }

    #[test]
    fn validation_converts_into_core_error() {
        let err: CoreError = ValidationError::UnknownSubject("Art".into()).into();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("Art"));
    }

    #[test]
    fn upload_step_error_names_the_current_step() {
        let err: CoreError = ValidationError::UploadNotAllowed { step: 4 }.into();
        assert!(err.to_string().contains("step 4"));
    }
}
