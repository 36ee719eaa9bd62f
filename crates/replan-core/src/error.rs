//! Core error types for replan-core.
//!
//! One thiserror hierarchy shared across the library. Running out of room
//! in the day is NOT an error -- slot search reports it as a normal
//! `SearchOutcome::Exhausted` value (see the `search` module).

use thiserror::Error;

/// Core error type for replan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed time string input
    #[error("Time format error: {0}")]
    TimeFormat(#[from] TimeFormatError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Failure talking to a collaborator service
    #[error("Transport error for '{service}': {message}")]
    Transport {
        service: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Build a transport error without an underlying source.
    pub fn transport(service: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Transport {
            service: service.into(),
            message: message.into(),
            source: None,
        }
    }
}

/// Malformed time-string errors.
///
/// Surfaced to the caller and never silently defaulted -- a bad time string
/// from the planner means the task cannot be placed at all.
#[derive(Error, Debug)]
pub enum TimeFormatError {
    /// 12-hour display time missing its AM/PM marker
    #[error("Missing AM/PM marker in display time '{0}'")]
    MissingMeridiem(String),

    /// Hour or minute out of range for the format
    #[error("Out-of-range {unit} {value} in time '{input}'")]
    OutOfRange {
        input: String,
        unit: &'static str,
        value: u32,
    },

    /// Not parseable as the expected format at all
    #[error("Malformed time string '{input}': expected {expected}")]
    Malformed {
        input: String,
        expected: &'static str,
    },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid interval after cross-midnight normalization
    #[error("Invalid interval: end ({end_minutes}m) must be greater than start ({start_minutes}m)")]
    InvalidInterval {
        start_minutes: i64,
        end_minutes: i64,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        CoreError::Transport {
            service: "calendar-api".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
