//! Error types and utilities for Harry.

use thiserror::Error;

/// Boxed error used as an optional source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for Harry operations.
pub type Result<T> = std::result::Result<T, HarryError>;

/// Main error type for Harry operations.
#[derive(Error, Debug)]
pub enum HarryError {
    /// Configuration related errors.
    #[error("Configuration error: {message}")]
    Config {
        /// Human readable description.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// I/O related errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network related errors (HTTP requests, etc.)
    #[error("Network error: {message}")]
    Network {
        /// Human readable description.
        message: String,
        /// HTTP status, when the request got that far.
        status_code: Option<u16>,
        /// Underlying cause, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// Discord API related errors.
    #[error("Discord API error: {message}")]
    Discord {
        /// Human readable description.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// Input validation errors.
    #[error("Validation error for '{field}': {message}")]
    Validation {
        /// Field or argument that failed validation.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An operation kept failing until the retry budget ran out.
    #[error("{operation} failed after {attempts} attempts")]
    RetryExhausted {
        /// Name of the operation that was retried.
        operation: String,
        /// Attempts made, including the first one.
        attempts: u32,
        /// Last error seen.
        #[source]
        source: Box<HarryError>,
    },

    /// Internal errors that should not normally happen.
    #[error("Internal error: {message}")]
    Internal {
        /// Human readable description.
        message: String,
    },
}

impl HarryError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a configuration error with an underlying cause.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a network error without a status code.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status_code: None,
            source: None,
        }
    }

    /// Creates a network error carrying the HTTP status that caused it.
    pub fn network_status(message: impl Into<String>, status_code: u16) -> Self {
        Self::Network {
            message: message.into(),
            status_code: Some(status_code),
            source: None,
        }
    }

    /// Creates a Discord error.
    pub fn discord(message: impl Into<String>) -> Self {
        Self::Discord {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether retrying the failed operation could plausibly succeed.
    ///
    /// Transport failures without a status, rate limits and server errors are
    /// transient. Client errors and everything else are not.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network { status_code, .. } => match status_code {
                None => true,
                Some(code) => *code == 429 || *code >= 500,
            },
            _ => false,
        }
    }

    /// Short category label used by metrics and error reports.
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Io(_) => "io",
            Self::Network { .. } => "network",
            Self::Discord { .. } => "discord",
            Self::Validation { .. } => "validation",
            Self::Serialization(_) => "serialization",
            Self::RetryExhausted { .. } => "retry_exhausted",
            Self::Internal { .. } => "internal",
        }
    }
}
