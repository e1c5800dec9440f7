//! Error types for Market Suite.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for the entire Market Suite workspace.
///
/// Variants follow the error taxonomy of a tool invocation: validation errors
/// are raised before any network call, service errors come back from the
/// generation backend, and credential errors ask the user to pick a new key.
#[derive(Error, Debug, Clone, Serialize)]
pub enum MarketError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required form field is missing or a value was rejected
    #[error("Validation error: {0}")]
    Validation(String),

    /// The API credential is missing, expired or no longer valid
    #[error("Credential error: {0}")]
    Credential(String),

    /// The generation service answered with a failure
    #[error("Generation service error{}: {message}", status_suffix(.status_code))]
    Service {
        status_code: Option<u16>,
        message: String,
    },

    /// The generation service answered with a payload we cannot use
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A long-running operation did not finish within the polling budget
    #[error("Operation did not complete after {attempts} polling attempts")]
    PollingTimeout { attempts: u32 },

    /// A request is already in flight for this tool instance
    #[error("A request is already in progress for tool '{0}'")]
    Busy(String),

    /// The invocation was cancelled by a reset or by closing the tool
    #[error("Invocation cancelled")]
    Cancelled,

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarketError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Credential error
    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential(message.into())
    }

    /// Creates a Service error
    pub fn service(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self::Service {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a MalformedResponse error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a credential error
    pub fn is_credential(&self) -> bool {
        matches!(self, Self::Credential(_))
    }

    /// Check if this is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if this error came back from the generation service
    pub fn is_service(&self) -> bool {
        matches!(self, Self::Service { .. } | Self::MalformedResponse(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for MarketError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for MarketError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for MarketError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<base64::DecodeError> for MarketError {
    fn from(err: base64::DecodeError) -> Self {
        Self::MalformedResponse(format!("invalid base64 payload: {err}"))
    }
}

/// Conversion from anyhow::Error (glue code in binaries)
impl From<anyhow::Error> for MarketError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Conversion from String (for error messages)
impl From<String> for MarketError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

fn status_suffix(status_code: &Option<u16>) -> String {
    status_code.map(|code| format!(" ({code})")).unwrap_or_default()
}

/// A type alias for `Result<T, MarketError>`.
pub type Result<T> = std::result::Result<T, MarketError>;
