//! Error types for the zonesync engine
//!
//! This module defines all error types used throughout the crate, plus the
//! single place where remote error text is classified as "absence" or
//! "failure".

use thiserror::Error;

/// Result type alias for zonesync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the zonesync engine
#[derive(Error, Debug)]
pub enum Error {
    /// Pre-flight validation failure (no remote call was made)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Import locator does not have the expected shape
    #[error("Bad ID format: {0}")]
    InvalidLocator(String),

    /// Operation is not supported for this object kind
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Object does not exist remotely
    #[error("{0}")]
    NotFound(String),

    /// Failure reported by the remote API, message kept verbatim
    #[error("Remote error ({provider}): {message}")]
    Remote {
        /// Provider name
        provider: String,
        /// Error text as returned by the provider
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// State store-related errors
    #[error("State store error: {0}")]
    StateStore(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid locator error
    pub fn invalid_locator(msg: impl Into<String>) -> Self {
        Self::InvalidLocator(msg.into())
    }

    /// Create an unsupported operation error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a remote API error
    pub fn remote(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Whether this error was raised before any remote call was attempted
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidLocator(_) | Self::Unsupported(_)
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

/// Outcome of classifying a remote error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The object does not exist remotely; not an error
    Absence,
    /// A real failure that must be surfaced
    Fatal,
}

/// Phrasings the provider uses when an object does not exist.
///
/// The provider exposes no structured error codes, so absence is detected
/// by substring match on the error text. This list is the only place those
/// phrasings live.
const NOT_FOUND_PHRASES: &[&str] = &["not found", "Missing domain-name", "no zones returned"];

/// Classify an error as absence or fatal failure
pub fn classify(err: &Error) -> Classification {
    if let Error::NotFound(_) = err {
        return Classification::Absence;
    }
    if err.is_preflight() {
        return Classification::Fatal;
    }

    let text = err.to_string();
    if NOT_FOUND_PHRASES.iter().any(|phrase| text.contains(phrase)) {
        Classification::Absence
    } else {
        Classification::Fatal
    }
}
