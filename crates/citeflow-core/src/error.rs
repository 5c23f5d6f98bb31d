//! Error types for Citeflow.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of characters of an upstream payload kept inside a
/// `MalformedPayload` error.
const RAW_EXCERPT_LIMIT: usize = 2_000;

/// A shared error type for the entire Citeflow workspace.
///
/// Variants follow the failure taxonomy of a citation search: validation
/// failures never create a session, payload and provider failures move a
/// session to `Error`, verification and refill failures are absorbed by
/// their callers.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum CiteError {
    /// No selection, or an invalid one, before a search starts
    #[error("Validation error: {0}")]
    Validation(String),

    /// Upstream text could not be recovered into structured candidates
    #[error("Malformed payload: {message}")]
    MalformedPayload {
        message: String,
        /// The offending upstream text (possibly truncated) for diagnostics.
        raw: String,
    },

    /// Network, authentication or upstream failure
    #[error("Provider error: {message}")]
    Provider {
        message: String,
        status_code: Option<u16>,
        retryable: bool,
    },

    /// Verification pass failure (absorbed by the merger)
    #[error("Verification failed: {0}")]
    Verification(String),

    /// Background refill failure (absorbed by the session manager)
    #[error("Refill failed: {0}")]
    Refill(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CiteError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a MalformedPayload error, keeping an excerpt of the raw text.
    pub fn malformed_payload(message: impl Into<String>, raw: &str) -> Self {
        let raw = if raw.chars().count() > RAW_EXCERPT_LIMIT {
            let mut excerpt: String = raw.chars().take(RAW_EXCERPT_LIMIT).collect();
            excerpt.push_str("...");
            excerpt
        } else {
            raw.to_string()
        };
        Self::MalformedPayload {
            message: message.into(),
            raw,
        }
    }

    /// Creates a non-retryable Provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            status_code: None,
            retryable: false,
        }
    }

    /// Creates a Provider error carrying an HTTP status
    pub fn provider_status(status_code: u16, message: impl Into<String>, retryable: bool) -> Self {
        Self::Provider {
            message: message.into(),
            status_code: Some(status_code),
            retryable,
        }
    }

    /// Wraps an absorbed verification failure
    pub fn verification(cause: &CiteError) -> Self {
        Self::Verification(cause.to_string())
    }

    /// Wraps an absorbed refill failure
    pub fn refill(cause: &CiteError) -> Self {
        Self::Refill(cause.to_string())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a MalformedPayload error
    pub fn is_malformed_payload(&self) -> bool {
        matches!(self, Self::MalformedPayload { .. })
    }

    /// Check if this is a Provider error
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider { .. })
    }

    /// Check if this is a Verification error
    pub fn is_verification(&self) -> bool {
        matches!(self, Self::Verification(_))
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider { retryable: true, .. })
    }

    /// Message shown to the user on a session in `Error` state.
    ///
    /// Raw payloads and status codes are left out; they go to the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::MalformedPayload { message, .. } => {
                format!("The reference provider returned an unreadable response: {message}")
            }
            Self::Provider {
                message,
                status_code: Some(code),
                ..
            } => format!("Reference search failed ({code}): {message}"),
            Self::Provider { message, .. } => format!("Reference search failed: {message}"),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for CiteError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CiteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CiteError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, CiteError>`.
pub type Result<T> = std::result::Result<T, CiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_payload_truncates_raw_text() {
        let raw = "x".repeat(RAW_EXCERPT_LIMIT + 50);
        let err = CiteError::malformed_payload("no array", &raw);
        match err {
            CiteError::MalformedPayload { raw, .. } => {
                assert_eq!(raw.chars().count(), RAW_EXCERPT_LIMIT + 3);
                assert!(raw.ends_with("..."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_user_message_hides_raw_payload() {
        let err = CiteError::malformed_payload("no JSON array found", "secret raw body");
        let message = err.user_message();
        assert!(message.contains("no JSON array found"));
        assert!(!message.contains("secret raw body"));
    }

    #[test]
    fn test_provider_status_message() {
        let err = CiteError::provider_status(429, "quota exhausted", true);
        assert!(err.is_retryable());
        assert_eq!(
            err.user_message(),
            "Reference search failed (429): quota exhausted"
        );
    }

    #[test]
    fn test_absorbed_failures_keep_cause() {
        let cause = CiteError::config("missing key");
        let err = CiteError::verification(&cause);
        assert!(err.is_verification());
        assert!(err.to_string().contains("missing key"));
        assert!(CiteError::refill(&cause).to_string().contains("missing key"));
    }
}
