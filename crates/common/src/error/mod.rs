//! Shared error vocabulary.
//!
//! [`CommonError`] covers failures of the building blocks in this crate that
//! carry no module-specific context: configuration, (de)serialization, the
//! cookie and key/value stores, and cryptography. Module errors such as
//! `auth::AuthError` wrap it with `#[from]` rather than repeating variants.
//!
//! [`ErrorClassification`] lets callers make logging and retry decisions
//! without matching on concrete error types. Severity ranges from `Info`
//! (expected, such as a missing refresh token) to `Critical` (integrity at
//! risk, such as a failed decryption).

use std::fmt;
use std::time::Duration;

use thiserror::Error;

pub type CommonResult<T> = Result<T, CommonError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommonError {
    #[error("Configuration error{}: {message}", scoped(" in field", .field))]
    Config { message: String, field: Option<String> },

    #[error("Serialization error{}: {message}", parenthesised(.format))]
    Serialization { message: String, format: Option<String> },

    /// Cookie or key/value store failure (file I/O, unavailable storage).
    #[error("Storage error{}: {message}", scoped(" during", .operation))]
    Storage { message: String, operation: Option<String> },

    /// Encryption, decryption or randomness failure.
    #[error("Crypto error: {message}")]
    Crypto { message: String },
}

fn scoped(prefix: &str, scope: &Option<String>) -> String {
    scope.as_ref().map(|s| format!("{prefix} '{s}'")).unwrap_or_default()
}

fn parenthesised(scope: &Option<String>) -> String {
    scope.as_ref().map(|s| format!(" ({s})")).unwrap_or_default()
}

impl CommonError {
    pub fn config_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config { message: message.into(), field: Some(field.into()) }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage { message: message.into(), operation: None }
    }

    /// Storage error tagged with the store operation that failed, e.g.
    /// `"cookie.set"`.
    pub fn storage_op(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage { message: message.into(), operation: Some(operation.into()) }
    }

    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto { message: message.into() }
    }
}

impl ErrorClassification for CommonError {
    fn is_retryable(&self) -> bool {
        false
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Crypto { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::Crypto { .. })
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Uniform classification for errors raised across modules.
pub trait ErrorClassification {
    fn is_retryable(&self) -> bool;

    fn severity(&self) -> ErrorSeverity;

    /// Whether the error should surface to the user immediately.
    fn is_critical(&self) -> bool;

    /// Suggested wait before retrying, when the failure says so.
    fn retry_after(&self) -> Option<Duration>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        })
    }
}

impl From<serde_json::Error> for CommonError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization { message: err.to_string(), format: Some("JSON".into()) }
    }
}

impl From<std::io::Error> for CommonError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(err.to_string())
    }
}

impl From<CommonError> for listify_domain::ListifyError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::Config { .. } => Self::Config(err.to_string()),
            CommonError::Storage { .. } | CommonError::Serialization { .. } => {
                Self::Storage(err.to_string())
            }
            CommonError::Crypto { .. } => Self::Internal(err.to_string()),
        }
    }
}
