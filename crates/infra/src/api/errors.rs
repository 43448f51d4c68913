//! API-specific error types
//!
//! Classifies non-success responses from the Listify backend and the
//! Spotify Web API before they are folded into [`ListifyError`].

use listify_domain::ListifyError;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Authentication errors (401, 403)
    Authentication,
    /// Rate limiting errors (429)
    RateLimit,
    /// Server errors (5xx)
    Server,
    /// Client errors (4xx except auth)
    Client,
    /// Response body did not match the expected shape
    Decode,
    /// Configuration errors
    Config,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::RateLimit(_) => ApiErrorCategory::RateLimit,
            Self::Server(_) => ApiErrorCategory::Server,
            Self::Client(_) | Self::NotFound(_) => ApiErrorCategory::Client,
            Self::Decode(_) => ApiErrorCategory::Decode,
            Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// Classify a non-success response
    ///
    /// The message prefers the server's own explanation: a top-level
    /// `message`, Spotify's `error.message`, or an OAuth-style
    /// `error_description`. The raw body is used otherwise.
    pub fn from_status(status: StatusCode, url: &str, body: &str) -> Self {
        let detail = error_detail(body);
        let message = if detail.is_empty() {
            format!("{url} returned status {status}")
        } else {
            format!("{url} returned status {status}: {detail}")
        };

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Self::Auth(message)
        } else if status == StatusCode::NOT_FOUND {
            Self::NotFound(message)
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimit(message)
        } else if status.is_server_error() {
            Self::Server(message)
        } else {
            Self::Client(message)
        }
    }
}

fn error_detail(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    let candidates = [
        json.get("message"),
        json.get("error").and_then(|error| error.get("message")),
        json.get("error_description"),
        json.get("error"),
    ];
    let found = candidates.into_iter().flatten().find_map(Value::as_str).map(str::to_string);
    found.unwrap_or_else(|| body.trim().to_string())
}

impl From<ApiError> for ListifyError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Auth(message) => Self::Auth(message),
            ApiError::NotFound(message) => Self::NotFound(message),
            ApiError::Config(message) => Self::Config(message),
            other => Self::Api(other.to_string()),
        }
    }
}
