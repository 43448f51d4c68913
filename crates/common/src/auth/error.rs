//! Error taxonomy for the Spotify token lifecycle

use std::time::Duration;

use listify_domain::ListifyError;
use thiserror::Error;

use crate::error::{CommonError, ErrorClassification, ErrorSeverity};

/// Failures raised by token storage, exchange, refresh and callback handling
#[derive(Debug, Error)]
pub enum AuthError {
    /// No refresh token is stored (or it no longer decrypts)
    #[error("no refresh token available")]
    NoRefreshToken,

    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// A stored cookie could not be decrypted; callers treat it as absent
    #[error("token decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("authorization code exchange failed: {0}")]
    ExchangeFailed(String),

    /// The PKCE verifier was not found when the redirect came back
    #[error("no PKCE code verifier stored for this login")]
    MissingCodeVerifier,

    /// The provider redirected back with an `error` parameter
    #[error("authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("authorization callback carried no code")]
    MissingAuthorizationCode,

    /// The provider's `expires_in` cannot be turned into an expiry instant
    #[error("token lifetime out of range: {0}s")]
    InvalidTokenLifetime(i64),

    /// Terminal: tokens were cleared and the user sent to the login route
    #[error("session expired, please log in again")]
    Unauthenticated,

    #[error(transparent)]
    Storage(#[from] CommonError),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl ErrorClassification for AuthError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::RefreshFailed(_) | Self::ExchangeFailed(_) => true,
            Self::Storage(err) => err.is_retryable(),
            _ => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoRefreshToken | Self::DecryptionFailed(_) => ErrorSeverity::Info,
            Self::AuthorizationDenied(_) | Self::MissingAuthorizationCode => {
                ErrorSeverity::Warning
            }
            Self::Storage(err) => err.severity(),
            _ => ErrorSeverity::Error,
        }
    }

    fn is_critical(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl From<AuthError> for ListifyError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => Self::Unauthenticated(err.to_string()),
            AuthError::Storage(inner) => inner.into(),
            other => Self::Auth(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_marks_transport_failures_retryable() {
        assert!(AuthError::RefreshFailed("timeout".into()).is_retryable());
        assert!(!AuthError::NoRefreshToken.is_retryable());
        assert_eq!(AuthError::NoRefreshToken.severity(), ErrorSeverity::Info);
        assert_eq!(AuthError::Unauthenticated.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn converts_into_domain_error() {
        let err: ListifyError = AuthError::Unauthenticated.into();
        assert!(matches!(err, ListifyError::Unauthenticated(_)));

        let err: ListifyError = AuthError::ExchangeFailed("invalid_grant".into()).into();
        assert!(matches!(err, ListifyError::Auth(msg) if msg.contains("invalid_grant")));

        let err: ListifyError = AuthError::Storage(CommonError::storage("disk full")).into();
        assert!(matches!(err, ListifyError::Storage(_)));
    }
}
