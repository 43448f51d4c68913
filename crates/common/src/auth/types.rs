//! OAuth 2.0 types and structures
//!
//! Token payloads as returned by the Spotify accounts service, and the
//! provider configuration the client and PKCE builder read from.

use std::fmt;

use listify_domain::constants::DEFAULT_EXPIRES_IN_SECS;
use listify_domain::SpotifyConfig;
use serde::{Deserialize, Serialize};

/// Tokens issued by a successful exchange or refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Bearer token for API calls
    pub access_token: String,

    /// Present on the initial exchange and whenever the provider rotates it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token type (always "Bearer" for OAuth 2.0)
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Granted scopes (space-separated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenSet {
    #[must_use]
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
            scope: None,
        }
    }
}

/// OAuth token response from the authorization server
///
/// Every field is optional on the wire; [`TokenResponse::into_token_set`]
/// decides whether the payload is usable.
#[derive(Debug, Default, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
}

impl TokenResponse {
    /// `None` when no non-empty access token was issued. A missing
    /// `expires_in` falls back to one hour.
    #[must_use]
    pub fn into_token_set(self) -> Option<TokenSet> {
        let access_token = self.access_token.filter(|token| !token.is_empty())?;
        Some(TokenSet {
            access_token,
            refresh_token: self.refresh_token.filter(|token| !token.is_empty()),
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_in: self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS),
            scope: self.scope,
        })
    }
}

/// OAuth configuration for the authorization server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub authorization_url: String,
    pub token_url: String,
}

impl OAuthConfig {
    /// Get scopes as space-separated string
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }
}

impl From<&SpotifyConfig> for OAuthConfig {
    fn from(config: &SpotifyConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scopes: config.scopes.clone(),
            authorization_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
        }
    }
}

/// OAuth error response from authorization server
///
/// Standard OAuth 2.0 error response format (RFC 6749 §5.2).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OAuthError {
    pub error: String,
    pub error_description: Option<String>,
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuthError {}
