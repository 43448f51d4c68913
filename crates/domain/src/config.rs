//! Configuration structures
//!
//! Mirrors the settings the web client used to read from its build
//! environment. Loading lives in `listify-infra::config`.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{ListifyError, Result};

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListifyConfig {
    pub spotify: SpotifyConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Spotify OAuth and Web API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub redirect_uri: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

/// First-party Listify API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
}

/// Token-at-rest protection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Application secret mixed into the cookie encryption key.
    pub encryption_seed: String,
    /// Mark cookies `Secure`. Production builds keep this on.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

/// Outbound HTTP behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout. `None` leaves the transport default in place.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Total attempts for transport-level failures (initial try included).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: None, max_attempts: default_max_attempts() }
    }
}

impl SpotifyConfig {
    /// Build a Spotify configuration with the public Spotify endpoints and
    /// the default scopes.
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scopes: default_scopes(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            api_url: default_api_url(),
        }
    }
}

impl ListifyConfig {
    /// Check that required values are present and URLs parse.
    ///
    /// # Errors
    /// Returns `ListifyError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        require_non_empty("spotify.client_id", &self.spotify.client_id)?;
        require_non_empty("security.encryption_seed", &self.security.encryption_seed)?;

        require_url("spotify.redirect_uri", &self.spotify.redirect_uri)?;
        require_url("spotify.auth_url", &self.spotify.auth_url)?;
        require_url("spotify.token_url", &self.spotify.token_url)?;
        require_url("spotify.api_url", &self.spotify.api_url)?;
        require_url("api.base_url", &self.api.base_url)?;

        if self.http.max_attempts == 0 {
            return Err(ListifyError::Config("http.max_attempts must be at least 1".into()));
        }

        Ok(())
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ListifyError::Config(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_url(field: &str, value: &str) -> Result<()> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| ListifyError::Config(format!("{field} is not a valid URL: {e}")))
}

/// Scopes requested when none are configured.
pub fn default_scopes() -> Vec<String> {
    vec!["user-read-private".to_string(), "user-read-email".to_string()]
}

fn default_auth_url() -> String {
    "https://accounts.spotify.com/authorize".to_string()
}

fn default_token_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

fn default_api_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

const fn default_secure_cookies() -> bool {
    true
}

const fn default_max_attempts() -> usize {
    1
}
