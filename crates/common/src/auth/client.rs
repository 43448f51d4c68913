//! OAuth 2.0 token endpoint client
//!
//! Handles the two grants the session lifecycle needs:
//! - `authorization_code` with a PKCE verifier
//! - `refresh_token`
//!
//! Both are form POSTs to the configured token URL. No client secret is sent.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::traits::OAuthClientTrait;
use super::types::{OAuthConfig, OAuthError, TokenResponse, TokenSet};

/// Error type for OAuth client operations
#[derive(Debug)]
pub enum OAuthClientError {
    /// HTTP request failed
    RequestFailed(reqwest::Error),

    /// OAuth server returned an error
    OAuthError(OAuthError),

    /// Non-success status without an OAuth error body
    UnexpectedStatus { status: u16, body: String },

    /// Failed to parse response
    ParseError(String),

    /// Successful response that carried no access token
    MissingAccessToken,

    /// Invalid configuration
    ConfigError(String),
}

impl std::fmt::Display for OAuthClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestFailed(e) => write!(f, "HTTP request failed: {e}"),
            Self::OAuthError(e) => write!(f, "OAuth error: {e}"),
            Self::UnexpectedStatus { status, body } => {
                write!(f, "Unexpected status {status}: {body}")
            }
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
            Self::MissingAccessToken => write!(f, "Token response contained no access token"),
            Self::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for OAuthClientError {}

impl From<reqwest::Error> for OAuthClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::RequestFailed(err)
    }
}

/// OAuth 2.0 client for a public (secretless) PKCE application
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    client: Client,
}

impl OAuthClient {
    /// Create a new OAuth client with the runtime's default timeouts
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        Self::with_timeout(config, None)
    }

    /// Create a new OAuth client with an optional request timeout
    #[must_use]
    pub fn with_timeout(config: OAuthConfig, timeout: Option<Duration>) -> Self {
        let builder = Client::builder();
        let builder = match timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };
        let client = builder.build().unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    /// Exchange authorization code for tokens
    ///
    /// # Errors
    /// See [`OAuthClientTrait::exchange_code`]
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("code_verifier", code_verifier),
        ];

        debug!(token_url = %self.config.token_url, "exchanging authorization code");
        self.post_token_request(&params).await
    }

    /// Refresh access token using refresh token
    ///
    /// # Errors
    /// See [`OAuthClientTrait::refresh_access_token`]
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        if refresh_token.is_empty() {
            return Err(OAuthClientError::ConfigError("empty refresh token".to_string()));
        }

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
        ];

        debug!(token_url = %self.config.token_url, "refreshing access token");
        self.post_token_request(&params).await
    }

    /// Get a reference to the OAuth configuration
    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    async fn post_token_request(
        &self,
        params: &[(&str, &str)],
    ) -> Result<TokenSet, OAuthClientError> {
        let response = self.client.post(&self.config.token_url).form(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<OAuthError>(&body) {
                Ok(error) => OAuthClientError::OAuthError(error),
                Err(_) => OAuthClientError::UnexpectedStatus { status: status.as_u16(), body },
            });
        }

        let token_response: TokenResponse =
            response.json().await.map_err(|e| OAuthClientError::ParseError(e.to_string()))?;

        token_response.into_token_set().ok_or(OAuthClientError::MissingAccessToken)
    }
}

#[async_trait]
impl OAuthClientTrait for OAuthClient {
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        self.exchange_code(code, code_verifier).await
    }

    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        self.refresh_access_token(refresh_token).await
    }

    fn config(&self) -> &OAuthConfig {
        self.config()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::client.
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn create_test_config(server: &MockServer) -> OAuthConfig {
        OAuthConfig {
            client_id: "test_client_id".to_string(),
            redirect_uri: "http://localhost:5173/callback".to_string(),
            scopes: vec!["user-read-private".to_string()],
            authorization_url: format!("{}/authorize", server.uri()),
            token_url: format!("{}/api/token", server.uri()),
        }
    }

    /// Validates `OAuthClient::exchange_code` request encoding.
    ///
    /// Assertions:
    /// - Confirms the form body carries the grant, code, verifier, client id
    ///   and redirect URI.
    /// - Confirms the parsed token set.
    #[tokio::test]
    async fn test_exchange_code_posts_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=abc"))
            .and(body_string_contains("code_verifier=v1"))
            .and(body_string_contains("client_id=test_client_id"))
            .and(body_string_contains("redirect_uri=http%3A%2F%2Flocalhost%3A5173%2Fcallback"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "A1",
                "refresh_token": "R1",
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OAuthClient::new(create_test_config(&server));
        let tokens = client.exchange_code("abc", "v1").await.unwrap();

        assert_eq!(tokens.access_token, "A1");
        assert_eq!(tokens.refresh_token.as_deref(), Some("R1"));
        assert_eq!(tokens.expires_in, 3600);
    }

    /// Validates `OAuthClient::refresh_access_token` request encoding.
    ///
    /// Assertions:
    /// - Confirms the form body carries the refresh grant.
    /// - Confirms an absent rotated refresh token stays `None`.
    #[tokio::test]
    async fn test_refresh_posts_refresh_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=R1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "access_token": "A2", "expires_in": 3600 })),
            )
            .mount(&server)
            .await;

        let client = OAuthClient::new(create_test_config(&server));
        let tokens = client.refresh_access_token("R1").await.unwrap();

        assert_eq!(tokens.access_token, "A2");
        assert!(tokens.refresh_token.is_none());
    }

    /// Validates mapping of an OAuth error body.
    ///
    /// Assertions:
    /// - Ensures a 400 with `invalid_grant` maps to `OAuthError`.
    #[tokio::test]
    async fn test_oauth_error_body_is_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Refresh token revoked"
            })))
            .mount(&server)
            .await;

        let client = OAuthClient::new(create_test_config(&server));
        let result = client.refresh_access_token("R1").await;

        assert!(
            matches!(result, Err(OAuthClientError::OAuthError(ref e)) if e.error == "invalid_grant")
        );
    }

    /// Validates mapping of a non-OAuth failure body.
    #[tokio::test]
    async fn test_unexpected_status_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let client = OAuthClient::new(create_test_config(&server));
        let result = client.exchange_code("abc", "v1").await;

        assert!(matches!(
            result,
            Err(OAuthClientError::UnexpectedStatus { status: 503, ref body })
                if body == "unavailable"
        ));
    }

    /// Validates that a 200 without an access token is rejected.
    #[tokio::test]
    async fn test_missing_access_token_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "expires_in": 3600 })))
            .mount(&server)
            .await;

        let client = OAuthClient::new(create_test_config(&server));
        let result = client.refresh_access_token("R1").await;

        assert!(matches!(result, Err(OAuthClientError::MissingAccessToken)));
    }

    /// Validates `OAuthClient::refresh_access_token` behavior for the empty
    /// token scenario.
    ///
    /// Assertions:
    /// - Ensures no request is attempted for an empty token.
    #[tokio::test]
    async fn test_refresh_with_empty_token() {
        let server = MockServer::start().await;
        let client = OAuthClient::new(create_test_config(&server));

        let result = client.refresh_access_token("").await;
        assert!(matches!(result, Err(OAuthClientError::ConfigError(_))));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}
