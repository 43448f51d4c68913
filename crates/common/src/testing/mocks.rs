//! Mock implementations of common traits
//!
//! Provides mock objects for testing purposes.

// Allow missing error/panic docs for test mocks - they are designed to be simple
// and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::auth::{OAuthClientError, OAuthClientTrait, OAuthConfig, OAuthError, TokenSet};
use crate::crypto::RandomBytesSource;
use crate::error::CommonResult;

#[derive(Debug, Clone)]
enum MockResponse {
    Tokens(TokenSet),
    Failure(String),
}

impl MockResponse {
    fn not_configured(grant: &str) -> Self {
        Self::Failure(format!("{grant} response not configured"))
    }

    fn into_result(self) -> Result<TokenSet, OAuthClientError> {
        match self {
            Self::Tokens(tokens) => Ok(tokens),
            Self::Failure(error) => {
                Err(OAuthClientError::OAuthError(OAuthError { error, error_description: None }))
            }
        }
    }
}

/// Mock token endpoint
///
/// Both grants fail until configured. Call counters and the arguments of
/// every call are recorded for assertions.
///
/// # Examples
///
/// ```
/// use listify_common::testing::MockOAuthClient;
///
/// let client = MockOAuthClient::new().with_refresh_tokens("A2", None, 3600);
/// assert_eq!(client.refresh_calls(), 0);
/// ```
#[derive(Debug)]
pub struct MockOAuthClient {
    config: OAuthConfig,
    refresh_response: Mutex<MockResponse>,
    exchange_response: Mutex<MockResponse>,
    delay: Option<Duration>,
    refresh_calls: AtomicUsize,
    exchange_calls: AtomicUsize,
    refresh_tokens_seen: Mutex<Vec<String>>,
    last_exchange: Mutex<Option<(String, String)>>,
}

impl MockOAuthClient {
    /// Create a new mock OAuth client with default state.
    pub fn new() -> Self {
        Self {
            config: test_oauth_config(),
            refresh_response: Mutex::new(MockResponse::not_configured("refresh")),
            exchange_response: Mutex::new(MockResponse::not_configured("exchange")),
            delay: None,
            refresh_calls: AtomicUsize::new(0),
            exchange_calls: AtomicUsize::new(0),
            refresh_tokens_seen: Mutex::new(Vec::new()),
            last_exchange: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: OAuthConfig) -> Self {
        self.config = config;
        self
    }

    /// Tokens returned by `refresh_access_token`
    #[must_use]
    pub fn with_refresh_tokens(
        self,
        access: &str,
        refresh: Option<&str>,
        expires_in: i64,
    ) -> Self {
        self.set_refresh_tokens(access, refresh, expires_in);
        self
    }

    /// Make `refresh_access_token` fail with an OAuth `error`
    #[must_use]
    pub fn with_refresh_failure(self, error: &str) -> Self {
        self.set_refresh_failure(error);
        self
    }

    /// Tokens returned by `exchange_code`
    #[must_use]
    pub fn with_exchange_tokens(
        self,
        access: &str,
        refresh: Option<&str>,
        expires_in: i64,
    ) -> Self {
        *self.exchange_response.lock() = MockResponse::Tokens(TokenSet::new(
            access.to_string(),
            refresh.map(str::to_string),
            expires_in,
        ));
        self
    }

    /// Make `exchange_code` fail with an OAuth `error`
    #[must_use]
    pub fn with_exchange_failure(self, error: &str) -> Self {
        *self.exchange_response.lock() = MockResponse::Failure(error.to_string());
        self
    }

    /// Sleep this long inside every call
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_refresh_tokens(&self, access: &str, refresh: Option<&str>, expires_in: i64) {
        *self.refresh_response.lock() = MockResponse::Tokens(TokenSet::new(
            access.to_string(),
            refresh.map(str::to_string),
            expires_in,
        ));
    }

    pub fn set_refresh_failure(&self, error: &str) {
        *self.refresh_response.lock() = MockResponse::Failure(error.to_string());
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    /// Refresh tokens presented to the mock, in call order
    pub fn refresh_tokens_seen(&self) -> Vec<String> {
        self.refresh_tokens_seen.lock().clone()
    }

    /// `(code, code_verifier)` of the most recent exchange
    pub fn last_exchange(&self) -> Option<(String, String)> {
        self.last_exchange.lock().clone()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for MockOAuthClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OAuthClientTrait for MockOAuthClient {
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_exchange.lock() = Some((code.to_string(), code_verifier.to_string()));
        self.pause().await;
        let response = self.exchange_response.lock().clone();
        response.into_result()
    }

    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refresh_tokens_seen.lock().push(refresh_token.to_string());
        self.pause().await;
        let response = self.refresh_response.lock().clone();
        response.into_result()
    }

    fn config(&self) -> &OAuthConfig {
        &self.config
    }
}

/// Random source replaying a fixed byte sequence
///
/// Every call continues where the previous one stopped, wrapping around at
/// the end of the sequence.
#[derive(Debug)]
pub struct FixedRandom {
    bytes: Vec<u8>,
    position: Mutex<usize>,
}

impl FixedRandom {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes, position: Mutex::new(0) }
    }
}

impl RandomBytesSource for FixedRandom {
    fn fill_bytes(&self, dest: &mut [u8]) -> CommonResult<()> {
        if self.bytes.is_empty() {
            dest.fill(0);
            return Ok(());
        }
        let mut position = self.position.lock();
        for byte in dest.iter_mut() {
            *byte = self.bytes[*position % self.bytes.len()];
            *position += 1;
        }
        Ok(())
    }
}

/// Spotify-shaped OAuth configuration pointing at the real accounts service
pub fn test_oauth_config() -> OAuthConfig {
    OAuthConfig {
        client_id: "test_client_id".to_string(),
        redirect_uri: "http://localhost:5173/callback".to_string(),
        scopes: vec!["user-read-private".to_string(), "user-read-email".to_string()],
        authorization_url: "https://accounts.spotify.com/authorize".to_string(),
        token_url: "https://accounts.spotify.com/api/token".to_string(),
    }
}
