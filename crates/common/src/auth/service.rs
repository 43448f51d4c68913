//! High-level OAuth service orchestrator
//!
//! Drives the browser side of the PKCE authorization code flow:
//! 1. [`OAuthService::start_login`] generates a verifier, stashes it in the
//!    session store and returns the provider URL to open.
//! 2. The provider redirects back; [`OAuthService::handle_callback`] parses
//!    the query and calls [`OAuthService::exchange_code`].
//! 3. The exchange trades code and verifier for tokens, hands them to
//!    [`HybridTokenStorage`], then deletes the verifier.

use std::sync::Arc;

use listify_domain::constants::{
    CODE_VERIFIER_KEY, CONTEXT_SPOTIFY_AUTH, CONTEXT_SPOTIFY_CALLBACK, CONTEXT_TOKEN_EXCHANGE,
    DASHBOARD_ROUTE,
};
use tracing::{info, instrument, warn};
use url::Url;

use super::error::{AuthError, AuthResult};
use super::hybrid::HybridTokenStorage;
use super::pkce::{self, PkceChallenge};
use super::token_manager::TokenManager;
use super::traits::Navigator;
use crate::crypto::RandomBytesSource;
use crate::observability::ErrorLog;
use crate::storage::KeyValueStore;

/// Parameters the provider appends to the redirect URI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    /// Parse a redirect query string, with or without the leading `?`
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "code" if !value.is_empty() => params.code = Some(value.into_owned()),
                "error" if !value.is_empty() => params.error = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }
}

/// OAuth service for the Spotify login flow
#[derive(Clone)]
pub struct OAuthService {
    token_manager: Arc<TokenManager>,
    session: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    rng: Arc<dyn RandomBytesSource>,
    errors: Arc<ErrorLog>,
}

impl std::fmt::Debug for OAuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthService")
            .field("token_manager", &self.token_manager)
            .finish_non_exhaustive()
    }
}

impl OAuthService {
    /// Create a new OAuth service
    ///
    /// # Arguments
    /// * `token_manager` - Owns refresh and the hybrid token storage
    /// * `session` - Page-local store holding the PKCE verifier
    /// * `navigator` - Receives the post-callback redirect
    /// * `rng` - Random source for verifier generation
    /// * `errors` - Error log for exchange and callback failures
    #[must_use]
    pub fn new(
        token_manager: Arc<TokenManager>,
        session: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
        rng: Arc<dyn RandomBytesSource>,
        errors: Arc<ErrorLog>,
    ) -> Self {
        Self { token_manager, session, navigator, rng, errors }
    }

    pub fn token_manager(&self) -> &Arc<TokenManager> {
        &self.token_manager
    }

    pub fn storage(&self) -> &Arc<HybridTokenStorage> {
        self.token_manager.storage()
    }

    /// Generate a fresh PKCE verifier/challenge pair
    ///
    /// # Errors
    /// Returns error if the random source fails
    pub fn generate_code_challenge(&self) -> AuthResult<PkceChallenge> {
        Ok(PkceChallenge::generate(self.rng.as_ref())?)
    }

    /// Authorization URL for `code_challenge`
    ///
    /// # Errors
    /// Returns error if the configured authorization URL is invalid
    pub fn get_auth_url(&self, code_challenge: &str) -> AuthResult<Url> {
        Ok(pkce::authorization_url(self.token_manager.oauth_client().config(), code_challenge)?)
    }

    /// Begin a login: stash a new verifier and return the URL to open
    ///
    /// # Errors
    /// Returns error if generation fails or the verifier cannot be stored
    pub fn start_login(&self) -> AuthResult<Url> {
        let challenge = self.generate_code_challenge()?;
        self.session.set(CODE_VERIFIER_KEY, &challenge.code_verifier)?;
        let url = self.get_auth_url(&challenge.code_challenge)?;
        info!("Spotify login started");
        Ok(url)
    }

    /// Exchange an authorization code for tokens
    ///
    /// The stashed verifier is removed only after the tokens are stored; a
    /// failed exchange leaves it in place.
    ///
    /// # Errors
    /// - `AuthError::MissingCodeVerifier` when no verifier is stashed (no
    ///   request is sent)
    /// - `AuthError::ExchangeFailed` when the provider rejects the code or
    ///   issues no refresh token
    #[instrument(skip(self, code))]
    pub async fn exchange_code(&self, code: &str) -> AuthResult<()> {
        let result = self.perform_exchange(code).await;
        if let Err(err) = &result {
            warn!(error = %err, "authorization code exchange failed");
            self.errors.log_error(err, CONTEXT_TOKEN_EXCHANGE);
        }
        result
    }

    /// Handle the provider redirect and land on the dashboard
    ///
    /// Whatever the outcome, the navigator is sent to `/dashboard`; the
    /// dashboard reads authentication state from the liveness poller.
    ///
    /// # Errors
    /// - `AuthError::AuthorizationDenied` when the provider returned `error`
    /// - `AuthError::MissingAuthorizationCode` when no code was supplied
    /// - any error from [`OAuthService::exchange_code`]
    pub async fn handle_callback(&self, query: &str) -> AuthResult<()> {
        let result = self.process_callback(CallbackParams::parse(query)).await;
        self.navigator.redirect(DASHBOARD_ROUTE);
        result
    }

    /// Refresh the access token now
    ///
    /// # Errors
    /// See [`TokenManager::refresh_token`]
    pub async fn refresh_token(&self) -> AuthResult<()> {
        self.token_manager.refresh_token().await
    }

    pub fn logout(&self) {
        self.token_manager.clear_tokens();
    }

    async fn process_callback(&self, params: CallbackParams) -> AuthResult<()> {
        if let Some(error) = params.error {
            let err = AuthError::AuthorizationDenied(error);
            self.errors.log_error(&err, CONTEXT_SPOTIFY_AUTH);
            return Err(err);
        }

        let Some(code) = params.code else {
            let err = AuthError::MissingAuthorizationCode;
            self.errors.log_error(&err, CONTEXT_SPOTIFY_AUTH);
            return Err(err);
        };

        let result = self.exchange_code(&code).await;
        if let Err(err) = &result {
            self.errors.log_error(err, CONTEXT_SPOTIFY_CALLBACK);
        }
        result
    }

    async fn perform_exchange(&self, code: &str) -> AuthResult<()> {
        let code_verifier = self
            .session
            .get(CODE_VERIFIER_KEY)?
            .filter(|verifier| !verifier.is_empty())
            .ok_or(AuthError::MissingCodeVerifier)?;

        let tokens = self
            .token_manager
            .oauth_client()
            .exchange_code(code, &code_verifier)
            .await
            .map_err(|e| AuthError::ExchangeFailed(e.to_string()))?;

        let refresh_token = tokens.refresh_token.as_deref().ok_or_else(|| {
            AuthError::ExchangeFailed("token response contained no refresh token".to_string())
        })?;

        self.storage()
            .set_tokens(&tokens.access_token, refresh_token, tokens.expires_in)
            .map_err(|err| match err {
                AuthError::InvalidTokenLifetime(_) => AuthError::ExchangeFailed(err.to_string()),
                other => other,
            })?;
        self.session.remove(CODE_VERIFIER_KEY)?;

        info!(expires_in = tokens.expires_in, "Spotify authorization completed");
        Ok(())
    }
}

#[cfg(all(test, feature = "platform"))]
mod tests {
    //! Unit tests for auth::service.
    use super::*;
    use crate::testing::{AuthHarness, MockOAuthClient};

    /// Validates `CallbackParams::parse` for typical redirect queries.
    #[test]
    fn test_callback_params_parse() {
        assert_eq!(
            CallbackParams::parse("?code=abc&state=x"),
            CallbackParams { code: Some("abc".to_string()), error: None }
        );
        assert_eq!(
            CallbackParams::parse("error=access_denied"),
            CallbackParams { code: None, error: Some("access_denied".to_string()) }
        );
        assert_eq!(CallbackParams::parse("code="), CallbackParams::default());
    }

    /// Validates `OAuthService::start_login`.
    ///
    /// Assertions:
    /// - Confirms the verifier is stashed under `spotify_code_verifier`.
    /// - Confirms the URL carries the challenge derived from that verifier.
    #[test]
    fn test_start_login_stashes_verifier() {
        let harness = AuthHarness::new(MockOAuthClient::new());
        let service = harness.service();

        let url = service.start_login().unwrap();

        let verifier = harness.session.get(CODE_VERIFIER_KEY).unwrap().unwrap();
        assert_eq!(verifier.len(), 64);
        let challenge = url
            .query_pairs()
            .find(|(k, _)| k == "code_challenge")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert_eq!(challenge, pkce::generate_code_challenge(&verifier));
    }

    /// Validates `OAuthService::exchange_code` with no stashed verifier.
    ///
    /// Assertions:
    /// - Ensures the error is `MissingCodeVerifier`.
    /// - Confirms the provider was never called.
    /// - Confirms the failure is logged under `TokenExchange`.
    #[tokio::test]
    async fn test_exchange_without_verifier_fails_fast() {
        let harness = AuthHarness::new(MockOAuthClient::new());

        let result = harness.service().exchange_code("abc").await;

        assert!(matches!(result, Err(AuthError::MissingCodeVerifier)));
        assert_eq!(harness.client.exchange_calls(), 0);
        assert_eq!(harness.errors.last_error().unwrap().context, "TokenExchange");
    }

    /// Validates that a failed exchange keeps the verifier.
    #[tokio::test]
    async fn test_failed_exchange_keeps_verifier() {
        let harness =
            AuthHarness::new(MockOAuthClient::new().with_exchange_failure("invalid_grant"));
        harness.session.set(CODE_VERIFIER_KEY, "v1").unwrap();

        let result = harness.service().exchange_code("abc").await;

        assert!(matches!(result, Err(AuthError::ExchangeFailed(_))));
        assert_eq!(harness.session.get(CODE_VERIFIER_KEY).unwrap().as_deref(), Some("v1"));
        assert!(!harness.storage.has_tokens());
    }

    /// Validates that an exchange without a refresh token is rejected.
    #[tokio::test]
    async fn test_exchange_requires_refresh_token() {
        let harness =
            AuthHarness::new(MockOAuthClient::new().with_exchange_tokens("A1", None, 3600));
        harness.session.set(CODE_VERIFIER_KEY, "v1").unwrap();

        let result = harness.service().exchange_code("abc").await;

        assert!(matches!(result, Err(AuthError::ExchangeFailed(_))));
    }

    /// Validates an exchange whose `expires_in` cannot be represented.
    ///
    /// Assertions:
    /// - Ensures the error is `ExchangeFailed` rather than a panic.
    /// - Confirms nothing is stored and the verifier is kept.
    #[tokio::test]
    async fn test_exchange_with_out_of_range_lifetime_fails() {
        let harness = AuthHarness::new(
            MockOAuthClient::new().with_exchange_tokens("A1", Some("R1"), i64::MAX),
        );
        harness.session.set(CODE_VERIFIER_KEY, "v1").unwrap();

        let result = harness.service().exchange_code("abc").await;

        assert!(matches!(result, Err(AuthError::ExchangeFailed(ref msg)) if msg.contains("range")));
        assert!(!harness.storage.has_tokens());
        assert_eq!(harness.session.get(CODE_VERIFIER_KEY).unwrap().as_deref(), Some("v1"));
    }

    /// Validates `OAuthService::handle_callback` for a provider error.
    ///
    /// Assertions:
    /// - Ensures the error is `AuthorizationDenied`.
    /// - Confirms the error is logged under `SpotifyAuth`.
    /// - Confirms the navigator lands on `/dashboard`.
    #[tokio::test]
    async fn test_callback_with_provider_error() {
        let harness = AuthHarness::new(MockOAuthClient::new());

        let result = harness.service().handle_callback("?error=access_denied").await;

        assert!(matches!(
            result,
            Err(AuthError::AuthorizationDenied(ref e)) if e == "access_denied"
        ));
        assert_eq!(harness.errors.last_error().unwrap().context, "SpotifyAuth");
        assert_eq!(harness.navigator.last_redirect().as_deref(), Some("/dashboard"));
        assert_eq!(harness.client.exchange_calls(), 0);
    }

    /// Validates `OAuthService::handle_callback` without a code.
    #[tokio::test]
    async fn test_callback_without_code() {
        let harness = AuthHarness::new(MockOAuthClient::new());

        let result = harness.service().handle_callback("?state=x").await;

        assert!(matches!(result, Err(AuthError::MissingAuthorizationCode)));
        assert_eq!(harness.errors.last_error().unwrap().context, "SpotifyAuth");
        assert_eq!(harness.navigator.last_redirect().as_deref(), Some("/dashboard"));
    }

    /// Validates the successful callback path.
    ///
    /// Assertions:
    /// - Confirms tokens are stored and the verifier is gone.
    /// - Confirms the provider received the stashed verifier.
    #[tokio::test]
    async fn test_callback_success() {
        let harness =
            AuthHarness::new(MockOAuthClient::new().with_exchange_tokens("A1", Some("R1"), 3600));
        harness.session.set(CODE_VERIFIER_KEY, "v1").unwrap();

        harness.service().handle_callback("?code=abc").await.unwrap();

        assert_eq!(harness.client.last_exchange(), Some(("abc".to_string(), "v1".to_string())));
        assert_eq!(harness.storage.usable_access_token().as_deref(), Some("A1"));
        assert!(harness.session.get(CODE_VERIFIER_KEY).unwrap().is_none());
        assert_eq!(harness.navigator.last_redirect().as_deref(), Some("/dashboard"));
        assert!(harness.errors.is_empty());
    }

    /// Validates that a failed exchange inside the callback is logged under
    /// both contexts.
    #[tokio::test]
    async fn test_callback_exchange_failure_logged() {
        let harness =
            AuthHarness::new(MockOAuthClient::new().with_exchange_failure("invalid_grant"));
        harness.session.set(CODE_VERIFIER_KEY, "v1").unwrap();

        let result = harness.service().handle_callback("?code=abc").await;

        assert!(result.is_err());
        let contexts: Vec<String> =
            harness.errors.errors().into_iter().map(|e| e.context).collect();
        assert_eq!(contexts, vec!["TokenExchange".to_string(), "SpotifyCallback".to_string()]);
    }
}
