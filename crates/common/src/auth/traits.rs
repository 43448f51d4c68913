//! Traits for OAuth and host-environment operations
//!
//! These traits enable dependency injection and testing by abstracting
//! external dependencies (the token endpoint, the hosting page).

use async_trait::async_trait;

use super::client::OAuthClientError;
use super::types::{OAuthConfig, TokenSet};

/// Trait for OAuth client operations
///
/// This trait abstracts the token endpoint so the token manager and service
/// can be exercised against mock implementations.
#[async_trait]
pub trait OAuthClientTrait: Send + Sync {
    /// Exchange authorization code for tokens
    ///
    /// # Arguments
    /// * `code` - Authorization code from redirect callback
    /// * `code_verifier` - PKCE verifier stashed when the login started
    ///
    /// # Errors
    /// Returns error if the request fails, the provider rejects the grant,
    /// or the response carries no access token
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenSet, OAuthClientError>;

    /// Refresh access token using refresh token
    ///
    /// # Returns
    /// New `TokenSet`; `refresh_token` is only set when the provider rotated it
    ///
    /// # Errors
    /// Returns error if refresh fails or token is invalid/revoked
    async fn refresh_access_token(&self, refresh_token: &str)
        -> Result<TokenSet, OAuthClientError>;

    fn config(&self) -> &OAuthConfig;
}

/// The environment hosting the session: fingerprint inputs for cookie key
/// derivation, and route changes.
pub trait Navigator: Send + Sync {
    fn user_agent(&self) -> String;

    fn hostname(&self) -> String;

    /// Send the user to an application route (e.g. `/auth/login`)
    fn redirect(&self, route: &str);
}
