//! Token manager with single-flight refresh
//!
//! Manages the Spotify access token lifecycle:
//! - Silent refresh from the stored refresh token
//! - Pre-request freshness checks that share one in-flight refresh
//! - Refresh after a 401, skipped when another task already replaced the
//!   rejected token
//!
//! Every refresh runs under one async mutex. Callers that only need a fresh
//! token re-check storage after acquiring it, so a burst of requests with an
//! expired token triggers a single round-trip to the token endpoint.

use std::sync::Arc;

use listify_domain::constants::CONTEXT_TOKEN_REFRESH;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::error::{AuthError, AuthResult};
use super::hybrid::HybridTokenStorage;
use super::traits::OAuthClientTrait;
use crate::observability::ErrorLog;

pub struct TokenManager {
    oauth_client: Arc<dyn OAuthClientTrait>,
    storage: Arc<HybridTokenStorage>,
    errors: Arc<ErrorLog>,
    refresh_guard: Mutex<()>,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager").field("storage", &self.storage).finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Create a new token manager
    ///
    /// # Arguments
    /// * `oauth_client` - Token endpoint client used for refresh
    /// * `storage` - Hybrid storage owning the token state
    /// * `errors` - Error log receiving `TokenRefresh` failures
    #[must_use]
    pub fn new(
        oauth_client: Arc<dyn OAuthClientTrait>,
        storage: Arc<HybridTokenStorage>,
        errors: Arc<ErrorLog>,
    ) -> Self {
        Self { oauth_client, storage, errors, refresh_guard: Mutex::new(()) }
    }

    pub fn storage(&self) -> &Arc<HybridTokenStorage> {
        &self.storage
    }

    pub fn oauth_client(&self) -> &Arc<dyn OAuthClientTrait> {
        &self.oauth_client
    }

    /// Trade the stored refresh token for a new access token
    ///
    /// Always contacts the token endpoint. The provider's rotated refresh
    /// token replaces the stored one; when none is returned the previous
    /// token is kept.
    ///
    /// # Errors
    /// - `AuthError::NoRefreshToken` when nothing usable is stored
    /// - `AuthError::RefreshFailed` for any provider or transport failure
    pub async fn refresh_token(&self) -> AuthResult<()> {
        let _guard = self.refresh_guard.lock().await;
        self.refresh_locked().await
    }

    /// Make sure a usable access token is cached
    ///
    /// Returns `Ok(true)` when a refresh was performed and `Ok(false)` when
    /// the cached token was already usable (possibly because a concurrent
    /// caller refreshed while this one waited).
    ///
    /// # Errors
    /// See [`TokenManager::refresh_token`]
    pub async fn ensure_fresh(&self) -> AuthResult<bool> {
        if self.storage.usable_access_token().is_some() {
            return Ok(false);
        }

        let _guard = self.refresh_guard.lock().await;
        if self.storage.usable_access_token().is_some() {
            debug!("access token refreshed by a concurrent caller");
            return Ok(false);
        }

        self.refresh_locked().await?;
        Ok(true)
    }

    /// Refresh after the API rejected `rejected`
    ///
    /// If another task has already replaced the rejected token with a usable
    /// one, no refresh is made and `Ok(false)` is returned.
    ///
    /// # Errors
    /// See [`TokenManager::refresh_token`]
    pub async fn refresh_rejected(&self, rejected: Option<&str>) -> AuthResult<bool> {
        let _guard = self.refresh_guard.lock().await;

        let current = self.storage.usable_access_token();
        if current.is_some() && current.as_deref() != rejected {
            debug!("rejected access token already replaced");
            return Ok(false);
        }

        self.refresh_locked().await?;
        Ok(true)
    }

    /// Clear all tokens (logout)
    pub fn clear_tokens(&self) {
        self.storage.clear();
        info!("Spotify tokens cleared");
    }

    async fn refresh_locked(&self) -> AuthResult<()> {
        let result = self.perform_refresh().await;
        if let Err(err) = &result {
            warn!(error = %err, "token refresh failed");
            self.errors.log_error(err, CONTEXT_TOKEN_REFRESH);
        }
        result
    }

    async fn perform_refresh(&self) -> AuthResult<()> {
        let refresh_token = self.storage.get_refresh_token().ok_or(AuthError::NoRefreshToken)?;

        let tokens = self
            .oauth_client
            .refresh_access_token(&refresh_token)
            .await
            .map_err(|e| AuthError::RefreshFailed(e.to_string()))?;

        let next_refresh_token = tokens.refresh_token.as_deref().unwrap_or(&refresh_token);
        self.storage
            .set_tokens(&tokens.access_token, next_refresh_token, tokens.expires_in)
            .map_err(|err| match err {
                AuthError::InvalidTokenLifetime(_) => AuthError::RefreshFailed(err.to_string()),
                other => other,
            })?;

        info!(
            expires_in = tokens.expires_in,
            rotated = tokens.refresh_token.is_some(),
            "Successfully refreshed access token"
        );
        Ok(())
    }
}
