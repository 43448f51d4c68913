//! Hybrid token storage
//!
//! The single owner of Spotify token state. The access token and its expiry
//! live in a [`MemoryTokenCache`]; the refresh token and the absolute expiry
//! are persisted through an [`EncryptedCookieStore`] so a reload can restore
//! the session.
//!
//! Reads never fail: an unreadable refresh cookie is logged under
//! `TokenDecryption` and reported as absent.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use listify_domain::constants::{
    CONTEXT_TOKEN_DECRYPTION, CONTEXT_TOKEN_STORAGE, EXPIRES_AT_COOKIE,
    LEGACY_ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, TOKEN_EXPIRY_SKEW_SECS,
};
use tracing::{debug, warn};

use super::cookie_store::EncryptedCookieStore;
use super::error::{AuthError, AuthResult};
use super::memory_cache::MemoryTokenCache;
use crate::observability::ErrorLog;
use crate::time::Clock;

pub struct HybridTokenStorage {
    memory: MemoryTokenCache,
    cookies: EncryptedCookieStore,
    clock: Arc<dyn Clock>,
    errors: Arc<ErrorLog>,
}

impl std::fmt::Debug for HybridTokenStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridTokenStorage")
            .field("has_access_token", &self.has_access_token())
            .field("expires_at", &self.memory.expires_at())
            .finish_non_exhaustive()
    }
}

impl HybridTokenStorage {
    pub fn new(
        cookies: EncryptedCookieStore,
        clock: Arc<dyn Clock>,
        errors: Arc<ErrorLog>,
    ) -> Self {
        Self { memory: MemoryTokenCache::new(), cookies, clock, errors }
    }

    /// Store a freshly issued token pair
    ///
    /// The access token and `now + expires_in` go to memory; the refresh
    /// token and the absolute expiry (epoch millis) are written encrypted.
    ///
    /// # Errors
    /// - `AuthError::InvalidTokenLifetime` when `expires_in` is negative or
    ///   the resulting instant is out of range; nothing is stored
    /// - `AuthError::Storage` if a cookie write fails (memory is updated
    ///   regardless)
    pub fn set_tokens(
        &self,
        access_token: &str,
        refresh_token: &str,
        expires_in: i64,
    ) -> AuthResult<()> {
        let expires_at = (expires_in >= 0)
            .then(|| Duration::try_seconds(expires_in))
            .flatten()
            .and_then(|lifetime| self.clock.utc_now().checked_add_signed(lifetime))
            .ok_or(AuthError::InvalidTokenLifetime(expires_in))?;
        self.memory.set(access_token, expires_at);

        let persisted = self
            .cookies
            .set(REFRESH_TOKEN_COOKIE, refresh_token)
            .and_then(|()| {
                self.cookies.set(EXPIRES_AT_COOKIE, &expires_at.timestamp_millis().to_string())
            });

        if let Err(err) = persisted {
            self.errors.log_error(&err, CONTEXT_TOKEN_STORAGE);
            return Err(AuthError::Storage(err));
        }

        debug!(%expires_at, "stored spotify tokens");
        Ok(())
    }

    /// Access token from memory, regardless of expiry
    pub fn get_access_token(&self) -> Option<String> {
        self.memory.access_token()
    }

    /// Decrypted refresh token, or `None` when absent or unreadable
    pub fn get_refresh_token(&self) -> Option<String> {
        self.read_cookie(REFRESH_TOKEN_COOKIE)
    }

    /// Absolute expiry recorded in the cookie at issuance
    pub fn persisted_expiry(&self) -> Option<DateTime<Utc>> {
        let millis = self.read_cookie(EXPIRES_AT_COOKIE)?.parse::<i64>().ok()?;
        Utc.timestamp_millis_opt(millis).single()
    }

    /// Expiry of the in-memory access token
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.memory.expires_at()
    }

    /// True when no expiry is known or `now >= expires_at - 5 min`
    pub fn is_expired(&self) -> bool {
        match self.memory.expires_at() {
            Some(expires_at) => {
                self.clock.utc_now() >= expires_at - Duration::seconds(TOKEN_EXPIRY_SKEW_SECS)
            }
            None => true,
        }
    }

    pub fn has_access_token(&self) -> bool {
        self.memory.access_token().is_some()
    }

    /// Whether a refresh cookie is present (not whether it decrypts)
    pub fn has_refresh_token(&self) -> bool {
        match self.cookies.contains(REFRESH_TOKEN_COOKIE) {
            Ok(present) => present,
            Err(err) => {
                self.errors.log_error(&err, CONTEXT_TOKEN_STORAGE);
                false
            }
        }
    }

    /// The access token if present and outside the expiry skew
    pub fn usable_access_token(&self) -> Option<String> {
        if self.is_expired() {
            return None;
        }
        self.memory.access_token()
    }

    /// Usable access token, or at least a refresh token to restore from
    pub fn has_tokens(&self) -> bool {
        self.usable_access_token().is_some() || self.has_refresh_token()
    }

    /// Wipe memory and every related cookie, including the legacy access
    /// token cookie. Safe to call repeatedly.
    pub fn clear(&self) {
        self.memory.clear();
        for name in [REFRESH_TOKEN_COOKIE, EXPIRES_AT_COOKIE, LEGACY_ACCESS_TOKEN_COOKIE] {
            if let Err(err) = self.cookies.remove(name) {
                warn!(cookie = name, error = %err, "failed to remove token cookie");
                self.errors.log_error(&err, CONTEXT_TOKEN_STORAGE);
            }
        }
        debug!("cleared spotify tokens");
    }

    fn read_cookie(&self, name: &str) -> Option<String> {
        match self.cookies.get(name) {
            Ok(value) => value,
            Err(err) => {
                let context = match &err {
                    AuthError::DecryptionFailed(_) => CONTEXT_TOKEN_DECRYPTION,
                    _ => CONTEXT_TOKEN_STORAGE,
                };
                warn!(cookie = name, error = %err, "unreadable token cookie");
                self.errors.log_error(&err, context);
                None
            }
        }
    }
}
