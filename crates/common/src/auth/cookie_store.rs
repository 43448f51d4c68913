//! Encrypted cookie persistence for the refresh token
//!
//! Values are AES-256-GCM encrypted with a key derived from the application
//! seed and the client fingerprint, then written with the session cookie
//! attributes (path `/`, 30 days, `SameSite=Strict`, `Secure` when
//! configured).

use std::sync::Arc;
use std::time::Duration;

use listify_domain::constants::{COOKIE_MAX_AGE_DAYS, COOKIE_PATH};

use super::error::{AuthError, AuthResult};
use super::traits::Navigator;
use crate::crypto::EncryptionService;
use crate::error::CommonResult;
use crate::storage::{CookieAttributes, CookieStore, SameSite};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug)]
pub struct EncryptedCookieStore {
    cookies: Arc<dyn CookieStore>,
    encryption: EncryptionService,
    attributes: CookieAttributes,
}

impl EncryptedCookieStore {
    pub fn new(cookies: Arc<dyn CookieStore>, encryption: EncryptionService, secure: bool) -> Self {
        let max_age = Duration::from_secs(COOKIE_MAX_AGE_DAYS.unsigned_abs() * SECONDS_PER_DAY);
        let attributes = CookieAttributes {
            max_age: Some(max_age),
            secure,
            same_site: SameSite::Strict,
            path: COOKIE_PATH.to_string(),
        };
        Self { cookies, encryption, attributes }
    }

    /// Derive the cookie key from `seed` and the navigator's fingerprint
    ///
    /// # Errors
    /// Returns error if the key cannot be constructed
    pub fn for_client(
        cookies: Arc<dyn CookieStore>,
        seed: &str,
        navigator: &dyn Navigator,
        secure: bool,
    ) -> CommonResult<Self> {
        let user_agent = navigator.user_agent();
        let hostname = navigator.hostname();
        let encryption = EncryptionService::from_fingerprint(seed, &user_agent, &hostname)?;
        Ok(Self::new(cookies, encryption, secure))
    }

    /// Encrypt `plaintext` and write it under `name`
    ///
    /// # Errors
    /// Returns error if encryption or the cookie write fails
    pub fn set(&self, name: &str, plaintext: &str) -> CommonResult<()> {
        let ciphertext = self.encryption.encrypt_to_string(plaintext.as_bytes())?;
        self.cookies.set(name, &ciphertext, &self.attributes)
    }

    /// Read and decrypt `name`
    ///
    /// `Ok(None)` when the cookie is absent or decrypts to an empty value.
    ///
    /// # Errors
    /// `AuthError::DecryptionFailed` when the ciphertext does not decrypt
    /// under the current key; `AuthError::Storage` when the jar fails
    pub fn get(&self, name: &str) -> AuthResult<Option<String>> {
        let Some(ciphertext) = self.cookies.get(name)? else {
            return Ok(None);
        };

        let bytes = self
            .encryption
            .decrypt_from_string(&ciphertext)
            .map_err(|e| AuthError::DecryptionFailed(e.to_string()))?;
        let plaintext =
            String::from_utf8(bytes).map_err(|e| AuthError::DecryptionFailed(e.to_string()))?;

        Ok(Some(plaintext).filter(|value| !value.is_empty()))
    }

    /// Whether a cookie named `name` exists, without decrypting it
    ///
    /// # Errors
    /// Returns error if the jar fails
    pub fn contains(&self, name: &str) -> CommonResult<bool> {
        Ok(self.cookies.get(name)?.is_some())
    }

    /// # Errors
    /// Returns error if the jar fails
    pub fn remove(&self, name: &str) -> CommonResult<()> {
        self.cookies.remove(name, &self.attributes.path)
    }

    pub fn attributes(&self) -> &CookieAttributes {
        &self.attributes
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::cookie_store.
    use super::*;
    use crate::storage::MemoryCookieJar;

    fn store_with_key(jar: Arc<MemoryCookieJar>, host: &str) -> EncryptedCookieStore {
        let encryption = EncryptionService::from_fingerprint("seed", "Mozilla/5.0", host).unwrap();
        EncryptedCookieStore::new(jar, encryption, true)
    }

    /// Validates the encrypted round trip and the at-rest ciphertext.
    ///
    /// Assertions:
    /// - Confirms the raw cookie value is not the plaintext.
    /// - Confirms `get` returns the plaintext.
    /// - Confirms the cookie attributes.
    #[test]
    fn set_then_get_round_trips_encrypted() {
        let jar = Arc::new(MemoryCookieJar::new());
        let store = store_with_key(jar.clone(), "listify.app");

        store.set("spotify_refresh_token", "R1").unwrap();

        let raw = jar.get("spotify_refresh_token").unwrap().unwrap();
        assert_ne!(raw, "R1");
        assert_eq!(store.get("spotify_refresh_token").unwrap().as_deref(), Some("R1"));

        let attrs = jar.attributes("spotify_refresh_token").unwrap();
        assert_eq!(attrs.max_age, Some(Duration::from_secs(30 * 24 * 60 * 60)));
        assert_eq!(attrs.same_site, SameSite::Strict);
        assert_eq!(attrs.path, "/");
        assert!(attrs.secure);
    }

    /// Validates that a cookie written under another fingerprint does not
    /// decrypt.
    ///
    /// Assertions:
    /// - Ensures `get` reports `DecryptionFailed`.
    #[test]
    fn foreign_ciphertext_fails_to_decrypt() {
        let jar = Arc::new(MemoryCookieJar::new());
        store_with_key(jar.clone(), "listify.app").set("c", "R1").unwrap();

        let other = store_with_key(jar, "other.host");
        assert!(matches!(other.get("c"), Err(AuthError::DecryptionFailed(_))));
    }

    /// Validates that an empty plaintext reads as absent.
    #[test]
    fn empty_plaintext_reads_as_none() {
        let jar = Arc::new(MemoryCookieJar::new());
        let store = store_with_key(jar, "listify.app");
        store.set("c", "").unwrap();

        assert!(store.get("c").unwrap().is_none());
        assert!(store.contains("c").unwrap());
    }
}
