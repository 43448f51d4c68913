//! Process-lifetime access token cache
//!
//! The access token never leaves memory; a restart drops it and the session
//! is restored from the refresh token instead.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct MemoryTokenCache {
    inner: RwLock<Option<CachedToken>>,
}

impl MemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, access_token: &str, expires_at: DateTime<Utc>) {
        *self.inner.write() =
            Some(CachedToken { access_token: access_token.to_string(), expires_at });
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.read().as_ref().map(|cached| cached.access_token.clone())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().as_ref().map(|cached| cached.expires_at)
    }

    pub fn clear(&self) {
        *self.inner.write() = None;
    }
}
