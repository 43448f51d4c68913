//! Bearer credentials for the Listify backend

use listify_core::SessionStore;

/// Source of the first-party bearer token
///
/// Allows the API client to be exercised with fixed tokens in tests.
pub trait AccessTokenProvider: Send + Sync {
    /// Current bearer token, `None` when signed out
    fn access_token(&self) -> Option<String>;
}

impl AccessTokenProvider for SessionStore {
    fn access_token(&self) -> Option<String> {
        self.token()
    }
}

/// Provider holding a fixed token
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider(pub Option<String>);

impl AccessTokenProvider for StaticTokenProvider {
    fn access_token(&self) -> Option<String> {
        self.0.clone()
    }
}
