//! Test fixture generators
//!
//! [`AuthHarness`] wires the whole token lifecycle against in-memory stores,
//! a [`MockClock`] and a [`MockOAuthClient`].

#![allow(clippy::missing_panics_doc)]

use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use super::mocks::MockOAuthClient;
use crate::auth::{
    AppNavigator, EncryptedCookieStore, HybridTokenStorage, OAuthService, TokenManager,
};
use crate::crypto::{EncryptionService, OsRandom};
use crate::observability::{ErrorLog, NoOpSink};
use crate::storage::{MemoryCookieJar, MemoryKeyValueStore};
use crate::time::MockClock;

pub const TEST_SEED: &str = "listify-test-seed";
pub const TEST_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) ListifyTest";
pub const TEST_HOSTNAME: &str = "listify.test";

/// Seconds since the epoch the harness clock starts at
pub const TEST_EPOCH_SECS: u64 = 1_700_000_000;

/// Fully wired token lifecycle for tests
pub struct AuthHarness {
    pub client: Arc<MockOAuthClient>,
    pub storage: Arc<HybridTokenStorage>,
    pub manager: Arc<TokenManager>,
    pub session: Arc<MemoryKeyValueStore>,
    pub jar: Arc<MemoryCookieJar>,
    pub navigator: Arc<AppNavigator>,
    pub errors: Arc<ErrorLog>,
    pub clock: MockClock,
}

impl AuthHarness {
    pub fn new(client: MockOAuthClient) -> Self {
        let clock = MockClock::at(UNIX_EPOCH + Duration::from_secs(TEST_EPOCH_SECS));
        let errors = Arc::new(ErrorLog::with_parts(Arc::new(NoOpSink), Arc::new(clock.clone())));
        let jar = Arc::new(MemoryCookieJar::with_clock(Arc::new(clock.clone())));
        let navigator = Arc::new(AppNavigator::new(TEST_USER_AGENT, TEST_HOSTNAME));

        let encryption =
            EncryptionService::from_fingerprint(TEST_SEED, TEST_USER_AGENT, TEST_HOSTNAME)
                .expect("SHA-256 output is always a valid AES-256 key");
        let cookies = EncryptedCookieStore::new(jar.clone(), encryption, true);
        let storage =
            Arc::new(HybridTokenStorage::new(cookies, Arc::new(clock.clone()), errors.clone()));

        let client = Arc::new(client);
        let manager = Arc::new(TokenManager::new(client.clone(), storage.clone(), errors.clone()));

        Self {
            client,
            storage,
            manager,
            session: Arc::new(MemoryKeyValueStore::new()),
            jar,
            navigator,
            errors,
            clock,
        }
    }

    /// OAuth service over the harness collaborators
    pub fn service(&self) -> OAuthService {
        OAuthService::new(
            self.manager.clone(),
            self.session.clone(),
            self.navigator.clone(),
            Arc::new(OsRandom),
            self.errors.clone(),
        )
    }
}
