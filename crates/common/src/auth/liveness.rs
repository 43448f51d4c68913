//! Auth liveness poller
//!
//! Keeps an `authenticated` flag current for the UI. A check runs on start
//! and then every 60 seconds:
//! - usable access token: authenticated
//! - otherwise a refresh token: refresh; success is authenticated, failure
//!   logs `AuthRestore`, clears tokens and is not authenticated
//! - otherwise: not authenticated, without touching the network
//!
//! Stopping (or dropping) the poller cancels the timer. A check already in
//! flight is allowed to settle, but its result is not published.

use std::sync::{Arc, Weak};
use std::time::Duration;

use listify_domain::constants::{CONTEXT_AUTH_RESTORE, LIVENESS_POLL_INTERVAL_SECS};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::token_manager::TokenManager;
use crate::observability::ErrorLog;

/// Snapshot published to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthStatus {
    pub authenticated: bool,
    /// True until the first check completes
    pub loading: bool,
}

impl AuthStatus {
    const INITIAL: Self = Self { authenticated: false, loading: true };
}

pub struct AuthLivenessPoller {
    token_manager: Arc<TokenManager>,
    errors: Arc<ErrorLog>,
    status: watch::Sender<AuthStatus>,
    interval: Duration,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for AuthLivenessPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthLivenessPoller")
            .field("status", &*self.status.borrow())
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl AuthLivenessPoller {
    pub fn new(token_manager: Arc<TokenManager>, errors: Arc<ErrorLog>) -> Arc<Self> {
        Self::with_interval(
            token_manager,
            errors,
            Duration::from_secs(LIVENESS_POLL_INTERVAL_SECS),
        )
    }

    pub fn with_interval(
        token_manager: Arc<TokenManager>,
        errors: Arc<ErrorLog>,
        interval: Duration,
    ) -> Arc<Self> {
        let (status, _) = watch::channel(AuthStatus::INITIAL);
        Arc::new(Self {
            token_manager,
            errors,
            status,
            interval,
            cancel: CancellationToken::new(),
            task: Mutex::new(None),
        })
    }

    /// Spawn the polling task; the first check runs immediately
    ///
    /// Calling `start` on a running poller is a no-op. The task holds only
    /// a weak reference, so dropping the last `Arc` ends it.
    pub fn start(self: &Arc<Self>) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) || self.cancel.is_cancelled()
        {
            return;
        }

        let weak = Arc::downgrade(self);
        let cancel = self.cancel.clone();
        let interval = self.interval;
        *task = Some(tokio::spawn(run(weak, cancel, interval)));
        info!(interval_secs = interval.as_secs(), "auth liveness poller started");
    }

    /// Cancel the timer. An in-flight check settles unpublished.
    pub fn stop(&self) {
        self.cancel.cancel();
        debug!("auth liveness poller stopped");
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
            && self.task.lock().as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Run one check now and publish the result
    pub async fn check_now(&self) -> AuthStatus {
        let authenticated = self.evaluate().await;
        self.publish(authenticated)
    }

    /// Clear tokens and flip to not-authenticated locally
    pub fn logout(&self) {
        self.token_manager.clear_tokens();
        self.publish(false);
    }

    pub fn status(&self) -> AuthStatus {
        *self.status.borrow()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status().authenticated
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.status.subscribe()
    }

    fn publish(&self, authenticated: bool) -> AuthStatus {
        let status = AuthStatus { authenticated, loading: false };
        self.status.send_replace(status);
        status
    }

    async fn evaluate(&self) -> bool {
        let storage = self.token_manager.storage();
        if storage.usable_access_token().is_some() {
            return true;
        }

        if !storage.has_refresh_token() {
            return false;
        }

        match self.token_manager.ensure_fresh().await {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "could not restore spotify session");
                self.errors.log_error(&err, CONTEXT_AUTH_RESTORE);
                self.token_manager.clear_tokens();
                false
            }
        }
    }
}

impl Drop for AuthLivenessPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(poller: Weak<AuthLivenessPoller>, cancel: CancellationToken, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let Some(poller) = poller.upgrade() else { break };
        let authenticated = poller.evaluate().await;
        if cancel.is_cancelled() {
            break;
        }
        poller.publish(authenticated);
    }
}

#[cfg(all(test, feature = "platform"))]
mod tests {
    //! Unit tests for auth::liveness.
    use super::*;
    use crate::testing::{AuthHarness, MockOAuthClient};

    fn poller(harness: &AuthHarness) -> Arc<AuthLivenessPoller> {
        AuthLivenessPoller::new(harness.manager.clone(), harness.errors.clone())
    }

    /// Validates the initial status before any check.
    #[tokio::test]
    async fn test_initial_status_is_loading() {
        let harness = AuthHarness::new(MockOAuthClient::new());
        let poller = poller(&harness);

        assert_eq!(poller.status(), AuthStatus { authenticated: false, loading: true });
    }

    /// Validates `AuthLivenessPoller::check_now` with nothing stored.
    ///
    /// Assertions:
    /// - Confirms not-authenticated with loading cleared.
    /// - Confirms no token endpoint call was made.
    #[tokio::test]
    async fn test_check_with_nothing_stored() {
        let harness = AuthHarness::new(MockOAuthClient::new());
        let poller = poller(&harness);

        let status = poller.check_now().await;

        assert_eq!(status, AuthStatus { authenticated: false, loading: false });
        assert_eq!(harness.client.refresh_calls(), 0);
        assert!(harness.errors.is_empty());
    }

    /// Validates that a usable token is authenticated without a refresh.
    #[tokio::test]
    async fn test_check_with_usable_token() {
        let harness = AuthHarness::new(MockOAuthClient::new());
        harness.storage.set_tokens("A1", "R1", 3600).unwrap();

        assert!(poller(&harness).check_now().await.authenticated);
        assert_eq!(harness.client.refresh_calls(), 0);
    }

    /// Validates session restore from the refresh token.
    #[tokio::test]
    async fn test_check_restores_from_refresh_token() {
        let harness =
            AuthHarness::new(MockOAuthClient::new().with_refresh_tokens("A2", None, 3600));
        harness.storage.set_tokens("A1", "R1", 3600).unwrap();
        harness.clock.advance_secs(3600);

        assert!(poller(&harness).check_now().await.authenticated);
        assert_eq!(harness.client.refresh_calls(), 1);
        assert_eq!(harness.storage.usable_access_token().as_deref(), Some("A2"));
    }

    /// Validates the failed restore path.
    ///
    /// Assertions:
    /// - Confirms not-authenticated.
    /// - Confirms tokens were cleared.
    /// - Confirms an `AuthRestore` entry was logged.
    #[tokio::test]
    async fn test_check_failed_restore_clears_tokens() {
        let harness =
            AuthHarness::new(MockOAuthClient::new().with_refresh_failure("invalid_grant"));
        harness.storage.set_tokens("A1", "R1", 60).unwrap();

        let status = poller(&harness).check_now().await;

        assert!(!status.authenticated);
        assert!(!harness.storage.has_tokens());
        assert_eq!(harness.errors.last_error().unwrap().context, "AuthRestore");
    }

    /// Validates `AuthLivenessPoller::logout`.
    #[tokio::test]
    async fn test_logout_flips_status_locally() {
        let harness = AuthHarness::new(MockOAuthClient::new());
        harness.storage.set_tokens("A1", "R1", 3600).unwrap();
        let poller = poller(&harness);
        poller.check_now().await;

        poller.logout();

        assert!(!poller.is_authenticated());
        assert!(!harness.storage.has_tokens());
        assert_eq!(harness.client.refresh_calls(), 0);
    }

    /// Validates that the spawned task runs the first check immediately and
    /// stops on request.
    #[tokio::test]
    async fn test_start_runs_initial_check_then_stop() {
        let harness = AuthHarness::new(MockOAuthClient::new());
        harness.storage.set_tokens("A1", "R1", 3600).unwrap();
        let poller = poller(&harness);
        let mut updates = poller.subscribe();

        poller.start();
        tokio::time::timeout(Duration::from_secs(1), updates.changed()).await.unwrap().unwrap();

        assert_eq!(*updates.borrow(), AuthStatus { authenticated: true, loading: false });
        assert!(poller.is_running());

        poller.stop();
        assert!(!poller.is_running());
    }
}
