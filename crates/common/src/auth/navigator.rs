//! Application navigator
//!
//! Holds the client fingerprint used for cookie key derivation and publishes
//! route changes on a watch channel so the shell can follow them.

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::info;

use super::traits::Navigator;

#[derive(Debug)]
pub struct AppNavigator {
    user_agent: String,
    hostname: String,
    route: watch::Sender<Option<String>>,
    history: Mutex<Vec<String>>,
}

impl AppNavigator {
    pub fn new(user_agent: impl Into<String>, hostname: impl Into<String>) -> Self {
        let (route, _) = watch::channel(None);
        Self {
            user_agent: user_agent.into(),
            hostname: hostname.into(),
            route,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Receiver that observes every redirect
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.route.subscribe()
    }

    pub fn last_redirect(&self) -> Option<String> {
        self.route.borrow().clone()
    }

    /// All redirects in the order they happened
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }
}

impl Navigator for AppNavigator {
    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    fn hostname(&self) -> String {
        self.hostname.clone()
    }

    fn redirect(&self, route: &str) {
        info!(route, "navigating");
        self.history.lock().push(route.to_string());
        self.route.send_replace(Some(route.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_updates_last_route_and_history() {
        let navigator = AppNavigator::new("Mozilla/5.0", "listify.app");
        let receiver = navigator.subscribe();

        navigator.redirect("/dashboard");
        navigator.redirect("/auth/login");

        assert_eq!(navigator.last_redirect().as_deref(), Some("/auth/login"));
        assert_eq!(receiver.borrow().as_deref(), Some("/auth/login"));
        assert_eq!(navigator.history(), vec!["/dashboard", "/auth/login"]);
        assert_eq!(navigator.hostname(), "listify.app");
    }
}
