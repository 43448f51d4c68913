//! Application composition root
//!
//! Wires the token lifecycle, the first-party session and both API clients
//! into one [`ListifyApp`]. Every collaborator shares the same [`ErrorLog`],
//! clock and navigator.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use listify_common::auth::{
    AppNavigator, AuthLivenessPoller, EncryptedCookieStore, HybridTokenStorage, OAuthClient,
    OAuthClientTrait, OAuthConfig, OAuthService, TokenManager,
};
use listify_common::crypto::OsRandom;
use listify_common::observability::ErrorLog;
use listify_common::storage::{CookieStore, KeyValueStore, MemoryCookieJar, MemoryKeyValueStore};
use listify_common::time::{Clock, SystemClock};
use listify_core::{LibraryService, SessionService, SessionStore};
use listify_domain::{ListifyConfig, Result};
use tracing::info;

use crate::api::ListifyApiClient;
use crate::http::HttpClient;
use crate::integrations::spotify::SpotifyApiClient;
use crate::storage::{FileCookieJar, FileKeyValueStore};

const DEFAULT_USER_AGENT: &str = concat!("listify/", env!("CARGO_PKG_VERSION"));
const DEFAULT_HOSTNAME: &str = "localhost";
const COOKIE_FILE: &str = "cookies.json";
const STATE_FILE: &str = "state.json";

/// Fully wired client application
pub struct ListifyApp {
    pub config: ListifyConfig,
    pub errors: Arc<ErrorLog>,
    pub navigator: Arc<AppNavigator>,
    pub tokens: Arc<TokenManager>,
    pub oauth: Arc<OAuthService>,
    pub liveness: Arc<AuthLivenessPoller>,
    pub session: Arc<SessionService>,
    pub library: Arc<LibraryService>,
    pub spotify: Arc<SpotifyApiClient>,
    pub api: Arc<ListifyApiClient>,
}

impl std::fmt::Debug for ListifyApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListifyApp")
            .field("api_base_url", &self.config.api.base_url)
            .field("spotify_api_url", &self.config.spotify.api_url)
            .finish_non_exhaustive()
    }
}

impl ListifyApp {
    pub fn builder(config: ListifyConfig) -> ListifyAppBuilder {
        ListifyAppBuilder::new(config)
    }

    /// Start the background liveness check
    pub fn start(&self) {
        self.liveness.start();
    }

    /// Stop background work; stored state is left untouched
    pub fn shutdown(&self) {
        self.liveness.stop();
    }

    /// Sign out of both the Spotify connection and the Listify account
    ///
    /// # Errors
    /// Returns error if the stored session cannot be removed
    pub fn sign_out(&self) -> Result<()> {
        self.liveness.logout();
        self.session.logout()
    }
}

/// Builder for [`ListifyApp`]
pub struct ListifyAppBuilder {
    config: ListifyConfig,
    user_agent: String,
    hostname: String,
    data_dir: Option<PathBuf>,
    oauth_client: Option<Arc<dyn OAuthClientTrait>>,
    clock: Arc<dyn Clock>,
    liveness_interval: Option<Duration>,
}

impl ListifyAppBuilder {
    pub fn new(config: ListifyConfig) -> Self {
        Self {
            config,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            hostname: DEFAULT_HOSTNAME.to_string(),
            data_dir: None,
            oauth_client: None,
            clock: Arc::new(SystemClock),
            liveness_interval: None,
        }
    }

    /// User agent sent on HTTP requests and mixed into the cookie key
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Host name mixed into the cookie key
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Persist cookies and session state under `dir` instead of in memory
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Replace the token endpoint client
    pub fn oauth_client(mut self, client: Arc<dyn OAuthClientTrait>) -> Self {
        self.oauth_client = Some(client);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Override the liveness poll period
    pub fn liveness_interval(mut self, interval: Duration) -> Self {
        self.liveness_interval = Some(interval);
        self
    }

    /// Validate the configuration and wire every component
    ///
    /// # Errors
    /// Returns `ListifyError::Config` for invalid configuration and
    /// `ListifyError::Storage` if persisted state cannot be opened
    pub fn build(self) -> Result<ListifyApp> {
        self.config.validate()?;

        let errors = Arc::new(ErrorLog::new());
        let navigator = Arc::new(AppNavigator::new(&self.user_agent, &self.hostname));
        let (jar, state) = self.open_stores()?;

        let cookies = EncryptedCookieStore::for_client(
            jar,
            &self.config.security.encryption_seed,
            navigator.as_ref(),
            self.config.security.secure_cookies,
        )?;
        let storage =
            Arc::new(HybridTokenStorage::new(cookies, self.clock.clone(), errors.clone()));

        let oauth_client: Arc<dyn OAuthClientTrait> = match self.oauth_client {
            Some(client) => client,
            None => Arc::new(OAuthClient::with_timeout(
                OAuthConfig::from(&self.config.spotify),
                self.config.http.timeout_secs.map(Duration::from_secs),
            )),
        };
        let tokens = Arc::new(TokenManager::new(oauth_client, storage, errors.clone()));

        let oauth = Arc::new(OAuthService::new(
            tokens.clone(),
            state.clone(),
            navigator.clone(),
            Arc::new(OsRandom),
            errors.clone(),
        ));
        let liveness = match self.liveness_interval {
            Some(interval) => {
                AuthLivenessPoller::with_interval(tokens.clone(), errors.clone(), interval)
            }
            None => AuthLivenessPoller::new(tokens.clone(), errors.clone()),
        };

        let http = HttpClient::configured(&self.config.http).user_agent(&self.user_agent).build()?;
        let session_store = Arc::new(SessionStore::new(state, errors.clone()));
        let api = Arc::new(ListifyApiClient::new(
            &self.config.api,
            http.clone(),
            session_store.clone(),
        )?);
        let spotify = Arc::new(SpotifyApiClient::new(
            &self.config.spotify,
            http,
            tokens.clone(),
            navigator.clone(),
        )?);

        let session =
            Arc::new(SessionService::new(api.clone(), session_store.clone(), errors.clone()));
        let library = Arc::new(LibraryService::new(
            api.clone(),
            spotify.clone(),
            session_store,
            errors.clone(),
        ));

        info!(
            api = %self.config.api.base_url,
            persistent = self.data_dir.is_some(),
            "Listify client initialised"
        );

        Ok(ListifyApp {
            config: self.config,
            errors,
            navigator,
            tokens,
            oauth,
            liveness,
            session,
            library,
            spotify,
            api,
        })
    }

    fn open_stores(&self) -> Result<(Arc<dyn CookieStore>, Arc<dyn KeyValueStore>)> {
        match &self.data_dir {
            Some(dir) => {
                let jar = FileCookieJar::open(dir.join(COOKIE_FILE), self.clock.clone())?;
                let state = FileKeyValueStore::open(dir.join(STATE_FILE))?;
                Ok((Arc::new(jar), Arc::new(state)))
            }
            None => Ok((
                Arc::new(MemoryCookieJar::with_clock(self.clock.clone())),
                Arc::new(MemoryKeyValueStore::new()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for bootstrap.
    use listify_common::auth::Navigator;
    use listify_common::testing::MockOAuthClient;
    use listify_common::time::MockClock;
    use listify_domain::{ApiConfig, ListifyError, SecurityConfig, SpotifyConfig};
    use tempfile::TempDir;

    use super::*;

    fn config() -> ListifyConfig {
        ListifyConfig {
            spotify: SpotifyConfig::new("client-123", "http://localhost:5173/callback"),
            api: ApiConfig { base_url: "http://localhost:3000/api".to_string() },
            security: SecurityConfig {
                encryption_seed: "seed".to_string(),
                secure_cookies: true,
            },
            http: listify_domain::HttpConfig::default(),
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = config();
        config.security.encryption_seed.clear();

        let err = ListifyApp::builder(config).build().unwrap_err();
        assert!(matches!(err, ListifyError::Config(_)));
    }

    /// Validates the default wiring.
    ///
    /// Assertions:
    /// - Ensures the navigator carries the configured identity.
    /// - Confirms nobody is signed in on a fresh build.
    #[tokio::test]
    async fn builds_in_memory_app() {
        let app = ListifyApp::builder(config())
            .user_agent("Mozilla/5.0 (X11)")
            .hostname("listify.local")
            .oauth_client(Arc::new(MockOAuthClient::new()))
            .build()
            .unwrap();

        assert_eq!(app.navigator.user_agent(), "Mozilla/5.0 (X11)");
        assert_eq!(app.navigator.hostname(), "listify.local");
        assert!(!app.tokens.storage().has_tokens());
        assert!(!app.session.store().is_authenticated());
        assert!(!app.liveness.is_running());
    }

    #[tokio::test]
    async fn login_url_uses_configured_client() {
        let app = ListifyApp::builder(config()).build().unwrap();

        let url = app.oauth.start_login().unwrap();
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("client_id".to_string(), "client-123".to_string())));
    }

    /// Validates that a data directory makes the refresh token durable.
    ///
    /// Assertions:
    /// - Ensures a second app over the same directory sees the refresh token.
    /// - Confirms the access token is not persisted.
    #[tokio::test]
    async fn data_dir_persists_refresh_token() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(MockClock::new());

        let first = ListifyApp::builder(config())
            .data_dir(dir.path())
            .clock(clock.clone())
            .oauth_client(Arc::new(MockOAuthClient::new()))
            .build()
            .unwrap();
        first.tokens.storage().set_tokens("A1", "R1", 3600).unwrap();

        let second = ListifyApp::builder(config())
            .data_dir(dir.path())
            .clock(clock)
            .oauth_client(Arc::new(MockOAuthClient::new()))
            .build()
            .unwrap();

        assert_eq!(second.tokens.storage().get_refresh_token().as_deref(), Some("R1"));
        assert!(second.tokens.storage().get_access_token().is_none());
        assert!(dir.path().join(COOKIE_FILE).exists());
    }
}
