//! Spotify Web API client with token refresh and a single 401 replay

use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use listify_common::auth::{AuthError, Navigator, TokenManager};
use listify_core::CatalogPort;
use listify_domain::constants::LOGIN_ROUTE;
use listify_domain::{
    ListifyError, Result, SpotifyConfig, SpotifyPlaylistPage, SpotifyTrack, SpotifyUser,
    TrackSearchResponse,
};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::api::ApiError;
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Spotify Web API client
///
/// Every request goes through the same gate:
/// 1. a missing or expired access token is refreshed first when a refresh
///    token is stored (a failed refresh does not stop the request)
/// 2. the request is sent with the cached bearer token, if any
/// 3. on 401 the token is refreshed and the request replayed once
/// 4. a failed refresh or a second 401 clears the tokens, sends the user to
///    `/auth/login` and fails with `ListifyError::Unauthenticated`
pub struct SpotifyApiClient {
    http: HttpClient,
    api_url: Url,
    tokens: Arc<TokenManager>,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for SpotifyApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyApiClient").field("api_url", &self.api_url.as_str()).finish()
    }
}

impl SpotifyApiClient {
    /// Create a new Spotify client
    ///
    /// # Arguments
    /// * `config` - Spotify settings; only `api_url` is read here
    /// * `http` - Shared HTTP client
    /// * `tokens` - Token manager owning refresh and the hybrid storage
    /// * `navigator` - Receives the login redirect when the session is lost
    ///
    /// # Errors
    /// Returns `ListifyError::Config` if `config.api_url` is not a base URL
    pub fn new(
        config: &SpotifyConfig,
        http: HttpClient,
        tokens: Arc<TokenManager>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let api_url = Url::parse(&config.api_url).map_err(InfraError::from)?;
        if api_url.cannot_be_a_base() {
            return Err(ListifyError::Config(format!(
                "spotify.api_url cannot be used as a base: {api_url}"
            )));
        }
        Ok(Self { http, api_url, tokens, navigator })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| ListifyError::Config(format!("invalid Spotify URL: {}", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Authenticated GET with the refresh-and-replay policy
    async fn get_json<R: DeserializeOwned>(&self, url: Url) -> Result<R> {
        let storage = self.tokens.storage();
        if storage.usable_access_token().is_none() && storage.has_refresh_token() {
            if let Err(err) = self.tokens.ensure_fresh().await {
                debug!(error = %err, "pre-request refresh failed, sending request anyway");
            }
        }

        let sent = self.tokens.storage().usable_access_token();
        let response = self.send(&url, sent.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return decode(response).await;
        }

        warn!(%url, "spotify rejected the access token, refreshing");
        if let Err(err) = self.tokens.refresh_rejected(sent.as_deref()).await {
            return Err(self.expire_session(err));
        }

        let replay_token = self.tokens.storage().usable_access_token();
        let response = self.send(&url, replay_token.as_deref()).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(self.expire_session("replayed request was rejected"));
        }
        decode(response).await
    }

    async fn send(&self, url: &Url, token: Option<&str>) -> Result<Response> {
        let mut request = self.http.request(Method::GET, url.clone());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        self.http.send(request).await
    }

    fn expire_session(&self, reason: impl Display) -> ListifyError {
        info!(%reason, "spotify session lost, redirecting to login");
        self.tokens.clear_tokens();
        self.navigator.redirect(LOGIN_ROUTE);
        AuthError::Unauthenticated.into()
    }
}

async fn decode<R: DeserializeOwned>(response: Response) -> Result<R> {
    let status = response.status();
    let url = response.url().to_string();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_status(status, &url, &body);
        warn!(%url, %status, category = ?err.category(), "spotify request failed");
        return Err(err.into());
    }

    response
        .json::<R>()
        .await
        .map_err(|err| ListifyError::from(ApiError::Decode(format!("{url}: {err}"))))
}

#[async_trait]
impl CatalogPort for SpotifyApiClient {
    #[instrument(skip(self))]
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<SpotifyTrack>> {
        let mut url = self.endpoint(&["search"])?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("type", "track")
            .append_pair("limit", &limit.to_string());

        let response: TrackSearchResponse = self.get_json(url).await?;
        debug!(count = response.tracks.items.len(), "track search complete");
        Ok(response.tracks.items)
    }

    #[instrument(skip(self))]
    async fn current_user(&self) -> Result<SpotifyUser> {
        self.get_json(self.endpoint(&["me"])?).await
    }

    #[instrument(skip(self))]
    async fn user_playlists(&self) -> Result<SpotifyPlaylistPage> {
        self.get_json(self.endpoint(&["me", "playlists"])?).await
    }
}
