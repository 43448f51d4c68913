//! Listify backend client
//!
//! HTTP implementation of the first-party auth and playlist ports. Playlist
//! calls carry the session bearer token; login and registration do not.

use std::sync::Arc;

use async_trait::async_trait;
use listify_core::{AuthApiPort, PlaylistPort};
use listify_domain::{
    ApiConfig, ApiResponse, AuthResponse, Credentials, ListifyError, NewPlaylist, NewSong,
    Playlist, PlaylistUpdate, Registration, Result,
};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use super::auth::AccessTokenProvider;
use super::errors::ApiError;
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Login/register responses, with or without the `data` envelope
#[derive(Deserialize)]
#[serde(untagged)]
enum AuthEnvelope {
    Wrapped { data: AuthResponse },
    Bare(AuthResponse),
}

impl From<AuthEnvelope> for AuthResponse {
    fn from(envelope: AuthEnvelope) -> Self {
        match envelope {
            AuthEnvelope::Wrapped { data } | AuthEnvelope::Bare(data) => data,
        }
    }
}

/// First-party API client
pub struct ListifyApiClient {
    http: HttpClient,
    base_url: Url,
    auth: Arc<dyn AccessTokenProvider>,
}

impl std::fmt::Debug for ListifyApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListifyApiClient").field("base_url", &self.base_url.as_str()).finish()
    }
}

impl ListifyApiClient {
    /// # Errors
    /// Returns `ListifyError::Config` if `config.base_url` is not a base URL
    pub fn new(
        config: &ApiConfig,
        http: HttpClient,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(InfraError::from)?;
        if base_url.cannot_be_a_base() {
            return Err(ListifyError::Config(format!(
                "api.base_url cannot be used as a base: {base_url}"
            )));
        }
        Ok(Self { http, base_url, auth })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ListifyError::Config(format!("invalid API base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let token = self.auth.access_token().ok_or_else(|| {
            ListifyError::Unauthenticated("sign in to manage playlists".to_string())
        })?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn execute<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R> {
        let response = self.http.send(request).await?;
        let status = response.status();
        let url = response.url().to_string();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_status(status, &url, &body);
            warn!(%url, %status, category = ?err.category(), "listify API request failed");
            return Err(err.into());
        }

        response
            .json::<R>()
            .await
            .map_err(|err| ListifyError::from(ApiError::Decode(format!("{url}: {err}"))))
    }

    async fn playlist_request<B: Serialize + Sync>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Playlist> {
        let mut request = self.authorized(method, self.endpoint(segments)?)?;
        if let Some(body) = body {
            request = request.json(body);
        }
        let response: ApiResponse<Playlist> = self.execute(request).await?;
        Ok(response.data)
    }

    async fn authenticate<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<AuthResponse> {
        let request = self.http.request(Method::POST, self.endpoint(&["auth", path])?).json(body);
        let envelope: AuthEnvelope = self.execute(request).await?;
        Ok(envelope.into())
    }
}

#[async_trait]
impl AuthApiPort for ListifyApiClient {
    #[instrument(skip_all, fields(email = %credentials.email))]
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.authenticate("login", credentials).await
    }

    #[instrument(skip_all, fields(email = %registration.email))]
    async fn register(&self, registration: &Registration) -> Result<AuthResponse> {
        self.authenticate("register", registration).await
    }
}

#[async_trait]
impl PlaylistPort for ListifyApiClient {
    #[instrument(skip(self))]
    async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        let request = self.authorized(Method::GET, self.endpoint(&["playlists"])?)?;
        let response: ApiResponse<Vec<Playlist>> = self.execute(request).await?;
        debug!(count = response.data.len(), "playlists loaded");
        Ok(response.data)
    }

    #[instrument(skip(self))]
    async fn get_playlist(&self, playlist_id: &str) -> Result<Playlist> {
        self.playlist_request::<()>(Method::GET, &["playlists", playlist_id], None).await
    }

    #[instrument(skip_all, fields(name = %playlist.name))]
    async fn create_playlist(&self, playlist: &NewPlaylist) -> Result<Playlist> {
        self.playlist_request(Method::POST, &["playlists"], Some(playlist)).await
    }

    #[instrument(skip(self, update))]
    async fn update_playlist(
        &self,
        playlist_id: &str,
        update: &PlaylistUpdate,
    ) -> Result<Playlist> {
        self.playlist_request(Method::PUT, &["playlists", playlist_id], Some(update)).await
    }

    #[instrument(skip(self))]
    async fn delete_playlist(&self, playlist_id: &str) -> Result<Playlist> {
        self.playlist_request::<()>(Method::DELETE, &["playlists", playlist_id], None).await
    }

    #[instrument(skip(self, song), fields(spotify_id = %song.spotify_id))]
    async fn add_song(&self, playlist_id: &str, song: &NewSong) -> Result<Playlist> {
        self.playlist_request(Method::POST, &["playlists", playlist_id, "songs"], Some(song)).await
    }

    #[instrument(skip(self))]
    async fn delete_song(&self, playlist_id: &str, song_id: &str) -> Result<Playlist> {
        self.playlist_request::<()>(
            Method::DELETE,
            &["playlists", playlist_id, "songs", song_id],
            None,
        )
        .await
    }
}
