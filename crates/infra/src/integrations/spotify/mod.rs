//! Spotify Web API integration
//!
//! Read-only catalog access (`search`, `me`, `me/playlists`) on behalf of the
//! connected Spotify account.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use listify_common::auth::{
//!     AppNavigator, EncryptedCookieStore, HybridTokenStorage, OAuthClient, OAuthConfig,
//!     TokenManager,
//! };
//! use listify_common::observability::ErrorLog;
//! use listify_common::storage::MemoryCookieJar;
//! use listify_common::time::SystemClock;
//! use listify_core::CatalogPort;
//! use listify_domain::SpotifyConfig;
//! use listify_infra::http::HttpClient;
//! use listify_infra::integrations::spotify::SpotifyApiClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SpotifyConfig::new("client-id", "http://localhost:5173/callback");
//! let navigator = Arc::new(AppNavigator::new("Mozilla/5.0", "localhost"));
//! let errors = Arc::new(ErrorLog::new());
//! let cookies = EncryptedCookieStore::for_client(
//!     Arc::new(MemoryCookieJar::new()),
//!     "app-seed",
//!     navigator.as_ref(),
//!     true,
//! )?;
//! let storage =
//!     Arc::new(HybridTokenStorage::new(cookies, Arc::new(SystemClock), errors.clone()));
//! let oauth = Arc::new(OAuthClient::new(OAuthConfig::from(&config)));
//! let tokens = Arc::new(TokenManager::new(oauth, storage, errors));
//!
//! let spotify = SpotifyApiClient::new(&config, HttpClient::new()?, tokens, navigator)?;
//! let tracks = spotify.search_tracks("daft punk", 10).await?;
//! println!("{} tracks", tracks.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - **401**: one refresh and one replay; a second failure clears the tokens
//!   and redirects to `/auth/login`
//! - **Other statuses**: returned as `ListifyError` without retry
//! - **Transport errors**: retried only when `http.max_attempts` > 1

pub mod client;

pub use client::SpotifyApiClient;
