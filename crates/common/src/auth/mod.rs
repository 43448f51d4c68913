//! Spotify OAuth 2.0 + PKCE session lifecycle
//!
//! This module owns everything between "the user clicked connect" and "an
//! API call carries a valid bearer token".
//!
//! # Features
//!
//! - **PKCE Flow**: RFC 7636 `S256` challenges with 64-char alphanumeric
//!   verifiers
//! - **Hybrid Storage**: access token in memory, refresh token encrypted in
//!   cookies with a fingerprint-derived key
//! - **Single-flight Refresh**: concurrent callers share one refresh
//! - **Liveness Polling**: a 60 s timer keeping an `authenticated` flag
//!   current and restoring sessions from the refresh token
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐        ┌──────────────────────┐
//! │  OAuthService   │        │ AuthLivenessPoller   │
//! └────────┬────────┘        └──────────┬───────────┘
//!          │                            │
//!          ├──► PKCE utilities          │
//!          │                            │
//!          └──────────► TokenManager ◄──┘
//!                          │
//!                          ├──► OAuthClientTrait   (token endpoint)
//!                          │
//!                          └──► HybridTokenStorage
//!                                  ├──► MemoryTokenCache
//!                                  └──► EncryptedCookieStore ──► CookieStore
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use listify_common::auth::{
//!     AppNavigator, AuthLivenessPoller, EncryptedCookieStore, HybridTokenStorage, OAuthClient,
//!     OAuthConfig, OAuthService, TokenManager,
//! };
//! use listify_common::crypto::OsRandom;
//! use listify_common::observability::ErrorLog;
//! use listify_common::storage::{MemoryCookieJar, MemoryKeyValueStore};
//! use listify_common::time::SystemClock;
//! use listify_domain::SpotifyConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let spotify = SpotifyConfig::new("client-id", "http://localhost:5173/callback");
//! let navigator = Arc::new(AppNavigator::new("Mozilla/5.0", "localhost"));
//! let errors = Arc::new(ErrorLog::new());
//!
//! let cookies = EncryptedCookieStore::for_client(
//!     Arc::new(MemoryCookieJar::new()),
//!     "app-seed",
//!     navigator.as_ref(),
//!     true,
//! )?;
//! let storage =
//!     Arc::new(HybridTokenStorage::new(cookies, Arc::new(SystemClock), errors.clone()));
//! let client = Arc::new(OAuthClient::new(OAuthConfig::from(&spotify)));
//! let manager = Arc::new(TokenManager::new(client, storage, errors.clone()));
//!
//! let service = OAuthService::new(
//!     manager.clone(),
//!     Arc::new(MemoryKeyValueStore::new()),
//!     navigator,
//!     Arc::new(OsRandom),
//!     errors.clone(),
//! );
//! let url = service.start_login()?;
//! println!("Open {url}");
//!
//! // ... the provider redirects back to /callback?code=... ...
//! service.handle_callback("?code=abc").await?;
//!
//! let poller = AuthLivenessPoller::new(manager, errors);
//! poller.start();
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - **[`types`]**: `TokenSet`, `TokenResponse`, `OAuthConfig`, `OAuthError`
//! - **[`pkce`]**: verifier/challenge generation and the authorization URL
//! - **[`client`]**: token endpoint client
//! - **[`hybrid`]**: memory + encrypted cookie token storage
//! - **[`token_manager`]**: refresh and single-flight coordination
//! - **[`service`]**: login start, code exchange and callback handling
//! - **[`liveness`]**: periodic authentication check

pub mod client;
pub mod cookie_store;
pub mod error;
pub mod hybrid;
pub mod liveness;
pub mod memory_cache;
pub mod navigator;
pub mod pkce;
pub mod service;
pub mod token_manager;
pub mod traits;
pub mod types;

pub use client::{OAuthClient, OAuthClientError};
pub use cookie_store::EncryptedCookieStore;
pub use error::{AuthError, AuthResult};
pub use hybrid::HybridTokenStorage;
pub use liveness::{AuthLivenessPoller, AuthStatus};
pub use memory_cache::MemoryTokenCache;
pub use navigator::AppNavigator;
pub use pkce::{generate_code_challenge, generate_code_verifier, PkceChallenge};
pub use service::{CallbackParams, OAuthService};
pub use token_manager::TokenManager;
pub use traits::{Navigator, OAuthClientTrait};
pub use types::{OAuthConfig, OAuthError, TokenResponse, TokenSet};
