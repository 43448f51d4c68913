//! # Listify Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - HTTP client with optional retry and timeout
//! - Listify backend client (account auth and playlist CRUD)
//! - Spotify Web API client with 401 refresh-and-replay
//! - File-backed cookie jar and key/value store
//! - Configuration loading (`.env`, environment, TOML/JSON files)
//! - Tracing subscriber setup
//! - The composition root wiring everything into a [`ListifyApp`]
//!
//! ## Architecture
//! - Implements traits defined in `listify-core`
//! - Depends on `listify-common` and `listify-domain`
//! - Contains all "impure" code (network, filesystem, process environment)

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod observability;
pub mod storage;

// Re-export commonly used items
pub use api::{AccessTokenProvider, ApiError, ListifyApiClient, StaticTokenProvider};
pub use bootstrap::{ListifyApp, ListifyAppBuilder};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::spotify::SpotifyApiClient;
pub use observability::{init_tracing, LogFormat};
pub use storage::{FileCookieJar, FileKeyValueStore};
