//! Outbound HTTP
//!
//! A thin wrapper over `reqwest` shared by the first-party API client, the
//! Spotify Web API client and nothing else. The OAuth token endpoint is
//! called by `listify_common::auth::OAuthClient` directly.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
