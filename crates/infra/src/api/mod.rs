//! Listify backend API client
//!
//! HTTP implementation of the first-party ports defined in `listify-core`:
//! email/password authentication and playlist management.
//!
//! # Architecture
//!
//! - Uses the shared [`HttpClient`](crate::http::HttpClient) (no direct
//!   reqwest client construction)
//! - Bearer token from an [`AccessTokenProvider`], normally the
//!   [`SessionStore`](listify_core::SessionStore)
//! - Non-success responses classified by [`ApiError`] before conversion to
//!   `ListifyError`

pub mod auth;
pub mod client;
pub mod errors;

pub use auth::{AccessTokenProvider, StaticTokenProvider};
pub use client::ListifyApiClient;
pub use errors::{ApiError, ApiErrorCategory};
