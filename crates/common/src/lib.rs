//! Modular common utilities shared across Listify crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: errors
//! - `runtime`: clock, crypto, error log, key/value and cookie stores
//! - `platform`: the Spotify token lifecycle (PKCE, exchange, refresh,
//!   hybrid storage, liveness polling)
//! - `observability`: tracing (pulled in by `runtime`)
//! - `test-utils`: mock collaborators for downstream tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod crypto;
#[cfg(feature = "runtime")]
pub mod observability;
#[cfg(feature = "runtime")]
pub mod storage;
#[cfg(feature = "runtime")]
pub mod time;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod auth;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", all(test, feature = "platform")))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use crypto::{EncryptedData, EncryptionService, OsRandom, RandomBytesSource};
#[cfg(feature = "foundation")]
pub use error::{CommonError, CommonResult, ErrorClassification, ErrorSeverity};
#[cfg(feature = "runtime")]
pub use observability::{ErrorEntry, ErrorLog, ErrorSink, TracingSink};
#[cfg(feature = "runtime")]
pub use storage::{CookieAttributes, CookieStore, KeyValueStore, SameSite};
#[cfg(feature = "runtime")]
pub use time::{Clock, MockClock, SystemClock};
