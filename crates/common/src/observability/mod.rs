//! Observability primitives
//!
//! - [`ErrorLog`]: bounded-lifetime record of recent application errors,
//!   tagged with a context label (`TokenRefresh`, `SpotifyAuth`, ...)
//! - [`ErrorSink`]: hook for forwarding entries elsewhere as they are logged
//! - [`TracingSink`]: forwards every entry to `tracing::error!`

pub mod error_log;
pub mod sink;

pub use error_log::{ErrorEntry, ErrorLog};
pub use sink::{ErrorSink, NoOpSink, TracingSink};
