//! Observability infrastructure
//!
//! Installs the global `tracing` subscriber. Recorded auth failures live in
//! `listify_common::observability::ErrorLog`; this module only decides how
//! log lines are rendered and filtered.

pub mod logging;

pub use logging::{build_env_filter, init_tracing, LogFormat, DEFAULT_LOG_DIRECTIVE};
