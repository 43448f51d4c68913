//! Application configuration.
//!
//! [`load`] resolves a [`listify_domain::ListifyConfig`] from `.env` and
//! `LISTIFY_*` variables first, then from the first `listify.toml` or
//! `listify.json` found by [`probe_config_paths`].

pub mod loader;

pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
