//! Durable client-state stores
//!
//! File-backed implementations of the `listify_common::storage` traits, used
//! when the refresh-token cookie and the first-party session must survive a
//! restart.

pub mod file_store;

pub use file_store::{FileCookieJar, FileKeyValueStore};
