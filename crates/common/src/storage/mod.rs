//! Client-side persistence primitives
//!
//! The session lifecycle persists through two narrow abstractions:
//! - [`KeyValueStore`]: session-scoped scratch values (the PKCE code verifier,
//!   the first-party session)
//! - [`CookieStore`]: named cookies with lifetime and scope attributes (the
//!   encrypted refresh token and its expiry)
//!
//! In-memory implementations live in [`memory`]; durable file-backed ones are
//! provided by the infrastructure crate.

pub mod memory;
pub mod traits;

pub use memory::{MemoryCookieJar, MemoryKeyValueStore};
pub use traits::{CookieAttributes, CookieStore, KeyValueStore, SameSite, StoredCookie};
