//! Testing utilities and helpers
//!
//! - **[`fixtures`]**: [`AuthHarness`], the token lifecycle wired against
//!   in-memory stores and a mock clock
//! - **[`mocks`]**: mock token endpoint and deterministic random source
//!
//! ## Usage
//!
//! ```rust
//! use listify_common::testing::{AuthHarness, MockOAuthClient};
//!
//! let harness = AuthHarness::new(MockOAuthClient::new().with_refresh_tokens("A2", None, 3600));
//! harness.storage.set_tokens("A1", "R1", 3600).unwrap();
//! harness.clock.advance_secs(3600);
//! assert!(harness.storage.usable_access_token().is_none());
//! ```

pub mod fixtures;
pub mod mocks;

pub use fixtures::{AuthHarness, TEST_HOSTNAME, TEST_SEED, TEST_USER_AGENT};
pub use mocks::{test_oauth_config, FixedRandom, MockOAuthClient};
