//! Time abstractions
//!
//! Token expiry, cookie lifetimes and error-log timestamps all read time
//! through a [`Clock`] so tests can drive it with [`MockClock`].
//!
//! ```rust
//! use std::time::Duration;
//!
//! use listify_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::new();
//! let before = clock.utc_now();
//! clock.advance(Duration::from_secs(300));
//! assert_eq!((clock.utc_now() - before).num_seconds(), 300);
//! ```

pub mod clock;

pub use clock::{Clock, MockClock, SystemClock};
