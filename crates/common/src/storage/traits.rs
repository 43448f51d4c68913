//! Storage trait definitions
//!
//! Backends are synchronous: every implementation in this workspace is either
//! in-memory or a small local file, and callers hold no locks across awaits.

use std::fmt::{self, Debug};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CommonResult;

/// Session-scoped string storage
pub trait KeyValueStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> CommonResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> CommonResult<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> CommonResult<()>;
}

/// Cookie jar abstraction
///
/// Implementations must treat a cookie whose max-age has elapsed as absent.
pub trait CookieStore: Send + Sync + Debug {
    fn get(&self, name: &str) -> CommonResult<Option<String>>;

    fn set(&self, name: &str, value: &str, attributes: &CookieAttributes) -> CommonResult<()>;

    /// Remove the cookie `name` scoped to `path`
    fn remove(&self, name: &str, path: &str) -> CommonResult<()>;
}

/// Cookie `SameSite` policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SameSite {
    #[default]
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        };
        f.write_str(value)
    }
}

/// Attributes applied when a cookie is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieAttributes {
    /// `None` means a session cookie
    pub max_age: Option<Duration>,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
}

impl Default for CookieAttributes {
    fn default() -> Self {
        Self { max_age: None, secure: true, same_site: SameSite::Strict, path: "/".to_string() }
    }
}

impl CookieAttributes {
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

/// A cookie as held by a jar, with its absolute expiry resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub value: String,
    pub attributes: CookieAttributes,
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredCookie {
    /// Resolve `attributes.max_age` against `now`
    pub fn new(value: &str, attributes: &CookieAttributes, now: DateTime<Utc>) -> Self {
        let expires_at = attributes
            .max_age
            .and_then(|age| chrono::Duration::from_std(age).ok())
            .and_then(|age| now.checked_add_signed(age));
        Self { value: value.to_string(), attributes: attributes.clone(), expires_at }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}
