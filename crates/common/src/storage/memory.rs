//! In-memory store implementations

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::traits::{CookieAttributes, CookieStore, KeyValueStore, StoredCookie};
use crate::error::CommonResult;
use crate::time::{Clock, SystemClock};

/// Process-local key/value store
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> CommonResult<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CommonResult<()> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CommonResult<()> {
        self.values.write().remove(key);
        Ok(())
    }
}

/// Process-local cookie jar that honours max-age against its clock
pub struct MemoryCookieJar {
    cookies: RwLock<HashMap<String, StoredCookie>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for MemoryCookieJar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.cookies.read().keys().cloned().collect();
        f.debug_struct("MemoryCookieJar").field("cookies", &names).finish_non_exhaustive()
    }
}

impl Default for MemoryCookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { cookies: RwLock::new(HashMap::new()), clock }
    }

    /// Attributes the live cookie `name` was written with
    pub fn attributes(&self, name: &str) -> Option<CookieAttributes> {
        let now = self.clock.utc_now();
        self.cookies
            .read()
            .get(name)
            .filter(|cookie| !cookie.is_expired(now))
            .map(|cookie| cookie.attributes.clone())
    }

    /// Names of all live cookies, sorted
    pub fn names(&self) -> Vec<String> {
        let now = self.clock.utc_now();
        let mut names: Vec<String> = self
            .cookies
            .read()
            .iter()
            .filter(|(_, cookie)| !cookie.is_expired(now))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}

impl CookieStore for MemoryCookieJar {
    fn get(&self, name: &str) -> CommonResult<Option<String>> {
        let now = self.clock.utc_now();
        let mut cookies = self.cookies.write();
        match cookies.get(name) {
            Some(cookie) if cookie.is_expired(now) => {
                cookies.remove(name);
                Ok(None)
            }
            Some(cookie) => Ok(Some(cookie.value.clone())),
            None => Ok(None),
        }
    }

    fn set(&self, name: &str, value: &str, attributes: &CookieAttributes) -> CommonResult<()> {
        let cookie = StoredCookie::new(value, attributes, self.clock.utc_now());
        self.cookies.write().insert(name.to_string(), cookie);
        Ok(())
    }

    fn remove(&self, name: &str, path: &str) -> CommonResult<()> {
        let mut cookies = self.cookies.write();
        if cookies.get(name).is_some_and(|cookie| cookie.attributes.path == path) {
            cookies.remove(name);
        }
        Ok(())
    }
}
