//! JSON-file key/value store and cookie jar
//!
//! Each store owns one file holding a JSON object. The whole object is kept
//! in memory and rewritten on every mutation through a temporary sibling
//! file and a rename, so a crash mid-write leaves the previous contents.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use listify_common::error::{CommonError, CommonResult};
use listify_common::storage::{CookieAttributes, CookieStore, KeyValueStore, StoredCookie};
use listify_common::time::Clock;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Durable replacement for page-local storage
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FileKeyValueStore {
    /// Open (or lazily create) the store at `path`
    ///
    /// # Errors
    /// Returns error if an existing file cannot be read or is not a JSON
    /// object of strings
    pub fn open(path: impl Into<PathBuf>) -> CommonResult<Self> {
        let path = path.into();
        let values = read_json(&path)?.unwrap_or_default();
        Ok(Self { path, values: RwLock::new(values) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> CommonResult<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CommonResult<()> {
        let mut values = self.values.write();
        values.insert(key.to_string(), value.to_string());
        write_json(&self.path, &*values)
    }

    fn remove(&self, key: &str) -> CommonResult<()> {
        let mut values = self.values.write();
        if values.remove(key).is_none() {
            return Ok(());
        }
        write_json(&self.path, &*values)
    }
}

/// Durable cookie jar honouring max-age against its clock
pub struct FileCookieJar {
    path: PathBuf,
    cookies: RwLock<BTreeMap<String, StoredCookie>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for FileCookieJar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.cookies.read().keys().cloned().collect();
        f.debug_struct("FileCookieJar")
            .field("path", &self.path)
            .field("cookies", &names)
            .finish_non_exhaustive()
    }
}

impl FileCookieJar {
    /// Open the jar at `path`, dropping cookies that expired while the
    /// process was not running
    ///
    /// # Errors
    /// Returns error if an existing file cannot be read or parsed
    pub fn open(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> CommonResult<Self> {
        let path = path.into();
        let mut cookies: BTreeMap<String, StoredCookie> = read_json(&path)?.unwrap_or_default();

        let now = clock.utc_now();
        let before = cookies.len();
        cookies.retain(|_, cookie| !cookie.is_expired(now));
        if cookies.len() != before {
            let dropped = before - cookies.len();
            debug!(dropped, path = %path.display(), "expired cookies pruned");
            write_json(&path, &cookies)?;
        }

        Ok(Self { path, cookies: RwLock::new(cookies), clock })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CookieStore for FileCookieJar {
    fn get(&self, name: &str) -> CommonResult<Option<String>> {
        let now = self.clock.utc_now();
        {
            let cookies = self.cookies.read();
            match cookies.get(name) {
                None => return Ok(None),
                Some(cookie) if !cookie.is_expired(now) => return Ok(Some(cookie.value.clone())),
                Some(_) => {}
            }
        }

        let mut cookies = self.cookies.write();
        cookies.remove(name);
        if let Err(err) = write_json(&self.path, &*cookies) {
            warn!(error = %err, cookie = name, "failed to persist expired cookie removal");
        }
        Ok(None)
    }

    fn set(&self, name: &str, value: &str, attributes: &CookieAttributes) -> CommonResult<()> {
        let cookie = StoredCookie::new(value, attributes, self.clock.utc_now());
        let mut cookies = self.cookies.write();
        cookies.insert(name.to_string(), cookie);
        write_json(&self.path, &*cookies)
    }

    fn remove(&self, name: &str, path: &str) -> CommonResult<()> {
        let mut cookies = self.cookies.write();
        if !cookies.get(name).is_some_and(|cookie| cookie.attributes.path == path) {
            return Ok(());
        }
        cookies.remove(name);
        write_json(&self.path, &*cookies)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> CommonResult<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(CommonError::storage_op(format!("read {}", path.display()), err.to_string()))
        }
    };

    if contents.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&contents).map(Some).map_err(|err| {
        CommonError::storage_op(format!("parse {}", path.display()), err.to_string())
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> CommonResult<()> {
    let serialized = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            CommonError::storage_op(format!("create {}", parent.display()), err.to_string())
        })?;
    }

    let staging = path.with_extension("tmp");
    fs::write(&staging, serialized).map_err(|err| {
        CommonError::storage_op(format!("write {}", staging.display()), err.to_string())
    })?;
    fs::rename(&staging, path).map_err(|err| {
        CommonError::storage_op(format!("rename {}", path.display()), err.to_string())
    })
}
