//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. A `.env` file in the working directory (or a parent) is applied to the
//!    process environment; variables already set win
//! 2. Attempts to load from environment variables
//! 3. If incomplete, falls back to loading from file
//! 4. Probes multiple paths for config files
//! 5. Supports JSON and TOML formats
//!
//! Every loaded configuration is validated before it is returned.
//!
//! ## Environment Variables
//! Required:
//! - `LISTIFY_SPOTIFY_CLIENT_ID`: Spotify application client id
//! - `LISTIFY_SPOTIFY_REDIRECT_URI`: OAuth callback URL
//! - `LISTIFY_API_BASE_URL`: Listify backend base URL
//! - `LISTIFY_ENCRYPTION_SEED`: secret mixed into the cookie encryption key
//!
//! Optional:
//! - `LISTIFY_SPOTIFY_SCOPES`: space or comma separated scope list
//! - `LISTIFY_SPOTIFY_AUTH_URL`, `LISTIFY_SPOTIFY_TOKEN_URL`,
//!   `LISTIFY_SPOTIFY_API_URL`: endpoint overrides
//! - `LISTIFY_SECURE_COOKIES`: mark cookies `Secure` (true/false, default
//!   true)
//! - `LISTIFY_HTTP_TIMEOUT_SECS`: per-request timeout
//! - `LISTIFY_HTTP_MAX_ATTEMPTS`: total attempts for transport failures
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./listify.toml`, `./listify.json`, `./config.toml`, `./config.json`
//!    (current working directory)
//! 2. The same names in the parent and grandparent directories
//! 3. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use listify_domain::{
    ApiConfig, HttpConfig, ListifyConfig, ListifyError, Result, SecurityConfig, SpotifyConfig,
};

use crate::errors::InfraError;

const CONFIG_FILE_NAMES: [&str; 4] = ["listify.toml", "listify.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// Applies `.env`, then attempts to load from environment variables. If any
/// required variables are missing, falls back to loading from a config
/// file.
///
/// # Errors
/// Returns `ListifyError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing or fail validation
pub fn load() -> Result<ListifyConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Applied .env file"),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!(error = %err, "Ignoring unreadable .env file"),
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// All required environment variables must be present. Returns an error
/// if any are missing.
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `ListifyError::Config` if required variables are missing,
/// have invalid values, or the result fails validation.
pub fn load_from_env() -> Result<ListifyConfig> {
    let mut spotify = SpotifyConfig::new(
        env_var("LISTIFY_SPOTIFY_CLIENT_ID")?,
        env_var("LISTIFY_SPOTIFY_REDIRECT_URI")?,
    );
    let api = ApiConfig { base_url: env_var("LISTIFY_API_BASE_URL")? };
    let security = SecurityConfig {
        encryption_seed: env_var("LISTIFY_ENCRYPTION_SEED")?,
        secure_cookies: env_bool("LISTIFY_SECURE_COOKIES", true),
    };

    if let Some(scopes) = env_opt("LISTIFY_SPOTIFY_SCOPES") {
        spotify.scopes = parse_scopes(&scopes);
    }
    if let Some(url) = env_opt("LISTIFY_SPOTIFY_AUTH_URL") {
        spotify.auth_url = url;
    }
    if let Some(url) = env_opt("LISTIFY_SPOTIFY_TOKEN_URL") {
        spotify.token_url = url;
    }
    if let Some(url) = env_opt("LISTIFY_SPOTIFY_API_URL") {
        spotify.api_url = url;
    }

    let mut http = HttpConfig::default();
    if env_opt("LISTIFY_HTTP_TIMEOUT_SECS").is_some() {
        http.timeout_secs = Some(env_parse("LISTIFY_HTTP_TIMEOUT_SECS")?);
    }
    if env_opt("LISTIFY_HTTP_MAX_ATTEMPTS").is_some() {
        http.max_attempts = env_parse("LISTIFY_HTTP_MAX_ATTEMPTS")?;
    }

    let config = ListifyConfig { spotify, api, security, http };
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `ListifyError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing or fail validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<ListifyConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ListifyError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ListifyError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ListifyError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `ListifyError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<ListifyConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ListifyError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ListifyError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory
/// 2. Parent directories (up to 2 levels)
/// 3. Relative to executable location
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.extend([exe_dir.clone(), exe_dir.join(".."), exe_dir.join("../..")]);
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|scope| !scope.is_empty())
        .map(str::to_string)
        .collect()
}

/// Get required environment variable
///
/// # Errors
/// Returns `ListifyError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        ListifyError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Get optional environment variable, treating blank values as unset
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env_var(key)?;
    raw.trim().parse::<T>().map_err(|e| ListifyError::Config(format!("Invalid {key}: {e}")))
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Returns
/// The parsed boolean value, or `default` if not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map_or(default, |s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const REQUIRED_VARS: [(&str, &str); 4] = [
        ("LISTIFY_SPOTIFY_CLIENT_ID", "client-123"),
        ("LISTIFY_SPOTIFY_REDIRECT_URI", "http://localhost:5173/callback"),
        ("LISTIFY_API_BASE_URL", "http://localhost:3000/api"),
        ("LISTIFY_ENCRYPTION_SEED", "test-seed"),
    ];

    const OPTIONAL_VARS: [&str; 7] = [
        "LISTIFY_SPOTIFY_SCOPES",
        "LISTIFY_SPOTIFY_AUTH_URL",
        "LISTIFY_SPOTIFY_TOKEN_URL",
        "LISTIFY_SPOTIFY_API_URL",
        "LISTIFY_SECURE_COOKIES",
        "LISTIFY_HTTP_TIMEOUT_SECS",
        "LISTIFY_HTTP_MAX_ATTEMPTS",
    ];

    fn set_required() {
        for (key, value) in REQUIRED_VARS {
            std::env::set_var(key, value);
        }
    }

    fn clear_all() {
        for (key, _) in REQUIRED_VARS {
            std::env::remove_var(key);
        }
        for key in OPTIONAL_VARS {
            std::env::remove_var(key);
        }
    }

    fn temp_config(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        for value in ["1", "true", "yes", "on", "TRUE"] {
            std::env::set_var("LISTIFY_TEST_BOOL", value);
            assert!(env_bool("LISTIFY_TEST_BOOL", false), "{value} should be true");
        }
        for value in ["0", "false", "no", "off"] {
            std::env::set_var("LISTIFY_TEST_BOOL", value);
            assert!(!env_bool("LISTIFY_TEST_BOOL", true), "{value} should be false");
        }

        std::env::remove_var("LISTIFY_TEST_BOOL");
        assert!(env_bool("LISTIFY_TEST_BOOL", true));
        assert!(!env_bool("LISTIFY_TEST_BOOL", false));
    }

    #[test]
    fn test_parse_scopes_accepts_spaces_and_commas() {
        assert_eq!(
            parse_scopes("user-read-private, user-read-email  playlist-read-private"),
            vec!["user-read-private", "user-read-email", "playlist-read-private"]
        );
        assert!(parse_scopes(" , ").is_empty());
    }

    /// Validates loading with only the required variables.
    ///
    /// Assertions:
    /// - Ensures the Spotify endpoints and scopes fall back to defaults.
    /// - Confirms cookies are secure and no timeout is set by default.
    #[test]
    fn test_load_from_env_required_only() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_all();
        set_required();

        let config = load_from_env().expect("config from env");

        assert_eq!(config.spotify.client_id, "client-123");
        assert_eq!(config.spotify.api_url, "https://api.spotify.com/v1");
        assert_eq!(config.spotify.scopes, listify_domain::default_scopes());
        assert_eq!(config.api.base_url, "http://localhost:3000/api");
        assert!(config.security.secure_cookies);
        assert_eq!(config.http, HttpConfig::default());

        clear_all();
    }

    #[test]
    fn test_load_from_env_with_overrides() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_all();
        set_required();
        std::env::set_var("LISTIFY_SPOTIFY_SCOPES", "user-read-email playlist-read-private");
        std::env::set_var("LISTIFY_SPOTIFY_API_URL", "http://127.0.0.1:9000/v1");
        std::env::set_var("LISTIFY_SECURE_COOKIES", "false");
        std::env::set_var("LISTIFY_HTTP_TIMEOUT_SECS", "15");
        std::env::set_var("LISTIFY_HTTP_MAX_ATTEMPTS", "3");

        let config = load_from_env().expect("config from env");

        assert_eq!(config.spotify.scopes, vec!["user-read-email", "playlist-read-private"]);
        assert_eq!(config.spotify.api_url, "http://127.0.0.1:9000/v1");
        assert!(!config.security.secure_cookies);
        assert_eq!(config.http.timeout_secs, Some(15));
        assert_eq!(config.http.max_attempts, 3);

        clear_all();
    }

    #[test]
    fn test_load_from_env_missing_var() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_all();
        set_required();
        std::env::remove_var("LISTIFY_ENCRYPTION_SEED");

        let err = load_from_env().unwrap_err();
        assert!(
            matches!(err, ListifyError::Config(ref msg) if msg.contains("LISTIFY_ENCRYPTION_SEED"))
        );

        clear_all();
    }

    #[test]
    fn test_load_from_env_invalid_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_all();
        set_required();

        std::env::set_var("LISTIFY_HTTP_MAX_ATTEMPTS", "several");
        assert!(matches!(load_from_env(), Err(ListifyError::Config(_))));

        std::env::set_var("LISTIFY_HTTP_MAX_ATTEMPTS", "0");
        assert!(matches!(load_from_env(), Err(ListifyError::Config(_))));

        std::env::remove_var("LISTIFY_HTTP_MAX_ATTEMPTS");
        std::env::set_var("LISTIFY_API_BASE_URL", "not a url");
        assert!(matches!(load_from_env(), Err(ListifyError::Config(_))));

        clear_all();
    }

    #[test]
    fn test_load_from_file_json() {
        let path = temp_config(
            r#"{
                "spotify": { "client_id": "abc", "redirect_uri": "http://localhost/callback" },
                "api": { "base_url": "http://localhost:3000/api" },
                "security": { "encryption_seed": "seed", "secure_cookies": false }
            }"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).expect("config from JSON file");
        assert_eq!(config.spotify.client_id, "abc");
        assert!(!config.security.secure_cookies);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_toml() {
        let path = temp_config(
            r#"
[spotify]
client_id = "abc"
redirect_uri = "http://localhost/callback"
scopes = ["user-read-private"]

[api]
base_url = "http://localhost:3000/api"

[security]
encryption_seed = "seed"

[http]
timeout_secs = 10
max_attempts = 2
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).expect("config from TOML file");
        assert_eq!(config.spotify.scopes, vec!["user-read-private"]);
        assert_eq!(config.http.timeout_secs, Some(10));
        assert_eq!(config.http.max_attempts, 2);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_rejects_invalid_config() {
        let path = temp_config(
            r#"{
                "spotify": { "client_id": "", "redirect_uri": "http://localhost/callback" },
                "api": { "base_url": "http://localhost:3000/api" },
                "security": { "encryption_seed": "seed" }
            }"#,
            "json",
        );

        let err = load_from_file(Some(path.clone())).unwrap_err();
        assert!(err.to_string().contains("spotify.client_id"));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/listify.toml")));
        assert!(matches!(result, Err(ListifyError::Config(_))));
    }

    #[test]
    fn test_parse_config_invalid_formats() {
        assert!(parse_config(r#"{ "spotify": "#, Path::new("listify.json")).is_err());
        assert!(parse_config("[spotify", Path::new("listify.toml")).is_err());
        assert!(parse_config("spotify: {}", Path::new("listify.yaml")).is_err());
    }
}
