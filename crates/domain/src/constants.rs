//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Persisted client state
pub const REFRESH_TOKEN_COOKIE: &str = "spotify_refresh_token";
pub const EXPIRES_AT_COOKIE: &str = "spotify_expires_at";
/// Older releases kept the access token in a cookie; it is only ever deleted.
pub const LEGACY_ACCESS_TOKEN_COOKIE: &str = "spotify_access_token";
pub const CODE_VERIFIER_KEY: &str = "spotify_code_verifier";
pub const SESSION_KEY: &str = "listify_session";
pub const COOKIE_PATH: &str = "/";
pub const COOKIE_MAX_AGE_DAYS: i64 = 30;

// Token lifecycle timing
pub const TOKEN_EXPIRY_SKEW_SECS: i64 = 5 * 60;
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;
pub const LIVENESS_POLL_INTERVAL_SECS: u64 = 60;

// PKCE
pub const CODE_VERIFIER_LENGTH: usize = 64;
pub const CODE_CHALLENGE_METHOD: &str = "S256";

// Routes
pub const LOGIN_ROUTE: &str = "/auth/login";
pub const DASHBOARD_ROUTE: &str = "/dashboard";

// First-party account rules
pub const MIN_PASSWORD_LENGTH: usize = 8;

// Catalog search
pub const SEARCH_RESULT_LIMIT: u32 = 10;
pub const MIN_SEARCH_QUERY_LENGTH: usize = 2;

// Error log context labels
pub const CONTEXT_TOKEN_DECRYPTION: &str = "TokenDecryption";
pub const CONTEXT_TOKEN_REFRESH: &str = "TokenRefresh";
pub const CONTEXT_TOKEN_EXCHANGE: &str = "TokenExchange";
pub const CONTEXT_AUTH_RESTORE: &str = "AuthRestore";
pub const CONTEXT_SPOTIFY_AUTH: &str = "SpotifyAuth";
pub const CONTEXT_SPOTIFY_CALLBACK: &str = "SpotifyCallback";
pub const CONTEXT_TOKEN_STORAGE: &str = "TokenStorage";
pub const CONTEXT_LOGIN: &str = "Login";
pub const CONTEXT_REGISTRATION: &str = "Registration";
pub const CONTEXT_SESSION_STORAGE: &str = "SessionStorage";
pub const CONTEXT_PLAYLIST_CREATE: &str = "PlaylistCreate";
pub const CONTEXT_PLAYLIST_UPDATE: &str = "PlaylistUpdate";
pub const CONTEXT_PLAYLIST_DELETE: &str = "PlaylistDelete";
pub const CONTEXT_ADD_SONG: &str = "AddSongToPlaylist";
pub const CONTEXT_DELETE_SONG: &str = "DeleteSongFromPlaylist";
