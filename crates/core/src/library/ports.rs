//! Port interfaces for the playlist library
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use listify_domain::{
    NewPlaylist, NewSong, Playlist, PlaylistUpdate, Result, SpotifyPlaylistPage, SpotifyTrack,
    SpotifyUser,
};

/// Playlist persistence on the Listify backend
///
/// Every call is bearer-authenticated with the first-party session token.
#[async_trait]
pub trait PlaylistPort: Send + Sync {
    /// Playlists owned by the signed-in user
    async fn list_playlists(&self) -> Result<Vec<Playlist>>;

    async fn get_playlist(&self, playlist_id: &str) -> Result<Playlist>;

    async fn create_playlist(&self, playlist: &NewPlaylist) -> Result<Playlist>;

    async fn update_playlist(&self, playlist_id: &str, update: &PlaylistUpdate)
        -> Result<Playlist>;

    async fn delete_playlist(&self, playlist_id: &str) -> Result<Playlist>;

    /// Append a song; returns the updated playlist
    async fn add_song(&self, playlist_id: &str, song: &NewSong) -> Result<Playlist>;

    /// Remove a song; returns the updated playlist
    async fn delete_song(&self, playlist_id: &str, song_id: &str) -> Result<Playlist>;
}

/// Read access to the Spotify catalog
#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// Search tracks, returning at most `limit` items
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<SpotifyTrack>>;

    /// Profile of the Spotify account behind the current token
    async fn current_user(&self) -> Result<SpotifyUser>;

    async fn user_playlists(&self) -> Result<SpotifyPlaylistPage>;
}
