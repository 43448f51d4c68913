//! Playlist library service - core business logic
//!
//! Combines the Listify playlist backend with the Spotify catalog: searching
//! tracks, mapping a chosen track to a song and keeping the open
//! ("active") playlist in sync with every mutation.

use std::sync::Arc;

use listify_common::observability::ErrorLog;
use listify_domain::constants::{
    CONTEXT_ADD_SONG, CONTEXT_DELETE_SONG, CONTEXT_PLAYLIST_CREATE, CONTEXT_PLAYLIST_DELETE,
    CONTEXT_PLAYLIST_UPDATE, MIN_SEARCH_QUERY_LENGTH, SEARCH_RESULT_LIMIT,
};
use listify_domain::{
    ListifyError, NewPlaylist, NewSong, Playlist, PlaylistUpdate, Result, SpotifyPlaylistPage,
    SpotifyTrack, SpotifyUser,
};
use parking_lot::RwLock;
use tracing::{debug, info, instrument};

use super::ports::{CatalogPort, PlaylistPort};
use crate::session::SessionStore;

/// Playlist library use cases
pub struct LibraryService {
    playlists: Arc<dyn PlaylistPort>,
    catalog: Arc<dyn CatalogPort>,
    session: Arc<SessionStore>,
    errors: Arc<ErrorLog>,
    active: RwLock<Option<Playlist>>,
}

impl LibraryService {
    /// Create a new library service
    pub fn new(
        playlists: Arc<dyn PlaylistPort>,
        catalog: Arc<dyn CatalogPort>,
        session: Arc<SessionStore>,
        errors: Arc<ErrorLog>,
    ) -> Self {
        Self { playlists, catalog, session, errors, active: RwLock::new(None) }
    }

    /// Search the catalog for tracks
    ///
    /// Queries shorter than two characters (after trimming) return no
    /// results without contacting Spotify.
    ///
    /// # Errors
    /// Propagates catalog failures, including `Unauthenticated` once the
    /// Spotify session has been torn down.
    #[instrument(skip(self))]
    pub async fn search_tracks(&self, query: &str) -> Result<Vec<SpotifyTrack>> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_QUERY_LENGTH {
            return Ok(Vec::new());
        }
        let tracks = self.catalog.search_tracks(query, SEARCH_RESULT_LIMIT).await?;
        debug!(results = tracks.len(), "catalog search finished");
        Ok(tracks)
    }

    /// Profile of the connected Spotify account
    pub async fn spotify_profile(&self) -> Result<SpotifyUser> {
        self.catalog.current_user().await
    }

    /// Playlists the connected account owns or follows on Spotify
    pub async fn spotify_playlists(&self) -> Result<SpotifyPlaylistPage> {
        self.catalog.user_playlists().await
    }

    pub async fn playlists(&self) -> Result<Vec<Playlist>> {
        self.playlists.list_playlists().await
    }

    /// Load a playlist and make it the active one
    ///
    /// # Errors
    /// Propagates backend failures; the active playlist is left unchanged.
    pub async fn open_playlist(&self, playlist_id: &str) -> Result<Playlist> {
        let playlist = self.playlists.get_playlist(playlist_id).await?;
        *self.active.write() = Some(playlist.clone());
        Ok(playlist)
    }

    /// Create an empty playlist owned by the signed-in user
    ///
    /// # Errors
    /// - `ListifyError::Unauthenticated` without a first-party session
    /// - `ListifyError::InvalidInput` for a blank name
    /// - backend failures, logged under `PlaylistCreate`
    pub async fn create_playlist(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Playlist> {
        let user = self
            .session
            .user()
            .ok_or_else(|| ListifyError::Unauthenticated("sign in to create playlists".into()))?;
        let name = validate_name(name)?;

        let playlist = NewPlaylist {
            name,
            description: description.map(str::to_string),
            songs: Vec::new(),
            user_id: user.id,
        };

        let created = self
            .log_failure(CONTEXT_PLAYLIST_CREATE, async {
                self.playlists.create_playlist(&playlist).await
            })
            .await?;
        info!(playlist_id = %created.id, "playlist created");
        Ok(created)
    }

    /// Rename a playlist or change its description
    ///
    /// # Errors
    /// - `ListifyError::InvalidInput` for a blank name
    /// - backend failures, logged under `PlaylistUpdate`
    pub async fn update_playlist(
        &self,
        playlist_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Playlist> {
        let update = PlaylistUpdate {
            name: validate_name(name)?,
            description: description.map(str::to_string),
        };

        let updated = self
            .log_failure(CONTEXT_PLAYLIST_UPDATE, async {
                self.playlists.update_playlist(playlist_id, &update).await
            })
            .await?;
        self.sync_active(&updated);
        Ok(updated)
    }

    /// Delete a playlist; closes it if it was active
    ///
    /// # Errors
    /// Backend failures, logged under `PlaylistDelete`
    pub async fn delete_playlist(&self, playlist_id: &str) -> Result<()> {
        self.log_failure(CONTEXT_PLAYLIST_DELETE, async {
            self.playlists.delete_playlist(playlist_id).await
        })
        .await?;

        let mut active = self.active.write();
        if active.as_ref().is_some_and(|playlist| playlist.id == playlist_id) {
            *active = None;
        }
        info!(%playlist_id, "playlist deleted");
        Ok(())
    }

    /// Add a catalog track to a playlist
    ///
    /// # Errors
    /// Backend failures, logged under `AddSongToPlaylist`
    #[instrument(skip(self, track), fields(spotify_id = %track.id))]
    pub async fn add_track(&self, playlist_id: &str, track: &SpotifyTrack) -> Result<Playlist> {
        let song = NewSong::from(track);
        let updated = self
            .log_failure(CONTEXT_ADD_SONG, async {
                self.playlists.add_song(playlist_id, &song).await
            })
            .await?;
        self.sync_active(&updated);
        Ok(updated)
    }

    /// Remove a song from a playlist
    ///
    /// # Errors
    /// Backend failures, logged under `DeleteSongFromPlaylist`
    pub async fn remove_song(&self, playlist_id: &str, song_id: &str) -> Result<Playlist> {
        let updated = self
            .log_failure(CONTEXT_DELETE_SONG, async {
                self.playlists.delete_song(playlist_id, song_id).await
            })
            .await?;
        self.sync_active(&updated);
        Ok(updated)
    }

    pub fn active_playlist(&self) -> Option<Playlist> {
        self.active.read().clone()
    }

    pub fn clear_active_playlist(&self) {
        *self.active.write() = None;
    }

    fn sync_active(&self, updated: &Playlist) {
        let mut active = self.active.write();
        if active.as_ref().is_some_and(|playlist| playlist.id == updated.id) {
            *active = Some(updated.clone());
        }
    }

    async fn log_failure<T>(
        &self,
        context: &str,
        operation: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        let result = operation.await;
        if let Err(err) = &result {
            self.errors.log_error(err, context);
        }
        result
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ListifyError::InvalidInput("playlist name is required".to_string()));
    }
    Ok(name.to_string())
}
