//! Spotify Web API models
//!
//! Only the fields Listify reads are modelled; everything else in the Spotify
//! payloads is ignored during deserialization.

use serde::{Deserialize, Serialize};

use super::library::NewSong;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyAlbum {
    pub name: String,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: String,
}

/// Track as returned by `search?type=track`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyTrack {
    pub id: String,
    pub name: String,
    pub artists: Vec<SpotifyArtist>,
    pub album: SpotifyAlbum,
    pub duration_ms: u64,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPage {
    #[serde(default)]
    pub items: Vec<SpotifyTrack>,
}

/// Body of `GET search?type=track`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSearchResponse {
    #[serde(default)]
    pub tracks: TrackPage,
}

/// Body of `GET me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyUser {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyPlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

/// Body of `GET me/playlists`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyPlaylistPage {
    #[serde(default)]
    pub items: Vec<SpotifyPlaylist>,
    #[serde(default)]
    pub total: u32,
}

impl From<&SpotifyTrack> for NewSong {
    fn from(track: &SpotifyTrack) -> Self {
        // Nearest whole second, halves rounding up.
        let duration = u32::try_from((track.duration_ms + 500) / 1000).unwrap_or(u32::MAX);

        Self {
            title: track.name.clone(),
            artists: track.artists.iter().map(|a| a.name.clone()).collect(),
            album: track.album.name.clone(),
            duration,
            cover: track.album.images.first().map(|i| i.url.clone()).unwrap_or_default(),
            spotify_id: track.id.clone(),
            spotify_url: track.external_urls.spotify.clone(),
        }
    }
}
