//! Domain types and models
//!
//! - [`library`]: first-party Listify models (users, playlists, songs, the
//!   response envelope and the bearer session)
//! - [`catalog`]: Spotify Web API models and the track to song mapping

pub mod catalog;
pub mod library;

pub use catalog::{
    ExternalUrls, SpotifyAlbum, SpotifyArtist, SpotifyImage, SpotifyPlaylist, SpotifyPlaylistPage,
    SpotifyTrack, SpotifyUser, TrackPage, TrackSearchResponse,
};
pub use library::{
    ApiResponse, AuthResponse, Credentials, NewPlaylist, NewSong, Playlist, PlaylistSong,
    PlaylistUpdate, Registration, Session, Song, User,
};
