//! Playlist library and Spotify catalog use cases

pub mod ports;
pub mod service;

pub use ports::{CatalogPort, PlaylistPort};
pub use service::LibraryService;
