//! # Listify Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the Listify backend and the
//!   Spotify catalog
//! - The first-party session store
//! - Library use cases (playlists, catalog search, adding tracks)
//!
//! ## Architecture Principles
//! - Only depends on `listify-common` and `listify-domain`
//! - No HTTP or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod library;
pub mod session;

pub use library::{CatalogPort, LibraryService, PlaylistPort};
pub use session::{AuthApiPort, SessionService, SessionStore};
