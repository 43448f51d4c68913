//! # Listify Domain
//!
//! Business domain types and models for Listify.
//!
//! This crate contains:
//! - Library models (users, playlists, songs) and the first-party API envelope
//! - Spotify catalog models and the track to song mapping
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants (cookie names, storage keys, timing)
//!
//! ## Architecture
//! - No dependencies on other Listify crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
