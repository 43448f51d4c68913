//! External service integrations

pub mod spotify;
