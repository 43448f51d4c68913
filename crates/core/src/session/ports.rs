//! Port interfaces for first-party authentication
//!
//! These traits define the boundary between the session logic and the
//! Listify backend client.

use async_trait::async_trait;
use listify_domain::{AuthResponse, Credentials, Registration, Result};

/// Email/password authentication against the Listify backend
#[async_trait]
pub trait AuthApiPort: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse>;

    /// `POST /auth/register`
    async fn register(&self, registration: &Registration) -> Result<AuthResponse>;
}
