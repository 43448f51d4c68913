//! Shared cryptographic primitives: AES-256-GCM payload encryption and the
//! random byte source used for PKCE verifiers.

pub mod encryption;
pub mod random;

pub use encryption::{EncryptedData, EncryptionService};
pub use random::{OsRandom, RandomBytesSource};
