//! Infrastructure error handling
//!
//! Foreign errors (`reqwest`, `std::io`, `toml`, `url`) are converted into
//! [`ListifyError`](listify_domain::ListifyError) through the [`InfraError`]
//! newtype so the conversions stay on the infrastructure side.

pub mod conversions;

pub use conversions::InfraError;
