//! First-party Listify session
//!
//! - [`ports`]: backend authentication boundary
//! - [`store`]: the persisted bearer session
//! - [`service`]: login, registration and logout

pub mod ports;
pub mod service;
pub mod store;

pub use ports::AuthApiPort;
pub use service::SessionService;
pub use store::SessionStore;
