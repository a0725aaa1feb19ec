//! Credential verification and the stateless session lifecycle.

pub mod password;
pub mod principal;
pub mod session;
pub mod state;
pub mod storage;
pub mod token;
pub mod types;
pub(crate) mod utils;

pub use self::state::{AuthConfig, AuthState};
