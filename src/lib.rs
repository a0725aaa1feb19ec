//! # Janua (user accounts and session tokens)
//!
//! `janua` stores user credentials, authenticates login requests, and issues
//! short-lived access / long-lived refresh JWT pairs carried in http-only
//! cookies.
//!
//! ## Sessions
//!
//! Sessions are stateless: the server keeps no session record. A login mints
//! an access token and a refresh token, both signed with a symmetric secret
//! and carrying `{sub, exp}` claims. The client holds them in the
//! `access_token` and `refresh_token` cookies, each valued
//! `"Bearer " + token`. Logout clears the cookies; issued tokens stay valid
//! until their natural expiry.
//!
//! ## Credentials
//!
//! Users are keyed by email. Passwords are bcrypt-hashed before storage and
//! never appear in any response. Login failures are indistinguishable
//! between "no such user" and "wrong password" to prevent account
//! enumeration.

pub mod api;
pub mod cli;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
