//! Resolving the access cookie into an authenticated caller.

use axum::http::HeaderMap;
use sqlx::PgPool;
use tracing::debug;

use crate::api::error::ApiError;

use super::{
    session::{extract_bearer_cookie, ACCESS_COOKIE_NAME},
    state::AuthState,
    storage::{lookup_user, Credential},
};

/// An authenticated caller, resolved from the access cookie.
pub(crate) struct Principal {
    credential: Credential,
}

impl Principal {
    pub(crate) fn email(&self) -> &str {
        &self.credential.email
    }

    pub(crate) fn into_credential(self) -> Credential {
        self.credential
    }
}

/// Verify the access cookie and resolve its subject to a stored credential.
///
/// Every failure mode renders as the same 401 so callers cannot tell a
/// missing cookie from an expired or forged token.
pub(crate) async fn require_auth(
    headers: &HeaderMap,
    pool: &PgPool,
    auth_state: &AuthState,
) -> Result<Principal, ApiError> {
    let Some(token) = extract_bearer_cookie(headers, ACCESS_COOKIE_NAME) else {
        return Err(ApiError::Unauthenticated);
    };

    let claims = auth_state.signer().verify(&token).map_err(|err| {
        debug!("Access token rejected: {err}");
        ApiError::Unauthenticated
    })?;

    // The subject may have been deleted since the token was issued.
    let Some(credential) = lookup_user(pool, &claims.sub).await? else {
        return Err(ApiError::Unauthenticated);
    };

    Ok(Principal { credential })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn principal_exposes_email() {
        let now = Utc::now();
        let principal = Principal {
            credential: Credential {
                email: "alice@example.com".to_string(),
                password_hash: "$2b$12$abc".to_string(),
                created_at: now,
                updated_at: now,
            },
        };

        assert_eq!(principal.email(), "alice@example.com");
        assert_eq!(principal.into_credential().email, "alice@example.com");
    }
}
