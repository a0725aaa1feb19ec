//! JWT issuing and verification.
//!
//! Tokens carry only the subject (email) and the expiry instant. No
//! server-side state is kept, revoking a token means waiting it out.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ulid::Ulid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    /// Fresh per issuance, so two tokens minted for the same subject within
    /// the same second still differ.
    pub jti: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token")]
    Invalid,
}

/// A signed token together with its expiry, the latter is reused for the
/// cookie `Expires` attribute.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: &[u8], algorithm: Algorithm) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            algorithm,
        }
    }

    /// Sign a token for `subject` expiring `ttl` from now.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<IssuedToken> {
        self.issue_at(Utc::now(), subject, ttl)
    }

    fn issue_at(&self, now: DateTime<Utc>, subject: &str, ttl: Duration) -> Result<IssuedToken> {
        let expires_at = now + ttl;

        let claims = Claims {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
            jti: Ulid::new().to_string(),
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .context("Failed to sign token")?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Decode and verify a token, the expiry boundary is exact (no leeway).
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(b"sssh", Algorithm::HS256)
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let issued = signer()
            .issue("alice@example.com", Duration::minutes(30))
            .unwrap();

        let claims = signer().verify(&issued.token).unwrap();
        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn expired_token_is_rejected() {
        let issued = signer()
            .issue("alice@example.com", Duration::seconds(-1))
            .unwrap();

        assert_eq!(signer().verify(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn token_close_to_expiry_still_verifies() {
        let issued = signer()
            .issue("alice@example.com", Duration::seconds(30))
            .unwrap();

        assert!(signer().verify(&issued.token).is_ok());
    }

    #[test]
    fn tampered_token_is_invalid() {
        let issued = signer()
            .issue("alice@example.com", Duration::minutes(30))
            .unwrap();

        let mut tampered = issued.token;
        tampered.pop();
        tampered.push('A');

        assert_eq!(signer().verify(&tampered), Err(TokenError::Invalid));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let other = TokenSigner::new(b"not-the-secret", Algorithm::HS256);
        let issued = other
            .issue("alice@example.com", Duration::minutes(30))
            .unwrap();

        assert_eq!(signer().verify(&issued.token), Err(TokenError::Invalid));
    }

    #[test]
    fn algorithm_mismatch_is_invalid() {
        let hs512 = TokenSigner::new(b"sssh", Algorithm::HS512);
        let issued = hs512
            .issue("alice@example.com", Duration::minutes(30))
            .unwrap();

        assert_eq!(signer().verify(&issued.token), Err(TokenError::Invalid));
    }

    #[test]
    fn later_issue_instant_produces_a_different_token() {
        let now = Utc::now();
        let first = signer()
            .issue_at(now, "alice@example.com", Duration::minutes(30))
            .unwrap();
        let second = signer()
            .issue_at(
                now + Duration::seconds(2),
                "alice@example.com",
                Duration::minutes(30),
            )
            .unwrap();

        assert_ne!(first.token, second.token);
    }

    #[test]
    fn tokens_issued_within_the_same_second_differ() {
        let now = Utc::now();
        let first = signer()
            .issue_at(now, "alice@example.com", Duration::minutes(30))
            .unwrap();
        let second = signer()
            .issue_at(now, "alice@example.com", Duration::minutes(30))
            .unwrap();

        assert_ne!(first.token, second.token);

        let claims = signer().verify(&second.token).unwrap();
        assert_eq!(claims.sub, "alice@example.com");
    }
}
