//! Password hashing with bcrypt.

use anyhow::{Context, Result};
use tracing::warn;

/// Hash a plaintext password, each call salts anew so equal inputs yield
/// distinct hashes.
pub fn hash_password(plain: &str) -> Result<String> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST).context("Failed to hash password")
}

/// Check a plaintext password against a stored hash. A malformed hash
/// counts as a failed match.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    match bcrypt::verify(plain, hashed) {
        Ok(matched) => matched,
        Err(err) => {
            warn!("Failed to verify password hash: {err}");
            false
        }
    }
}

// bcrypt is deliberately slow, keep it off the async executor.
pub async fn hash_password_blocking(plain: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .context("Password hashing task failed")?
}

pub async fn verify_password_blocking(plain: String, hashed: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &hashed))
        .await
        .context("Password verification task failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hashed = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hashed));
        assert!(!verify_password("hunter3", &hashed));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("hunter2").unwrap();
        let second = hash_password("hunter2").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_never_matches() {
        assert!(!verify_password("hunter2", "not-a-bcrypt-hash"));
        assert!(!verify_password("hunter2", ""));
    }

    #[tokio::test]
    async fn blocking_wrappers_round_trip() {
        let hashed = hash_password_blocking("hunter2".to_string()).await.unwrap();
        assert!(
            verify_password_blocking("hunter2".to_string(), hashed)
                .await
                .unwrap()
        );
    }
}
