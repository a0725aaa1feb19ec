//! Database helpers for stored credentials.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;

use super::utils::is_unique_violation;

/// Outcome when attempting to create a new user.
#[derive(Debug)]
pub(crate) enum CreateOutcome {
    Created,
    Conflict,
}

/// A stored credential row. The hash never leaves the handler layer.
pub(crate) struct Credential {
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Look up a credential by email.
pub(crate) async fn lookup_user(pool: &PgPool, email: &str) -> Result<Option<Credential>> {
    let query = "SELECT email, password_hash, created_at, updated_at FROM users WHERE email = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user")?;

    Ok(row.map(|row| Credential {
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }))
}

pub(crate) async fn list_users(pool: &PgPool) -> Result<Vec<Credential>> {
    let query = r"
        SELECT email, password_hash, created_at, updated_at
        FROM users
        ORDER BY email
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list users")?;

    Ok(rows
        .into_iter()
        .map(|row| Credential {
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
        .collect())
}

pub(crate) async fn insert_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
) -> Result<CreateOutcome> {
    let mut tx = pool.begin().await.context("begin create user transaction")?;

    let query = r"
        INSERT INTO users (email, password_hash)
        VALUES ($1, $2)
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(email)
        .bind(password_hash)
        .execute(&mut *tx)
        .instrument(span)
        .await;

    if let Err(err) = result {
        if is_unique_violation(&err) {
            let _ = tx.rollback().await;
            return Ok(CreateOutcome::Conflict);
        }
        return Err(err).context("failed to insert user");
    }

    tx.commit().await.context("commit create user transaction")?;

    Ok(CreateOutcome::Created)
}

/// Replace a stored password hash. Returns false when no such user exists.
pub(crate) async fn update_password(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
) -> Result<bool> {
    let mut tx = pool
        .begin()
        .await
        .context("begin update password transaction")?;

    let query = r"
        UPDATE users
        SET password_hash = $2,
            updated_at = NOW()
        WHERE email = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(email)
        .bind(password_hash)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("failed to update password")?;

    tx.commit()
        .await
        .context("commit update password transaction")?;

    Ok(result.rows_affected() > 0)
}

/// Delete a credential. Returns false when no such user exists.
pub(crate) async fn delete_user(pool: &PgPool, email: &str) -> Result<bool> {
    let mut tx = pool.begin().await.context("begin delete user transaction")?;

    let query = "DELETE FROM users WHERE email = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(email)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("failed to delete user")?;

    tx.commit()
        .await
        .context("commit delete user transaction")?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::{CreateOutcome, Credential};
    use chrono::Utc;

    #[test]
    fn create_outcome_debug_names() {
        assert_eq!(format!("{:?}", CreateOutcome::Created), "Created");
        assert_eq!(format!("{:?}", CreateOutcome::Conflict), "Conflict");
    }

    #[test]
    fn credential_holds_values() {
        let now = Utc::now();
        let credential = Credential {
            email: "alice@example.com".to_string(),
            password_hash: "$2b$12$abc".to_string(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(credential.email, "alice@example.com");
        assert_eq!(credential.password_hash, "$2b$12$abc");
        assert_eq!(credential.created_at, credential.updated_at);
    }
}
