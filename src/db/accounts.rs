use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Account;

pub async fn create(
    pool: &PgPool,
    name: &str,
    username: &str,
    password_hash: &str,
) -> Result<Account, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "INSERT INTO accounts (name, username, password_hash)
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(name)
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .await
}

pub async fn find_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_valid_token(
    pool: &PgPool,
    token_hash: &str,
    now: DateTime<Utc>,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "SELECT * FROM accounts
         WHERE reset_token_hash = $1 AND reset_token_expires_at > $2",
    )
    .bind(token_hash)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn set_reset_token(
    pool: &PgPool,
    id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE accounts SET reset_token_hash = $2, reset_token_expires_at = $3 WHERE id = $1",
    )
    .bind(id)
    .bind(token_hash)
    .bind(expires_at)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn clear_reset_token(
    pool: &PgPool,
    id: Uuid,
    token_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE accounts SET reset_token_hash = NULL, reset_token_expires_at = NULL
         WHERE id = $1 AND reset_token_hash = $2",
    )
    .bind(id)
    .bind(token_hash)
    .execute(pool)
    .await?;
    Ok(())
}

/// Clears the reset token and swaps the password hash in one statement, but only while
/// the token still matches and has not expired.
pub async fn consume_reset_token(
    pool: &PgPool,
    token_hash: &str,
    now: DateTime<Utc>,
    password_hash: &str,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "UPDATE accounts
         SET password_hash = $3, credential_version = credential_version + 1,
             reset_token_hash = NULL, reset_token_expires_at = NULL
         WHERE reset_token_hash = $1 AND reset_token_expires_at > $2
         RETURNING *",
    )
    .bind(token_hash)
    .bind(now)
    .bind(password_hash)
    .fetch_optional(pool)
    .await
}

pub async fn update_password(
    pool: &PgPool,
    id: Uuid,
    password_hash: &str,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "UPDATE accounts SET password_hash = $2, credential_version = credential_version + 1
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(password_hash)
    .fetch_optional(pool)
    .await
}
