pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::Account;

pub use memory::MemoryAccountStore;
pub use postgres::PgAccountStore;

#[derive(Debug)]
pub enum StoreError {
    Duplicate(String),
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Duplicate(msg) => write!(f, "Duplicate: {msg}"),
            StoreError::Backend(msg) => write!(f, "Store error: {msg}"),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Duplicate("Username is already taken".to_string());
            }
        }
        StoreError::Backend(err.to_string())
    }
}

/// Account persistence. Reset tokens only ever travel as SHA-256 hex digests and the
/// token/expiry pair is only written or cleared together.
///
/// Implementations own credential hashing: every method taking a plaintext password
/// hashes it before it is stored, and bumps `credential_version` when it replaces one.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create(
        &self,
        name: &str,
        username: &str,
        password: &str,
    ) -> Result<Account, StoreError>;

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, StoreError>;

    /// Account whose reset token matches and whose expiry is strictly after `now`.
    async fn find_by_valid_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, StoreError>;

    async fn set_reset_token(
        &self,
        account_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Clears the pending reset only if it is still `token_hash`.
    async fn clear_reset_token(
        &self,
        account_id: Uuid,
        token_hash: &str,
    ) -> Result<(), StoreError>;

    /// Compare-and-clear: if an unexpired reset matching `token_hash` exists, clear it and
    /// set the new password as one atomic step. Returns the updated account, or `None` when
    /// nothing matched.
    async fn consume_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
        new_password: &str,
    ) -> Result<Option<Account>, StoreError>;

    /// Sets a new password and returns the updated account.
    async fn set_credential(
        &self,
        account_id: Uuid,
        new_password: &str,
    ) -> Result<Account, StoreError>;
}
