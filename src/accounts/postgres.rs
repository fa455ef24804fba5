use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{AccountStore, StoreError};
use crate::auth::password;
use crate::db;
use crate::models::Account;

pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(
        &self,
        name: &str,
        username: &str,
        password: &str,
    ) -> Result<Account, StoreError> {
        let pw_hash = password::hash(password).map_err(StoreError::Backend)?;
        Ok(db::accounts::create(&self.pool, name, username, &pw_hash).await?)
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, StoreError> {
        Ok(db::accounts::find_by_username(&self.pool, identifier).await?)
    }

    async fn find_by_valid_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, StoreError> {
        Ok(db::accounts::find_by_valid_token(&self.pool, token_hash, now).await?)
    }

    async fn set_reset_token(
        &self,
        account_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let updated =
            db::accounts::set_reset_token(&self.pool, account_id, token_hash, expires_at).await?;
        if updated == 0 {
            return Err(StoreError::Backend(format!("Account {account_id} vanished")));
        }
        Ok(())
    }

    async fn clear_reset_token(
        &self,
        account_id: Uuid,
        token_hash: &str,
    ) -> Result<(), StoreError> {
        Ok(db::accounts::clear_reset_token(&self.pool, account_id, token_hash).await?)
    }

    async fn consume_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
        new_password: &str,
    ) -> Result<Option<Account>, StoreError> {
        let pw_hash = password::hash(new_password).map_err(StoreError::Backend)?;
        Ok(db::accounts::consume_reset_token(&self.pool, token_hash, now, &pw_hash).await?)
    }

    async fn set_credential(
        &self,
        account_id: Uuid,
        new_password: &str,
    ) -> Result<Account, StoreError> {
        let pw_hash = password::hash(new_password).map_err(StoreError::Backend)?;
        db::accounts::update_password(&self.pool, account_id, &pw_hash)
            .await?
            .ok_or_else(|| StoreError::Backend(format!("Account {account_id} vanished")))
    }
}
