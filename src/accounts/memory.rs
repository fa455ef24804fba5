use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use super::{AccountStore, StoreError};
use crate::auth::password;
use crate::models::Account;

/// Process-local account store. Every operation runs under a single lock, which is what
/// makes `consume_reset_token` a true compare-and-clear.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current copy of an account, bypassing the token checks.
    pub fn snapshot(&self, id: Uuid) -> Option<Account> {
        self.lock().ok().and_then(|accounts| accounts.get(&id).cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Account>>, StoreError> {
        self.accounts
            .lock()
            .map_err(|_| StoreError::Backend("Account store lock poisoned".to_string()))
    }
}

fn token_matches(account: &Account, token_hash: &str, now: DateTime<Utc>) -> bool {
    match (&account.reset_token_hash, account.reset_token_expires_at) {
        (Some(stored), Some(expires_at)) => {
            bool::from(stored.as_bytes().ct_eq(token_hash.as_bytes())) && expires_at > now
        }
        _ => false,
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(
        &self,
        name: &str,
        username: &str,
        password: &str,
    ) -> Result<Account, StoreError> {
        let pw_hash = password::hash(password).map_err(StoreError::Backend)?;

        let mut accounts = self.lock()?;
        if accounts.values().any(|a| a.username == username) {
            return Err(StoreError::Duplicate("Username is already taken".to_string()));
        }

        let account = Account {
            id: Uuid::now_v7(),
            name: name.to_string(),
            username: username.to_string(),
            password_hash: pw_hash,
            credential_version: 0,
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: Utc::now(),
        };
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.lock()?;
        Ok(accounts.values().find(|a| a.username == identifier).cloned())
    }

    async fn find_by_valid_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, StoreError> {
        let accounts = self.lock()?;
        Ok(accounts
            .values()
            .find(|a| token_matches(a, token_hash, now))
            .cloned())
    }

    async fn set_reset_token(
        &self,
        account_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut accounts = self.lock()?;
        let account = accounts
            .get_mut(&account_id)
            .ok_or_else(|| StoreError::Backend(format!("Account {account_id} vanished")))?;
        account.reset_token_hash = Some(token_hash.to_string());
        account.reset_token_expires_at = Some(expires_at);
        Ok(())
    }

    async fn clear_reset_token(
        &self,
        account_id: Uuid,
        token_hash: &str,
    ) -> Result<(), StoreError> {
        let mut accounts = self.lock()?;
        if let Some(account) = accounts.get_mut(&account_id) {
            if account.reset_token_hash.as_deref() == Some(token_hash) {
                account.reset_token_hash = None;
                account.reset_token_expires_at = None;
            }
        }
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
        new_password: &str,
    ) -> Result<Option<Account>, StoreError> {
        // Hash outside the lock; argon2 is deliberately slow.
        let pw_hash = password::hash(new_password).map_err(StoreError::Backend)?;

        let mut accounts = self.lock()?;
        let Some(account) = accounts
            .values_mut()
            .find(|a| token_matches(a, token_hash, now))
        else {
            return Ok(None);
        };

        account.reset_token_hash = None;
        account.reset_token_expires_at = None;
        account.password_hash = pw_hash;
        account.credential_version += 1;
        Ok(Some(account.clone()))
    }

    async fn set_credential(
        &self,
        account_id: Uuid,
        new_password: &str,
    ) -> Result<Account, StoreError> {
        let pw_hash = password::hash(new_password).map_err(StoreError::Backend)?;

        let mut accounts = self.lock()?;
        let account = accounts
            .get_mut(&account_id)
            .ok_or_else(|| StoreError::Backend(format!("Account {account_id} vanished")))?;
        account.password_hash = pw_hash;
        account.credential_version += 1;
        Ok(account.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[tokio::test]
    async fn create_rejects_duplicate_username() {
        let store = MemoryAccountStore::new();
        store.create("Alice", "alice@example.com", "password123").await.unwrap();

        let err = store
            .create("Other Alice", "alice@example.com", "password456")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn consume_only_matches_unexpired_token() {
        let store = MemoryAccountStore::new();
        let account = store.create("Alice", "alice@example.com", "password123").await.unwrap();
        let now = Utc::now();
        store
            .set_reset_token(account.id, "abc", now + Duration::minutes(10))
            .await
            .unwrap();

        let late = now + Duration::minutes(11);
        assert!(store.consume_reset_token("abc", late, "newpass123").await.unwrap().is_none());
        assert!(store.consume_reset_token("abd", now, "newpass123").await.unwrap().is_none());

        let updated = store
            .consume_reset_token("abc", now, "newpass123")
            .await
            .unwrap()
            .expect("token should match");
        assert!(!updated.has_pending_reset());
        assert_eq!(updated.credential_version, account.credential_version + 1);
        assert!(updated.reset_token_expires_at.is_none());
        assert!(password::verify("newpass123", &updated.password_hash).unwrap());
    }

    #[tokio::test]
    async fn set_credential_bumps_version() {
        let store = MemoryAccountStore::new();
        let account = store.create("Alice", "alice@example.com", "password123").await.unwrap();
        assert_eq!(account.credential_version, 0);

        let updated = store.set_credential(account.id, "newpass123").await.unwrap();
        assert_eq!(updated.credential_version, 1);
        assert!(password::verify("newpass123", &updated.password_hash).unwrap());
        assert_eq!(store.snapshot(account.id).unwrap().credential_version, 1);
    }

    #[tokio::test]
    async fn clear_leaves_newer_token_alone() {
        let store = MemoryAccountStore::new();
        let account = store.create("Alice", "alice@example.com", "password123").await.unwrap();
        let expires = Utc::now() + Duration::minutes(10);
        store.set_reset_token(account.id, "second", expires).await.unwrap();

        store.clear_reset_token(account.id, "first").await.unwrap();

        let current = store.snapshot(account.id).unwrap();
        assert_eq!(current.reset_token_hash.as_deref(), Some("second"));
        assert_eq!(current.reset_token_expires_at, Some(expires));
    }
}
