use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    /// Login identifier. Doubles as the address reset emails are sent to.
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Bumped on every password change; sessions minted for an older value are dead.
    #[serde(skip_serializing)]
    pub credential_version: i32,
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn has_pending_reset(&self) -> bool {
        self.reset_token_hash.is_some()
    }
}
