//! Password reset: issuing emailed single-use tokens, checking them, and trading a valid
//! token for a new password exactly once.

pub mod clock;
pub mod token;

use std::sync::Arc;
use std::time::Duration;

use crate::accounts::{AccountStore, StoreError};
use crate::auth::password;
use crate::config::Config;
use crate::email::{templates, Notifier};
use crate::models::Account;

use clock::{Clock, SystemClock};

pub const LINK_SENT_MESSAGE: &str = "Password reset link sent to your registered email!";

#[derive(Debug)]
pub enum ResetError {
    /// Input rejected before anything was looked up or changed.
    Validation(String),
    NoSuchAccount,
    /// Token unknown, already used, or expired. Deliberately carries no detail.
    Invalid,
    PersistenceFailed(String),
    /// The reset link could not be delivered. The issued token has been revoked.
    NotificationFailed(String),
    /// The password was changed but the confirmation email could not be delivered.
    ConfirmationFailed(Box<Account>, String),
}

impl std::fmt::Display for ResetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetError::Validation(msg) => write!(f, "Validation failed: {msg}"),
            ResetError::NoSuchAccount => write!(f, "No such account"),
            ResetError::Invalid => write!(f, "Reset token is invalid or has expired"),
            ResetError::PersistenceFailed(msg) => write!(f, "Persistence failed: {msg}"),
            ResetError::NotificationFailed(msg) => write!(f, "Reset email failed: {msg}"),
            ResetError::ConfirmationFailed(account, msg) => write!(
                f,
                "Confirmation email to {} failed: {msg}",
                account.username
            ),
        }
    }
}

impl From<StoreError> for ResetError {
    fn from(err: StoreError) -> Self {
        ResetError::PersistenceFailed(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ResetSettings {
    /// Prefix for the emailed link, e.g. `https://dept.example.edu`.
    pub base_url: String,
    pub site_name: String,
    pub token_ttl: Duration,
    pub mail_timeout: Duration,
}

impl ResetSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            site_name: config.site_name.clone(),
            token_ttl: config.reset_token_ttl,
            mail_timeout: config.mail_timeout,
        }
    }
}

pub struct PasswordResetCoordinator {
    store: Arc<dyn AccountStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    settings: ResetSettings,
}

impl PasswordResetCoordinator {
    pub fn new(
        store: Arc<dyn AccountStore>,
        notifier: Arc<dyn Notifier>,
        settings: ResetSettings,
    ) -> Self {
        Self {
            store,
            notifier,
            clock: Arc::new(SystemClock),
            settings,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Issue a fresh token for `identifier` and email the reset link to the account.
    pub async fn request_reset(&self, identifier: &str) -> Result<&'static str, ResetError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ResetError::Validation("Username is required".to_string()));
        }

        let token = token::generate();
        let token_hash = token::hash(&token);

        let Some(account) = self.store.find_by_identifier(identifier).await? else {
            tracing::info!("Password reset requested for unknown account");
            return Err(ResetError::NoSuchAccount);
        };

        let ttl = chrono::Duration::from_std(self.settings.token_ttl)
            .map_err(|e| ResetError::PersistenceFailed(format!("Invalid token lifetime: {e}")))?;
        let expires_at = self.clock.now() + ttl;
        self.store
            .set_reset_token(account.id, &token_hash, expires_at)
            .await?;

        let reset_url = format!("{}/reset/{token}", self.settings.base_url);
        let body = templates::render_password_reset(&reset_url, ttl.num_minutes());
        let subject = templates::password_reset_subject(&self.settings.site_name);

        if let Err(e) = self.notify(&account.username, &subject, &body).await {
            // Nobody received this token, so it must not stay live.
            if let Err(clear_err) = self.store.clear_reset_token(account.id, &token_hash).await {
                tracing::error!(
                    account_id = %account.id,
                    "Failed to revoke undelivered reset token: {clear_err}"
                );
            }
            return Err(ResetError::NotificationFailed(e));
        }

        tracing::info!(
            account_id = %account.id,
            "Password reset link sent to {}",
            account.username
        );
        Ok(LINK_SENT_MESSAGE)
    }

    /// The account a still-valid `token` belongs to. Leaves the token in place.
    pub async fn validate_token(&self, token: &str) -> Result<Account, ResetError> {
        let token_hash = token::hash(token);
        self.store
            .find_by_valid_token(&token_hash, self.clock.now())
            .await?
            .ok_or(ResetError::Invalid)
    }

    /// Spend `token` on a password change and send a confirmation email.
    pub async fn complete_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<Account, ResetError> {
        // An unusable token is reported before anything about the password.
        self.validate_token(token).await?;

        password::check_policy(new_password).map_err(ResetError::Validation)?;

        let token_hash = token::hash(token);
        let account = self
            .store
            .consume_reset_token(&token_hash, self.clock.now(), new_password)
            .await?
            .ok_or(ResetError::Invalid)?;

        tracing::info!(account_id = %account.id, "Password reset completed");

        let subject = templates::password_changed_subject();
        let body = templates::render_password_changed(&account.username);
        if let Err(e) = self.notify(&account.username, &subject, &body).await {
            return Err(ResetError::ConfirmationFailed(Box::new(account), e));
        }

        Ok(account)
    }

    async fn notify(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        let timeout = self.settings.mail_timeout;
        match tokio::time::timeout(timeout, self.notifier.send(to, subject, body)).await {
            Ok(result) => result,
            Err(_) => Err(format!("Email dispatch timed out after {timeout:?}")),
        }
    }
}
