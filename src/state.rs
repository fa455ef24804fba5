use std::sync::Arc;

use sqlx::PgPool;

use crate::accounts::AccountStore;
use crate::config::Config;
use crate::email::Notifier;
use crate::rate_limit::AttemptLimiter;
use crate::reset::{PasswordResetCoordinator, ResetSettings};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub accounts: Arc<dyn AccountStore>,
    pub resets: PasswordResetCoordinator,
    pub login_limiter: AttemptLimiter,
    pub reset_limiter: AttemptLimiter,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: Config,
        accounts: Arc<dyn AccountStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let settings = ResetSettings::from_config(&config);
        let resets = PasswordResetCoordinator::new(accounts.clone(), notifier, settings);

        Self {
            pool,
            config,
            accounts,
            resets,
            login_limiter: AttemptLimiter::for_logins(),
            reset_limiter: AttemptLimiter::for_reset_requests(),
        }
    }
}
