pub mod config;
pub mod error;
pub mod state;
pub mod auth;
pub mod accounts;
pub mod db;
pub mod models;
pub mod reset;
pub mod routes;
pub mod views;
pub mod email;
pub mod uploads;
pub mod rate_limit;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use sqlx::PgPool;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::accounts::PgAccountStore;
use crate::config::Config;
use crate::email::{LogNotifier, Notifier, SystemMailer};
use crate::state::{AppState, SharedState};

/// Production wiring: Postgres-backed accounts and SMTP mail when configured. A relay that
/// is configured but unusable is a startup error.
pub fn build_app(pool: PgPool, config: Config) -> Result<(Router, SharedState), String> {
    let notifier: Arc<dyn Notifier> = match config.smtp.as_ref().map(SystemMailer::new) {
        Some(Ok(mailer)) => {
            tracing::info!("System SMTP configured");
            Arc::new(mailer)
        }
        Some(Err(e)) => return Err(e),
        None => {
            tracing::warn!("System SMTP not configured, emails will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let accounts = Arc::new(PgAccountStore::new(pool.clone()));
    let state: SharedState = Arc::new(AppState::new(pool, config, accounts, notifier));

    Ok((router(state.clone()), state))
}

pub fn router(state: SharedState) -> Router {
    let max_body_size = state.config.max_body_size;

    Router::new()
        .merge(routes::api_routes())
        .merge(views::view_routes())
        .route("/health", axum::routing::get(health))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
