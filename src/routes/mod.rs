pub mod auth;
pub mod events;
pub mod news;
pub mod reset;

use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;

use crate::state::SharedState;

#[derive(Serialize)]
pub struct InsertResponse {
    pub inserted: bool,
    pub msg: String,
}

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/logout", get(auth::logout))
        .route("/api/home", get(auth::home))
        .route("/api/change-password", post(auth::change_password))
        // Password reset
        .route("/api/reset-password", post(reset::request_link))
        .route("/reset-password", post(reset::request_link))
        // Events
        .route("/api/events", get(events::list).post(events::create))
        // News
        .route("/api/news", get(news::list).post(news::create))
        .route("/api/news/{id}", get(news::get))
}
