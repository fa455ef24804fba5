use axum::extract::State;
use axum::http::StatusCode;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::reset::ResetError;
use crate::state::SharedState;

const GENERIC_FAILURE: &str = "Error occurred! Please try again later.";

#[derive(Deserialize)]
pub struct ResetLinkRequest {
    #[serde(alias = "identifier")]
    pub username: String,
}

#[derive(Serialize)]
pub struct ResetLinkResponse {
    #[serde(rename = "linkSent")]
    pub link_sent: bool,
    pub msg: String,
}

fn reply(
    status: StatusCode,
    link_sent: bool,
    msg: &str,
) -> (StatusCode, Json<ResetLinkResponse>) {
    (
        status,
        Json(ResetLinkResponse {
            link_sent,
            msg: msg.to_string(),
        }),
    )
}

pub async fn request_link(
    State(state): State<SharedState>,
    Form(req): Form<ResetLinkRequest>,
) -> (StatusCode, Json<ResetLinkResponse>) {
    let identifier = req.username.trim();

    if state.reset_limiter.check(identifier).is_err() {
        return reply(
            StatusCode::TOO_MANY_REQUESTS,
            false,
            "Too many reset requests. Please try again later.",
        );
    }

    match state.resets.request_reset(identifier).await {
        Ok(msg) => {
            state.reset_limiter.record(identifier);
            reply(StatusCode::OK, true, msg)
        }
        Err(ResetError::Validation(msg)) => reply(StatusCode::BAD_REQUEST, false, &msg),
        Err(ResetError::NoSuchAccount) => {
            reply(StatusCode::NOT_FOUND, false, "No such account exists!")
        }
        Err(e) => {
            tracing::error!("Password reset request failed: {e}");
            reply(StatusCode::INTERNAL_SERVER_ERROR, false, GENERIC_FAILURE)
        }
    }
}
