use askama::Template;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::auth::session;
use crate::models::Account;
use crate::reset::ResetError;
use crate::state::SharedState;

const LINK_ERROR: &str = "An error occurred! Close this link and try again.";

#[derive(Template)]
#[template(path = "reset/form.html")]
struct ResetFormTemplate {
    site_name: String,
    token: String,
    error: Option<String>,
}

#[derive(Template)]
#[template(path = "reset/message.html")]
struct MessageTemplate {
    site_name: String,
    heading: String,
    detail: Option<String>,
}

#[derive(Deserialize)]
pub struct NewPasswordForm {
    pub password: String,
}

fn message_page(
    state: &SharedState,
    status: StatusCode,
    heading: &str,
    detail: Option<String>,
) -> Response {
    let template = MessageTemplate {
        site_name: state.config.site_name.clone(),
        heading: heading.to_string(),
        detail,
    };
    (status, Html(template.render().unwrap_or_default())).into_response()
}

fn form_page(
    state: &SharedState,
    status: StatusCode,
    token: String,
    error: Option<String>,
) -> Response {
    let template = ResetFormTemplate {
        site_name: state.config.site_name.clone(),
        token,
        error,
    };
    (status, Html(template.render().unwrap_or_default())).into_response()
}

fn link_error(state: &SharedState, err: &ResetError) -> Response {
    match err {
        ResetError::Invalid => {
            tracing::info!("Password reset token is invalid or has expired");
            message_page(state, StatusCode::BAD_REQUEST, LINK_ERROR, None)
        }
        other => {
            tracing::error!("Password reset failed: {other}");
            message_page(state, StatusCode::INTERNAL_SERVER_ERROR, LINK_ERROR, None)
        }
    }
}

/// Password-changed page that also signs the account in.
fn signed_in_page(
    state: &SharedState,
    account: &Account,
    heading: &str,
    detail: Option<String>,
) -> Response {
    let page = message_page(state, StatusCode::OK, heading, detail);
    match session::start(account, &state.config.session_secret) {
        Ok(jar) => (jar, page).into_response(),
        Err(e) => {
            tracing::error!(account_id = %account.id, "Failed to start session after reset: {e}");
            page
        }
    }
}

pub async fn reset_form(
    State(state): State<SharedState>,
    Path(token): Path<String>,
) -> Response {
    match state.resets.validate_token(&token).await {
        Ok(_) => form_page(&state, StatusCode::OK, token, None),
        Err(e) => link_error(&state, &e),
    }
}

pub async fn submit_new_password(
    State(state): State<SharedState>,
    Path(token): Path<String>,
    Form(form): Form<NewPasswordForm>,
) -> Response {
    match state.resets.complete_reset(&token, &form.password).await {
        Ok(account) => signed_in_page(
            &state,
            &account,
            "Success! Your password has been changed. You may now continue your work.",
            None,
        ),
        Err(ResetError::ConfirmationFailed(account, reason)) => {
            tracing::error!(account_id = %account.id, "Confirmation email failed: {reason}");
            signed_in_page(
                &state,
                &account,
                "Your password has been changed.",
                Some(format!(
                    "We could not send the confirmation email to {}.",
                    account.username
                )),
            )
        }
        Err(ResetError::Validation(msg)) => {
            form_page(&state, StatusCode::BAD_REQUEST, token, Some(msg))
        }
        Err(e) => link_error(&state, &e),
    }
}
