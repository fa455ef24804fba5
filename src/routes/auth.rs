use axum::extract::State;
use axum::{Form, Json};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::auth::{password, session};
use crate::auth::session::Session;
use crate::config::RegistrationMode;
use crate::error::AppError;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct UserSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub username: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserSummary,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logout: Option<bool>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn register(
    State(state): State<SharedState>,
    Form(req): Form<RegisterRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    if state.config.registration == RegistrationMode::Closed {
        return Err(AppError::Forbidden(
            "Registration is disabled. Contact your site administrator.".to_string(),
        ));
    }

    let username = req.username.trim();
    let name = req.name.trim();
    if username.is_empty() || req.password.is_empty() || name.is_empty() {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    }

    password::check_policy(&req.password).map_err(AppError::BadRequest)?;

    let account = state.accounts.create(name, username, &req.password).await?;
    tracing::info!(account_id = %account.id, "Registered user {}", account.username);

    let jar = session::start(&account, &state.config.session_secret)?;
    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            user: UserSummary {
                name: Some(account.name),
                username: account.username,
            },
        }),
    ))
}

pub async fn login(
    State(state): State<SharedState>,
    Form(req): Form<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let username = req.username.trim();
    if state.login_limiter.check(username).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let Some(account) = state.accounts.find_by_identifier(username).await? else {
        state.login_limiter.record(username);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    };

    let valid =
        password::verify(&req.password, &account.password_hash).map_err(AppError::Internal)?;

    if !valid {
        state.login_limiter.record(username);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    tracing::info!(account_id = %account.id, "Logged in");

    let jar = session::start(&account, &state.config.session_secret)?;
    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            user: UserSummary {
                name: None,
                username: account.username,
            },
        }),
    ))
}

pub async fn logout() -> (CookieJar, Json<StatusResponse>) {
    (
        session::end(),
        Json(StatusResponse {
            success: false,
            logout: Some(true),
        }),
    )
}

pub async fn home(session: Option<Session>) -> Json<StatusResponse> {
    Json(StatusResponse {
        success: session.is_some(),
        logout: None,
    })
}

pub async fn change_password(
    State(state): State<SharedState>,
    session: Session,
    Form(req): Form<ChangePasswordRequest>,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    password::check_policy(&req.new_password).map_err(AppError::BadRequest)?;

    let account = state
        .accounts
        .find_by_identifier(&session.username)
        .await?
        .filter(|a| a.id == session.account_id)
        .ok_or_else(|| AppError::Unauthorized("Account not found".to_string()))?;

    let valid = password::verify(&req.current_password, &account.password_hash)
        .map_err(AppError::Internal)?;

    if !valid {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let account = state
        .accounts
        .set_credential(account.id, &req.new_password)
        .await?;

    tracing::info!(account_id = %account.id, "Password changed");

    // Older sessions are now rejected; hand this client a fresh one.
    let jar = session::start(&account, &state.config.session_secret)?;
    Ok((
        jar,
        Json(MessageResponse {
            message: "Password changed successfully".to_string(),
        }),
    ))
}
