use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::auth::jwt::{self, Claims, SESSION_DAYS};
use crate::error::AppError;
use crate::models::Account;
use crate::state::SharedState;

pub const SESSION_COOKIE: &str = "session";

/// The signed-in account for the current request, handed to handlers explicitly.
#[derive(Debug, Clone)]
pub struct Session {
    pub account_id: Uuid,
    pub username: String,
}

impl Session {
    /// Accepts `claims` only while the account still exists and its password has not
    /// changed since the token was issued.
    async fn resolve(claims: Claims, state: &SharedState) -> Result<Option<Self>, AppError> {
        let current = state
            .accounts
            .find_by_identifier(&claims.username)
            .await?
            .filter(|a| a.id == claims.sub && a.credential_version == claims.ver);

        Ok(current.map(|_| Self {
            account_id: claims.sub,
            username: claims.username,
        }))
    }
}

/// Issue a session cookie for `account`.
pub fn start(account: &Account, secret: &str) -> Result<CookieJar, AppError> {
    let claims = Claims::new(account.id, account.username.clone(), account.credential_version);
    let token = jwt::encode_token(&claims, secret).map_err(AppError::Internal)?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(SESSION_DAYS))
        .build();

    Ok(CookieJar::new().add(cookie))
}

pub fn end() -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    CookieJar::new().add(cookie)
}

fn bearer_or_cookie(parts: &Parts) -> Result<Option<String>, AppError> {
    if let Some(auth_header) = parts.headers.get("authorization") {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(Some(token.to_string()));
        }
    }

    let jar = CookieJar::from_headers(&parts.headers);
    Ok(jar.get(SESSION_COOKIE).map(|c| c.value().to_string()))
}

impl FromRequestParts<SharedState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_or_cookie(parts)?
            .ok_or_else(|| AppError::Unauthorized("Not logged in".to_string()))?;

        let claims = jwt::decode_token(&token, &state.config.session_secret)
            .map_err(|_| AppError::Unauthorized("Invalid or expired session".to_string()))?;

        Session::resolve(claims, state)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired session".to_string()))
    }
}

impl OptionalFromRequestParts<SharedState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Option<Self>, Self::Rejection> {
        let Some(token) = bearer_or_cookie(parts)? else {
            return Ok(None);
        };

        // A stale cookie is the same as no session.
        let Ok(claims) = jwt::decode_token(&token, &state.config.session_secret) else {
            return Ok(None);
        };
        Session::resolve(claims, state).await
    }
}
