//! Session endpoints backed by token pair cookies.

use anyhow::Context;
use axum::{
    extract::Extension,
    http::{
        header::{InvalidHeaderValue, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;

use crate::api::error::ApiError;

use super::{
    password::verify_password_blocking,
    principal::require_auth,
    state::AuthState,
    storage::lookup_user,
    token::IssuedToken,
    types::{LoginRequest, MessageResponse, UserResponse},
    utils::normalize_email,
};

pub(super) const ACCESS_COOKIE_NAME: &str = "access_token";
pub(super) const REFRESH_COOKIE_NAME: &str = "refresh_token";

// Cookie values carry the auth scheme so they can be replayed verbatim into
// an Authorization header. The space forces quoting.
const SCHEME_PREFIX: &str = "Bearer ";

// RFC 7231 IMF-fixdate, as required by the cookie Expires attribute.
const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session established", body = MessageResponse),
        (status = 400, description = "Missing payload"),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn login(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::BadRequest("Missing payload"));
    };

    let email = normalize_email(&request.email);

    // Unknown email and wrong password take the same path to the same error.
    let Some(user) = lookup_user(&pool, &email).await? else {
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password_blocking(request.password, user.password_hash).await? {
        return Err(ApiError::InvalidCredentials);
    }

    let response_headers = issue_session(&auth_state, &user.email)?;
    debug!("Session established for {email}");

    Ok((
        StatusCode::OK,
        response_headers,
        Json(MessageResponse::new("Login successful")),
    ))
}

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Session cleared", body = MessageResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn logout(
    auth_state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, ApiError> {
    // Logout is idempotent, cookies are cleared whether or not a session exists.
    let secure = auth_state.config().cookie_secure();
    let mut response_headers = HeaderMap::new();
    response_headers.append(
        SET_COOKIE,
        clear_cookie(ACCESS_COOKIE_NAME, secure).context("Failed to build access cookie")?,
    );
    response_headers.append(
        SET_COOKIE,
        clear_cookie(REFRESH_COOKIE_NAME, secure).context("Failed to build refresh cookie")?,
    );

    Ok((
        StatusCode::OK,
        response_headers,
        Json(MessageResponse::new("Logout successful")),
    ))
}

#[utoipa::path(
    post,
    path = "/refresh",
    responses(
        (status = 200, description = "New token pair issued", body = MessageResponse),
        (status = 401, description = "Could not validate credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn refresh(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(token) = extract_bearer_cookie(&headers, REFRESH_COOKIE_NAME) else {
        return Err(ApiError::Unauthenticated);
    };

    let claims = auth_state.signer().verify(&token).map_err(|err| {
        debug!("Refresh token rejected: {err}");
        ApiError::Unauthenticated
    })?;

    // The subject must still resolve to a stored credential.
    let Some(user) = lookup_user(&pool, &claims.sub).await? else {
        return Err(ApiError::Unauthenticated);
    };

    let response_headers = issue_session(&auth_state, &user.email)?;

    Ok((
        StatusCode::OK,
        response_headers,
        Json(MessageResponse::new("Token refreshed")),
    ))
}

#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "The authenticated user", body = UserResponse),
        (status = 401, description = "Could not validate credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn me(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &pool, &auth_state).await?;

    Ok((
        StatusCode::OK,
        Json(UserResponse::from(principal.into_credential())),
    ))
}

/// Issue a fresh access/refresh pair and render both as `Set-Cookie` headers.
fn issue_session(auth_state: &AuthState, subject: &str) -> Result<HeaderMap, ApiError> {
    let config = auth_state.config();
    let access = auth_state.signer().issue(subject, config.access_ttl())?;
    let refresh = auth_state.signer().issue(subject, config.refresh_ttl())?;

    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        bearer_cookie(ACCESS_COOKIE_NAME, &access, config.cookie_secure())
            .context("Failed to build access cookie")?,
    );
    headers.append(
        SET_COOKIE,
        bearer_cookie(REFRESH_COOKIE_NAME, &refresh, config.cookie_secure())
            .context("Failed to build refresh cookie")?,
    );

    Ok(headers)
}

/// Build an `HttpOnly` cookie holding a `Bearer` token. The value is quoted
/// because the scheme prefix contains a space.
fn bearer_cookie(
    name: &str,
    issued: &IssuedToken,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let expires = issued.expires_at.format(EXPIRES_FORMAT);
    let mut cookie = format!(
        "{name}=\"{SCHEME_PREFIX}{token}\"; Path=/; HttpOnly; SameSite=Lax; Expires={expires}",
        token = issued.token,
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_cookie(name: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Extract a token from the named cookie, stripping quotes and the scheme
/// prefix. A cookie without the prefix counts as missing.
pub(super) fn extract_bearer_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        // Pairs without '=' are skipped rather than aborting the scan.
        let Some((key, val)) = pair.trim().split_once('=') else {
            continue;
        };
        if key.trim() == name {
            let token = val.trim().trim_matches('"').strip_prefix(SCHEME_PREFIX)?.trim();
            if token.is_empty() {
                return None;
            }
            return Some(token.to_string());
        }
    }
    None
}
