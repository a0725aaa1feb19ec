//! User management endpoints. Registration is open, everything else
//! requires an authenticated session.

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::error::ApiError;

use super::auth::{
    password::hash_password_blocking,
    principal::require_auth,
    state::AuthState,
    storage::{self, CreateOutcome},
    types::{MessageResponse, PasswordUpdateRequest, RegisterRequest, UserResponse},
    utils::{normalize_email, valid_email},
};

#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = MessageResponse),
        (status = 400, description = "Invalid payload or email already registered"),
        (status = 500, description = "Internal server error")
    ),
    tag = "users"
)]
pub async fn register(
    pool: Extension<PgPool>,
    payload: Option<Json<RegisterRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::BadRequest("Missing payload"));
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return Err(ApiError::BadRequest("Invalid email address"));
    }
    if request.password.is_empty() {
        return Err(ApiError::BadRequest("Password must not be empty"));
    }

    let password_hash = hash_password_blocking(request.password).await?;

    match storage::insert_user(&pool, &email, &password_hash).await? {
        CreateOutcome::Created => {
            info!("User created: {email}");
            Ok((
                StatusCode::CREATED,
                Json(MessageResponse::new("User created")),
            ))
        }
        CreateOutcome::Conflict => Err(ApiError::Conflict),
    }
}

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All stored users", body = [UserResponse]),
        (status = 401, description = "Could not validate credentials"),
        (status = 404, description = "No users exist"),
        (status = 500, description = "Internal server error")
    ),
    tag = "users"
)]
pub async fn list_users(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, ApiError> {
    let _principal = require_auth(&headers, &pool, &auth_state).await?;

    let users = storage::list_users(&pool).await?;
    if users.is_empty() {
        return Err(ApiError::NotFound("users"));
    }

    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok((StatusCode::OK, Json(users)))
}

#[utoipa::path(
    get,
    path = "/users/{email}",
    params(
        ("email" = String, Path, description = "Email address of the user")
    ),
    responses(
        (status = 200, description = "The requested user", body = UserResponse),
        (status = 401, description = "Could not validate credentials"),
        (status = 404, description = "No such user"),
        (status = 500, description = "Internal server error")
    ),
    tag = "users"
)]
pub async fn get_user(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let _principal = require_auth(&headers, &pool, &auth_state).await?;

    let email = normalize_email(&email);
    let Some(user) = storage::lookup_user(&pool, &email).await? else {
        return Err(ApiError::NotFound("user"));
    };

    Ok((StatusCode::OK, Json(UserResponse::from(user))))
}

#[utoipa::path(
    put,
    path = "/users/{email}",
    params(
        ("email" = String, Path, description = "Email address of the user")
    ),
    request_body = PasswordUpdateRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Could not validate credentials"),
        (status = 404, description = "No such user"),
        (status = 500, description = "Internal server error")
    ),
    tag = "users"
)]
pub async fn update_user(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    Path(email): Path<String>,
    payload: Option<Json<PasswordUpdateRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &pool, &auth_state).await?;

    let Some(Json(request)) = payload else {
        return Err(ApiError::BadRequest("Missing payload"));
    };
    if request.password.is_empty() {
        return Err(ApiError::BadRequest("Password must not be empty"));
    }

    let email = normalize_email(&email);
    let password_hash = hash_password_blocking(request.password).await?;

    if !storage::update_password(&pool, &email, &password_hash).await? {
        return Err(ApiError::NotFound("user"));
    }

    debug!("Password updated for {email} by {}", principal.email());
    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Password updated")),
    ))
}

#[utoipa::path(
    delete,
    path = "/users/{email}",
    params(
        ("email" = String, Path, description = "Email address of the user")
    ),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 401, description = "Could not validate credentials"),
        (status = 404, description = "No such user"),
        (status = 500, description = "Internal server error")
    ),
    tag = "users"
)]
pub async fn delete_user(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &pool, &auth_state).await?;

    let email = normalize_email(&email);
    if !storage::delete_user(&pool, &email).await? {
        return Err(ApiError::NotFound("user"));
    }

    info!("User deleted: {email} by {}", principal.email());
    Ok((StatusCode::OK, Json(MessageResponse::new("User deleted"))))
}
