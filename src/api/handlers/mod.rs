pub mod auth;
pub mod health;
pub mod users;

use axum::response::IntoResponse;

/// Unauthenticated root route, doubles as a liveness probe.
pub async fn root() -> impl IntoResponse {
    crate::APP_USER_AGENT
}
