//! Request and response payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::storage::Credential;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "hunter2")]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "hunter2")]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PasswordUpdateRequest {
    #[schema(example = "correct horse battery staple")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public view of a stored user, the password hash stays server-side.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Credential> for UserResponse {
    fn from(credential: Credential) -> Self {
        Self {
            email: credential.email,
            created_at: credential.created_at,
            updated_at: credential.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn login_request_deserializes() {
        let request: LoginRequest =
            serde_json::from_str(r#"{"email":"alice@example.com","password":"hunter2"}"#).unwrap();
        assert_eq!(request.email, "alice@example.com");
        assert_eq!(request.password, "hunter2");
    }

    #[test]
    fn login_request_rejects_missing_fields() {
        let result: Result<LoginRequest, _> =
            serde_json::from_str(r#"{"email":"alice@example.com"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn message_response_serializes() {
        let json = serde_json::to_value(MessageResponse::new("Login successful")).unwrap();
        assert_eq!(json, serde_json::json!({"message": "Login successful"}));
    }

    #[test]
    fn user_response_omits_password_hash() {
        let now = Utc::now();
        let credential = Credential {
            email: "alice@example.com".to_string(),
            password_hash: "$2b$12$abc".to_string(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(UserResponse::from(credential)).unwrap();
        assert_eq!(json["email"], "alice@example.com");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
    }
}
