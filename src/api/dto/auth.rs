//! Authentication-related Data Transfer Objects

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::services::{Registration, TokenPair};
use crate::utils::validate::validate_password_strength;

/// Register request payload
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Username (unique)
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    #[schema(example = "alice", min_length = 3, max_length = 50)]
    pub user_name: String,
    /// User's email address (unique)
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "alice@example.com", format = "email")]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "Full name is required and can't be longer than 100 characters"))]
    #[schema(example = "Alice Liddell", max_length = 100)]
    pub full_name: String,
    /// Plain text, hashed before it is stored
    #[validate(custom(function = "validate_password_strength"))]
    #[schema(example = "Secret#123", format = "password", min_length = 8)]
    pub password: String,
    /// Defaults to `User`
    #[schema(example = "User")]
    pub role: Option<String>,
}

impl From<RegisterRequest> for Registration {
    fn from(request: RegisterRequest) -> Self {
        Self {
            username: request.user_name,
            email: request.email,
            full_name: request.full_name,
            password: request.password,
            role: request.role.filter(|r| !r.trim().is_empty()),
        }
    }
}

/// Login request payload
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    #[schema(example = "alice@example.com", format = "email")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "Secret#123", format = "password")]
    pub password: String,
}

/// Refresh request payload. The expired access token is optional; when sent
/// it must belong to the owner of the refresh token.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token cannot be empty"))]
    #[schema(example = "q8Jx0kQy3yF7o0r6bW0a1m8b1pX0Yl3cS2d9bH2cQ1k=")]
    pub refresh_token: String,
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub access_token: Option<String>,
}

/// Access token plus refresh token, returned by register, login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub token: String,
    #[schema(example = "q8Jx0kQy3yF7o0r6bW0a1m8b1pX0Yl3cS2d9bH2cQ1k=")]
    pub refresh_token: String,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            token: pair.token,
            refresh_token: pair.refresh_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_uses_camel_case_keys() {
        let request: RegisterRequest = serde_json::from_str(
            r#"{"userName":"alice","email":"alice@x.com","fullName":"Alice","password":"Secret#123"}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());

        let registration = Registration::from(request);
        assert_eq!(registration.username, "alice");
        assert_eq!(registration.full_name, "Alice");
        assert_eq!(registration.role, None);
    }

    #[test]
    fn test_register_rejects_weak_password_and_bad_email() {
        let request = RegisterRequest {
            user_name: "al".to_string(),
            email: "not-an-email".to_string(),
            full_name: "Alice".to_string(),
            password: "password".to_string(),
            role: None,
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("user_name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("full_name"));
    }

    #[test]
    fn test_token_response_shape() {
        let body = serde_json::to_value(TokenResponse {
            token: "a".to_string(),
            refresh_token: "b".to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"token": "a", "refreshToken": "b"}));
    }
}
