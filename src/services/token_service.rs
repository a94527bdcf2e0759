use std::sync::Arc;

use jiff::Timestamp;

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use crate::models::{RefreshSession, User};
use crate::utils::jwt::{self, Claims};

/// Issues and checks access tokens and mints refresh sessions from the
/// configured lifetimes.
#[derive(Clone)]
pub struct TokenService {
    config: Arc<JwtConfig>,
}

impl TokenService {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Signs an access token carrying the user's identity and role names.
    pub fn generate_token(&self, user: &User, roles: Vec<String>) -> AppResult<String> {
        jwt::generate_access_token(user.id, user.username.clone(), roles, &self.config)
    }

    /// A fresh opaque refresh token valid for the configured number of hours.
    pub fn new_refresh_session(&self) -> AppResult<RefreshSession> {
        let lifetime = jwt::lifetime_from_secs(self.config.refresh_token_expiration_hours, 3600)?;
        let expires_at = Timestamp::now()
            .checked_add(lifetime)
            .map_err(|e| AppError::Internal {
                source: anyhow::anyhow!("refresh token expiry overflow: {}", e),
            })?;

        Ok(RefreshSession {
            token: jwt::generate_refresh_token(),
            expires_at,
        })
    }

    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        jwt::validate_access_token(token, &self.config)
    }

    /// Claims of a correctly signed token, ignoring its expiry.
    pub fn principal_from_expired_token(&self, token: &str) -> AppResult<Claims> {
        jwt::principal_from_expired_token(token, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;

    fn service() -> TokenService {
        TokenService::new(JwtConfig {
            secret: "token-service-test-secret-0123456789abcdef".to_string(),
            issuer: "libris-rs".to_string(),
            audience: "libris-clients".to_string(),
            access_token_expiration_minutes: 30,
            refresh_token_expiration_hours: 168,
        })
    }

    fn user() -> User {
        User {
            id: 7,
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            full_name: "Alice".to_string(),
            password_hash: String::new(),
            refresh_token: None,
            refresh_token_expiry_time: None,
            created_at: Timestamp::now(),
        }
    }

    #[test]
    fn test_generated_token_round_trips() {
        let service = service();
        let token = service
            .generate_token(&user(), vec!["Admin".to_string(), "User".to_string()])
            .unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.name, "alice");
        assert_eq!(claims.role, vec!["Admin", "User"]);
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_refresh_session_lasts_seven_days() {
        let before = Timestamp::now();
        let session = service().new_refresh_session().unwrap();
        let lifetime = session.expires_at.duration_since(before);

        assert!(lifetime >= SignedDuration::from_hours(168));
        assert!(lifetime < SignedDuration::from_hours(168) + SignedDuration::from_secs(5));
        assert!(!session.token.is_empty());
    }

    #[test]
    fn test_oversized_refresh_lifetime_is_an_error() {
        let service = TokenService::new(JwtConfig {
            refresh_token_expiration_hours: i64::MAX / 1000,
            ..service().config().clone()
        });
        assert!(matches!(
            service.new_refresh_session(),
            Err(AppError::Internal { .. })
        ));

        let service = TokenService::new(JwtConfig {
            refresh_token_expiration_hours: 24 * 365 * 20_000,
            ..service.config().clone()
        });
        assert!(matches!(
            service.new_refresh_session(),
            Err(AppError::Internal { .. })
        ));
    }

    #[test]
    fn test_sessions_are_unique() {
        let service = service();
        let a = service.new_refresh_session().unwrap();
        let b = service.new_refresh_session().unwrap();
        assert_ne!(a.token, b.token);
    }
}
