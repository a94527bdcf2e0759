use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};

/// Number of random bytes behind an opaque refresh token.
const REFRESH_TOKEN_BYTES: usize = 32;

/// JWT Claims structure containing user identity and token metadata
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Username
    pub name: String,
    /// Unique token id
    pub jti: String,
    /// Role names, one entry per role
    pub role: Vec<String>,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration time (unix seconds)
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user
    ///
    /// # Arguments
    /// * `user_id` - The user's ID
    /// * `username` - The user's username
    /// * `roles` - Role names granted to the user
    /// * `config` - Issuer and audience source
    /// * `lifetime` - Token validity duration
    ///
    /// # Errors
    /// `AppError::Internal` when the expiry falls outside the timestamp range.
    pub fn new(
        user_id: i32,
        username: String,
        roles: Vec<String>,
        config: &JwtConfig,
        lifetime: SignedDuration,
    ) -> AppResult<Self> {
        let now = Timestamp::now();
        let exp = now.checked_add(lifetime).map_err(|e| AppError::Internal {
            source: anyhow::anyhow!("access token expiry overflow: {}", e),
        })?;

        Ok(Self {
            sub: user_id.to_string(),
            name: username,
            jti: Uuid::new_v4().to_string(),
            role: roles,
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
            iat: now.as_second(),
            exp: exp.as_second(),
        })
    }

    /// Parses the subject back into a user id.
    pub fn user_id(&self) -> AppResult<i32> {
        self.sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid token subject"))
    }
}

/// Signs an HS256 access token for a user.
///
/// # Returns
/// The encoded JWT token string
///
/// # Example
/// ```ignore
/// let token = generate_access_token(1, "alice".to_string(), vec!["User".to_string()], &config)?;
/// ```
pub fn generate_access_token(
    user_id: i32,
    username: String,
    roles: Vec<String>,
    config: &JwtConfig,
) -> AppResult<String> {
    let lifetime = lifetime_from_secs(config.access_token_expiration_minutes, 60)?;
    let claims = Claims::new(user_id, username, roles, config, lifetime)?;
    sign(&claims, &config.secret)
}

/// `count` units of `unit_secs` seconds, or `AppError::Internal` when the
/// product does not fit.
pub fn lifetime_from_secs(count: i64, unit_secs: i64) -> AppResult<SignedDuration> {
    count
        .checked_mul(unit_secs)
        .map(SignedDuration::from_secs)
        .ok_or_else(|| AppError::Internal {
            source: anyhow::anyhow!("token lifetime of {} x {}s overflows", count, unit_secs),
        })
}

fn sign(claims: &Claims, secret: &str) -> AppResult<String> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Failed to generate JWT token: {}", e),
    })
}

fn validation(config: &JwtConfig, check_lifetime: bool) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[config.issuer.as_str()]);
    validation.set_audience(&[config.audience.as_str()]);
    validation.leeway = 0;
    validation.validate_exp = check_lifetime;
    validation
}

fn decode_claims(token: &str, config: &JwtConfig, check_lifetime: bool) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation(config, check_lifetime),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::unauthorized("Token has expired"),
        ErrorKind::InvalidSignature => AppError::unauthorized("Invalid token signature"),
        ErrorKind::InvalidIssuer => AppError::unauthorized("Invalid token issuer"),
        ErrorKind::InvalidAudience => AppError::unauthorized("Invalid token audience"),
        _ => AppError::unauthorized("Invalid token"),
    })
}

/// Validates signature, algorithm, issuer, audience and lifetime.
///
/// # Example
/// ```ignore
/// let claims = validate_access_token(&token, &config)?;
/// println!("User ID: {}", claims.sub);
/// ```
pub fn validate_access_token(token: &str, config: &JwtConfig) -> AppResult<Claims> {
    decode_claims(token, config, true)
}

/// Like [`validate_access_token`] but accepts tokens past their expiry.
/// Used to bind a refresh request to the identity of its old access token.
pub fn principal_from_expired_token(token: &str, config: &JwtConfig) -> AppResult<Claims> {
    decode_claims(token, config, false)
}

/// Generates an opaque refresh token: 32 random bytes, standard base64.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::rng().fill(&mut bytes);
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test_secret_key_for_jwt_testing_0123456789".to_string(),
            issuer: "libris-test".to_string(),
            audience: "libris-clients".to_string(),
            access_token_expiration_minutes: 30,
            refresh_token_expiration_hours: 168,
        }
    }

    fn expired_token(config: &JwtConfig) -> String {
        let claims = Claims::new(
            7,
            "alice".to_string(),
            vec!["User".to_string()],
            config,
            SignedDuration::from_mins(-5),
        )
        .unwrap();
        sign(&claims, &config.secret).unwrap()
    }

    #[test]
    fn test_access_token_roundtrip_carries_identity() {
        let config = test_config();
        let token = generate_access_token(
            7,
            "alice".to_string(),
            vec!["Admin".to_string(), "User".to_string()],
            &config,
        )
        .unwrap();

        let claims = validate_access_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.name, "alice");
        assert_eq!(claims.role, vec!["Admin", "User"]);
        assert_eq!(claims.iss, "libris-test");
        assert_eq!(claims.aud, "libris-clients");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
        assert!(Uuid::parse_str(&claims.jti).is_ok());
    }

    #[test]
    fn test_each_token_gets_a_fresh_jti() {
        let config = test_config();
        let a = generate_access_token(1, "a".to_string(), vec![], &config).unwrap();
        let b = generate_access_token(1, "a".to_string(), vec![], &config).unwrap();
        let a = validate_access_token(&a, &config).unwrap();
        let b = validate_access_token(&b, &config).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_expired_token_rejected_but_principal_readable() {
        let config = test_config();
        let token = expired_token(&config);

        match validate_access_token(&token, &config) {
            Err(AppError::Unauthorized { message }) => assert!(message.contains("expired")),
            other => panic!("Expected Unauthorized error, got {:?}", other),
        }

        let claims = principal_from_expired_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "7");
    }

    #[test]
    fn test_wrong_secret_issuer_or_audience_rejected() {
        let config = test_config();
        let token = generate_access_token(1, "a".to_string(), vec![], &config).unwrap();

        let other_secret = JwtConfig {
            secret: "another_secret_key_for_jwt_testing_987654".to_string(),
            ..test_config()
        };
        assert!(matches!(
            validate_access_token(&token, &other_secret),
            Err(AppError::Unauthorized { message }) if message.contains("signature")
        ));

        let other_issuer = JwtConfig {
            issuer: "someone-else".to_string(),
            ..test_config()
        };
        assert!(validate_access_token(&token, &other_issuer).is_err());
        assert!(principal_from_expired_token(&token, &other_issuer).is_err());

        let other_audience = JwtConfig {
            audience: "someone-else".to_string(),
            ..test_config()
        };
        assert!(validate_access_token(&token, &other_audience).is_err());
    }

    #[test]
    fn test_oversized_lifetime_is_an_error() {
        let config = JwtConfig {
            access_token_expiration_minutes: i64::MAX / 1000,
            ..test_config()
        };
        assert!(matches!(
            generate_access_token(1, "a".to_string(), vec![], &config),
            Err(AppError::Internal { .. })
        ));

        let result = Claims::new(
            1,
            "a".to_string(),
            vec![],
            &test_config(),
            SignedDuration::from_hours(24 * 365 * 20_000),
        );
        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let result = validate_access_token("invalid.token.format", &test_config());
        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }

    #[test]
    fn test_refresh_tokens_are_random_base64() {
        let a = generate_refresh_token();
        let b = generate_refresh_token();
        assert_ne!(a, b);
        assert_eq!(STANDARD.decode(&a).unwrap().len(), REFRESH_TOKEN_BYTES);
    }
}
