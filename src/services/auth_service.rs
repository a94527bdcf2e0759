//! Registration, login and the refresh-token lifecycle.

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User};
use crate::repositories::{Store, UserFilter};
use crate::services::TokenService;
use crate::utils::password::{hash_password_blocking, verify_password_blocking};

pub const DEFAULT_ROLE: &str = "User";

pub const INVALID_ROLE: &str = "Invalid role selected.";

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub const INVALID_REFRESH_TOKEN: &str = "Invalid or expired refresh token";

pub const UNKNOWN_USER: &str = "User not found";

/// Access token plus the opaque refresh token that can renew it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    /// Falls back to [`DEFAULT_ROLE`].
    pub role: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Creates the account, assigns its role and opens its first refresh
    /// session in one transaction.
    ///
    /// # Errors
    ///
    /// `AppError::BadRequest` for an unknown role or a taken username/email.
    pub async fn register(&self, registration: Registration) -> AppResult<TokenPair> {
        let role = registration
            .role
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(DEFAULT_ROLE)
            .to_string();
        tracing::info!(username = %registration.username, role = %role, "Registering user");

        let users = self.store.users();
        if !users.role_exists(&role).await? {
            tracing::warn!(role = %role, "Registration with unknown role");
            return Err(AppError::bad_request(INVALID_ROLE));
        }
        self.ensure_available(&registration.username, &registration.email)
            .await?;

        let password_hash = hash_password_blocking(registration.password).await?;
        let session = self.tokens.new_refresh_session()?;
        let refresh_token = session.token.clone();

        let new_user = NewUser {
            username: registration.username,
            email: registration.email,
            full_name: registration.full_name,
            password_hash,
            refresh_token: None,
            refresh_token_expiry_time: None,
        };

        let user = users
            .register(new_user, &role, session)
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration.
                AppError::Duplicate { field, value, .. } => {
                    AppError::bad_request(format!("{} '{}' is already taken.", field, value))
                }
                other => other,
            })
            .inspect_err(|e| tracing::error!(error = %e, "Registration failed"))?;

        let token = self.tokens.generate_token(&user, vec![role])?;
        tracing::info!(user_id = user.id, "User registered");

        Ok(TokenPair {
            token,
            refresh_token,
        })
    }

    /// Exchanges credentials for a new token pair, replacing any earlier
    /// refresh session.
    pub async fn login(&self, email: &str, password: String) -> AppResult<TokenPair> {
        tracing::info!("Login attempt");
        let users = self.store.users();

        let Some(user) = users
            .find(&UserFilter::by_email(email))
            .await?
            .into_iter()
            .next()
        else {
            tracing::warn!("Login with unknown email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password_blocking(password, user.password_hash.clone()).await? {
            tracing::warn!(user_id = user.id, "Login with wrong password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let session = self.tokens.new_refresh_session()?;
        users.set_refresh_session(user.id, &session).await?;

        let pair = self.issue(&user, session.token).await?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok(pair)
    }

    /// Rotates a refresh token.
    ///
    /// When `access_token` is given it must be correctly signed for this
    /// issuer and audience (its expiry is ignored) and belong to the same user.
    /// Every failure yields the same 401 message.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        access_token: Option<&str>,
    ) -> AppResult<TokenPair> {
        let users = self.store.users();
        let invalid = || AppError::unauthorized(INVALID_REFRESH_TOKEN);

        let user = users
            .find(&UserFilter::by_refresh_token(refresh_token))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                tracing::warn!("Refresh with unknown token");
                invalid()
            })?;

        let now = jiff::Timestamp::now();
        if user.refresh_token_expiry_time.is_none_or(|expiry| expiry <= now) {
            tracing::warn!(user_id = user.id, "Refresh with expired token");
            return Err(invalid());
        }

        if let Some(access_token) = access_token.filter(|t| !t.is_empty()) {
            let bound_to_user = self
                .tokens
                .principal_from_expired_token(access_token)
                .and_then(|claims| claims.user_id())
                .is_ok_and(|id| id == user.id);
            if !bound_to_user {
                tracing::warn!(user_id = user.id, "Refresh with mismatched access token");
                return Err(invalid());
            }
        }

        let next = self.tokens.new_refresh_session()?;
        if !users
            .rotate_refresh_token(user.id, refresh_token, &next)
            .await?
        {
            tracing::warn!(user_id = user.id, "Refresh token already rotated");
            return Err(invalid());
        }

        let pair = self.issue(&user, next.token).await?;
        tracing::info!(user_id = user.id, "Tokens refreshed");
        Ok(pair)
    }

    /// Drops the stored refresh token. Issued access tokens stay valid until
    /// they expire.
    ///
    /// # Errors
    ///
    /// `AppError::Unauthorized` when the token's user no longer exists.
    pub async fn logout(&self, user_id: i32) -> AppResult<()> {
        tracing::info!(user_id, "Logging out");
        match self.store.users().clear_refresh_token(user_id).await {
            Err(AppError::NotFound { .. }) => {
                tracing::warn!(user_id, "Logout for unknown user");
                Err(AppError::unauthorized(UNKNOWN_USER))
            }
            other => other,
        }
    }

    async fn issue(&self, user: &User, refresh_token: String) -> AppResult<TokenPair> {
        let roles = self.store.users().roles_for_user(user.id).await?;
        Ok(TokenPair {
            token: self.tokens.generate_token(user, roles)?,
            refresh_token,
        })
    }

    async fn ensure_available(&self, username: &str, email: &str) -> AppResult<()> {
        let users = self.store.users();
        if !users.find(&UserFilter::by_username(username)).await?.is_empty() {
            return Err(AppError::bad_request(format!(
                "Username '{}' is already taken.",
                username
            )));
        }
        if !users.find(&UserFilter::by_email(email)).await?.is_empty() {
            return Err(AppError::bad_request(format!(
                "Email '{}' is already taken.",
                email
            )));
        }
        Ok(())
    }
}
