//! JWT authentication middleware.
//!
//! Validates the bearer token and exposes the caller as [`AuthUser`].

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::jwt::Claims;

/// Authenticated caller, added to request extensions by [`auth_middleware`].
///
/// Extract it in handlers with `Extension<AuthUser>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub roles: Vec<String>,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

impl TryFrom<Claims> for AuthUser {
    type Error = AppError;

    fn try_from(claims: Claims) -> AppResult<Self> {
        Ok(Self {
            user_id: claims.user_id()?,
            username: claims.name,
            roles: claims.role,
        })
    }
}

/// Rejects the request with 401 unless it carries `Authorization: Bearer
/// <token>` with a valid, unexpired access token.
///
/// # Example
/// ```ignore
/// OpenApiRouter::new()
///     .routes(routes!(logout))
///     .route_layer(middleware::from_fn_with_state(state, auth_middleware))
/// ```
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::unauthorized("Invalid authorization header format. Expected: Bearer <token>")
    })?;

    let claims = state.services.tokens().validate_token(token.trim())?;
    let auth_user = AuthUser::try_from(claims)?;
    tracing::debug!(user_id = auth_user.user_id, "Request authenticated");
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            name: "alice".to_string(),
            jti: "jti".to_string(),
            role: vec!["User".to_string()],
            iss: "libris-rs".to_string(),
            aud: "libris-clients".to_string(),
            iat: 0,
            exp: 0,
        }
    }

    #[test]
    fn test_auth_user_from_claims() {
        let user = AuthUser::try_from(claims("7")).unwrap();
        assert_eq!(user.user_id, 7);
        assert_eq!(user.username, "alice");
        assert!(user.has_role("User"));
        assert!(!user.has_role("Admin"));
    }

    #[test]
    fn test_non_numeric_subject_is_rejected() {
        assert!(matches!(
            AuthUser::try_from(claims("alice")),
            Err(AppError::Unauthorized { .. })
        ));
    }
}
