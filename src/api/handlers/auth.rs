//! Authentication handlers: registration, login and the refresh-token
//! lifecycle.

use axum::{Extension, Json, extract::State, middleware};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::AUTH_TAG;
use crate::api::dto::{
    ErrorResponse, LoginRequest, MessageResponse, RefreshRequest, RegisterRequest, TokenResponse,
};
use crate::api::middleware::{AuthUser, auth_middleware};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates the authentication routes
///
/// # Routes
/// - `POST /register` - Create an account and get tokens
/// - `POST /login` - Authenticate and get tokens
/// - `POST /refresh` - Exchange a refresh token for a new pair
/// - `POST /logout` - Revoke the refresh token (requires a bearer token)
pub fn auth_routes(state: AppState) -> OpenApiRouter<AppState> {
    let protected = OpenApiRouter::new()
        .routes(routes!(logout))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    OpenApiRouter::new()
        .routes(routes!(register))
        .routes(routes!(login))
        .routes(routes!(refresh))
        .merge(protected)
}

/// POST /api/auth/register - Register new user
#[utoipa::path(
    post,
    path = "/register",
    tag = AUTH_TAG,
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = TokenResponse),
        (status = 400, description = "Invalid data, unknown role or taken username/email", body = ErrorResponse)
    )
)]
async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Json<TokenResponse>> {
    let pair = state.services.auth.register(payload.into()).await?;
    Ok(Json(pair.into()))
}

/// POST /api/auth/login - Authenticate user
///
/// Unknown email and wrong password produce the same 401.
#[utoipa::path(
    post,
    path = "/login",
    tag = AUTH_TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let pair = state
        .services
        .auth
        .login(&payload.email, payload.password)
        .await?;
    Ok(Json(pair.into()))
}

/// POST /api/auth/refresh - Rotate the refresh token
///
/// Each refresh token can be exchanged once.
#[utoipa::path(
    post,
    path = "/refresh",
    tag = AUTH_TAG,
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Tokens refreshed", body = TokenResponse),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorResponse)
    )
)]
async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    let pair = state
        .services
        .auth
        .refresh(&payload.refresh_token, payload.access_token.as_deref())
        .await?;
    Ok(Json(pair.into()))
}

/// POST /api/auth/logout - Revoke the caller's refresh token
#[utoipa::path(
    post,
    path = "/logout",
    tag = AUTH_TAG,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse)
    )
)]
async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<MessageResponse>> {
    state.services.auth.logout(user.user_id).await?;
    Ok(Json(MessageResponse::new("Logged out successfully")))
}
