//! Admin sign-in endpoints and the session guard for `/admin` routes.

use axum::Json;
use axum::extract::{Extension, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::info;

use fest_auth::AuthError;
use fest_state::AdminUser;

use crate::ApiState;
use crate::response::{ApiError, ApiResponse, ApiResult};

/// The signed-in admin, attached to requests by [`require_admin`].
#[derive(Debug, Clone)]
pub struct CurrentAdmin {
    pub admin: AdminUser,
    pub token: String,
}

/// Token after `Bearer ` in the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Reject requests without a live session for an allow-listed admin.
pub async fn require_admin(State(state): State<ApiState>, mut req: Request, next: Next) -> Response {
    let Some(token) = bearer_token(req.headers()).map(str::to_string) else {
        return ApiError::from(AuthError::InvalidSession).into_response();
    };
    match state.auth.authenticate(&token).await {
        Ok(admin) => {
            req.extensions_mut().insert(CurrentAdmin { admin, token });
            next.run(req).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<ApiState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let signed_in = state.auth.sign_in(&req.email, &req.password).await?;
    Ok(ApiResponse::ok(signed_in))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<ApiState>,
    Extension(current): Extension<CurrentAdmin>,
) -> impl IntoResponse {
    state.auth.sign_out(&current.token).await;
    ApiResponse::ok("signed out")
}

/// GET /api/v1/admin/me
pub async fn me(Extension(current): Extension<CurrentAdmin>) -> impl IntoResponse {
    ApiResponse::ok(current.admin)
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

/// POST /api/v1/auth/reset-password
///
/// The token is never returned to the caller; it goes to the log, which
/// stands in for the reset email.
pub async fn reset_password(
    State(state): State<ApiState>,
    Json(req): Json<ResetRequest>,
) -> ApiResult<impl IntoResponse> {
    let ticket = state.auth.reset_password(&req.email)?;
    info!(
        email = %ticket.email,
        token = %ticket.token,
        expires_at = ticket.expires_at,
        "password reset requested"
    );
    Ok(ApiResponse::ok("Password reset email sent."))
}

#[derive(Debug, Deserialize)]
pub struct CompleteResetRequest {
    pub token: String,
    pub password: String,
}

/// POST /api/v1/auth/complete-reset
pub async fn complete_reset(
    State(state): State<ApiState>,
    Json(req): Json<CompleteResetRequest>,
) -> ApiResult<impl IntoResponse> {
    state.auth.complete_reset(&req.token, &req.password)?;
    Ok(ApiResponse::ok("Password updated."))
}

fn default_seed() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct SetupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default = "default_seed")]
    pub seed_content: bool,
}

/// POST /api/v1/auth/setup
pub async fn setup(
    State(state): State<ApiState>,
    Json(req): Json<SetupRequest>,
) -> ApiResult<impl IntoResponse> {
    let admin = state
        .auth
        .setup(&req.email, &req.password, &req.name, req.seed_content)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(admin)))
}
