//! JSON envelope and error mapping shared by every API handler.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use fest_auth::AuthError;
use fest_content::ContentError;
use fest_monitor::MonitorError;

/// Response wrapper for consistent API format.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

pub fn error_response(msg: &str, status: StatusCode) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
        .into_response()
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Content(e) => match e {
                ContentError::Missing(_)
                | ContentError::EntryNotFound { .. }
                | ContentError::RegistrationNotFound(_) => StatusCode::NOT_FOUND,
                ContentError::OutOfRange { .. } | ContentError::NothingToExport => {
                    StatusCode::BAD_REQUEST
                }
                ContentError::InvalidRegistration(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ContentError::State(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Auth(e) => match e {
                AuthError::UserNotFound | AuthError::WrongPassword | AuthError::InvalidSession => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::NotAdmin => StatusCode::FORBIDDEN,
                AuthError::InvalidEmail | AuthError::WeakPassword | AuthError::InvalidResetToken => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
                AuthError::EmailInUse | AuthError::SetupClosed => StatusCode::CONFLICT,
                AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Monitor(MonitorError::NotConfigured(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Monitor(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            let detail = match &self {
                ApiError::Auth(e) => e.detail(),
                other => other.to_string(),
            };
            error!(status = status.as_u16(), error = %detail, "request failed");
        }
        error_response(&self.to_string(), status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fest_state::ContentId;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (ApiError::from(ContentError::Missing(ContentId::HomePage)), StatusCode::NOT_FOUND),
            (ApiError::from(ContentError::NothingToExport), StatusCode::BAD_REQUEST),
            (ApiError::from(AuthError::NotAdmin), StatusCode::FORBIDDEN),
            (ApiError::from(AuthError::WrongPassword), StatusCode::UNAUTHORIZED),
            (ApiError::from(AuthError::TooManyAttempts), StatusCode::TOO_MANY_REQUESTS),
            (ApiError::from(AuthError::Internal("db".into())), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err}");
        }
    }

    #[test]
    fn auth_internals_stay_out_of_the_message() {
        let err = ApiError::from(AuthError::Internal("redb exploded".into()));
        assert!(!err.to_string().contains("redb"));
    }
}
