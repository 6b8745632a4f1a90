//! Monitoring endpoints.
//!
//! The cron endpoint is meant for an external scheduler that cannot hold
//! an admin session; it authenticates with the shared cron secret.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use tracing::{error, warn};

use fest_core::epoch_secs;
use fest_monitor::{CronAccess, MonitorReport};

use crate::ApiState;
use crate::response::{ApiResponse, ApiResult, error_response};
use crate::session::bearer_token;

#[derive(Debug, Default, Deserialize)]
pub struct CronQuery {
    pub secret: Option<String>,
}

/// GET /api/cron/check-registrations
///
/// Answers with the bare report rather than the API envelope so cron
/// services can log it as-is.
pub async fn check_registrations(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(query): Query<CronQuery>,
) -> Response {
    match state
        .monitor
        .cron_access(bearer_token(&headers), query.secret.as_deref())
    {
        CronAccess::Granted => {}
        CronAccess::NotConfigured => {
            return Json(MonitorReport::not_configured("cron secret")).into_response();
        }
        CronAccess::Denied => {
            warn!("cron check rejected: bad secret");
            return error_response("Unauthorized", StatusCode::UNAUTHORIZED);
        }
    }

    match state.monitor.check(epoch_secs()).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            error!(error = %e, "registration check failed");
            error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/v1/admin/monitoring/status
pub async fn status(State(state): State<ApiState>) -> ApiResult<impl IntoResponse> {
    Ok(ApiResponse::ok(state.monitor.dry_run(epoch_secs())?))
}
