//! Registration endpoints: public submit plus admin list, add, edit,
//! delete and CSV export.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde::Deserialize;

use fest_content::export::{export_file_name, registrations_csv};
use fest_content::{RegistrationForm, SubmitOutcome};

use crate::ApiState;
use crate::response::{ApiResponse, ApiResult};

fn outcome_status(outcome: &SubmitOutcome) -> StatusCode {
    match outcome {
        SubmitOutcome::Registered { .. } => StatusCode::CREATED,
        // A duplicate is an expected answer, not a failure.
        SubmitOutcome::Duplicate { .. } => StatusCode::OK,
    }
}

/// POST /api/v1/registrations
pub async fn submit(
    State(state): State<ApiState>,
    Json(form): Json<RegistrationForm>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.registrations.submit(form)?;
    Ok((outcome_status(&outcome), ApiResponse::ok(outcome)))
}

/// GET /api/v1/admin/registrations
pub async fn list(State(state): State<ApiState>) -> ApiResult<impl IntoResponse> {
    Ok(ApiResponse::ok(state.registrations.list()?))
}

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    #[serde(flatten)]
    pub form: RegistrationForm,
    /// Epoch seconds; defaults to now.
    pub timestamp: Option<u64>,
}

/// POST /api/v1/admin/registrations
pub async fn add(
    State(state): State<ApiState>,
    Json(req): Json<AddRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.registrations.add(req.form, req.timestamp)?;
    Ok((outcome_status(&outcome), ApiResponse::ok(outcome)))
}

/// PUT /api/v1/admin/registrations/{id}
pub async fn edit(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(form): Json<RegistrationForm>,
) -> ApiResult<impl IntoResponse> {
    Ok(ApiResponse::ok(state.registrations.edit(&id, form)?))
}

/// DELETE /api/v1/admin/registrations/{id}
pub async fn delete(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.registrations.delete(&id)?;
    Ok(ApiResponse::ok("deleted"))
}

/// GET /api/v1/admin/registrations/export
pub async fn export(State(state): State<ApiState>) -> ApiResult<impl IntoResponse> {
    let csv = registrations_csv(&state.registrations.list()?)?;
    let file_name = export_file_name(&state.export_prefix, chrono::Utc::now().date_naive());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv;charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        csv,
    ))
}
