//! Registration form handler.

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use tracing::error;

use fest_content::{ContentError, RegistrationForm, SubmitOutcome};

use crate::SiteState;
use crate::pages::{FormState, Notice, render_home};

pub const ALREADY_REGISTERED: &str =
    "You're already registered! We'll notify you when tickets go on sale.";
pub const SUBMIT_FAILED: &str =
    "There was an error submitting your registration. Please try again.";

/// `POST /register`: run the submission through the duplicate gate and
/// re-render the landing page with the outcome.
pub async fn register(
    State(state): State<SiteState>,
    Form(form): Form<RegistrationForm>,
) -> impl IntoResponse {
    let (status, form_state) = match state.registrations.submit(form.clone()) {
        Ok(SubmitOutcome::Registered { .. }) => (
            StatusCode::OK,
            FormState {
                submitted: true,
                ..Default::default()
            },
        ),
        Ok(SubmitOutcome::Duplicate { .. }) => (
            StatusCode::OK,
            FormState {
                notice: Some(Notice::info(ALREADY_REGISTERED)),
                ..Default::default()
            },
        ),
        Err(ContentError::InvalidRegistration(reason)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            FormState {
                notice: Some(Notice::error(reason)),
                form,
                ..Default::default()
            },
        ),
        Err(e) => {
            error!(error = %e, "registration submit failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                FormState {
                    notice: Some(Notice::error(SUBMIT_FAILED)),
                    form,
                    ..Default::default()
                },
            )
        }
    };
    let page: Html<String> = render_home(&state, form_state).await;
    (status, page)
}
