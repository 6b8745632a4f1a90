//! Content document endpoints: public reads and long-poll watch, admin
//! reads, partial updates, history and default seeding.

use std::time::Duration;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::debug;

use fest_content::{BindingState, ContentError, ContentKind, ContentService, LiveBinding};
use fest_state::{
    ContentDocument, ContentId, ContentPatch, HomePage, LineupPage, Navigation, SchedulePage,
    SiteMetadata, TicketsPage,
};

use crate::ApiState;
use crate::response::{ApiError, ApiResponse, ApiResult};
use crate::session::CurrentAdmin;

fn parse_id(raw: &str) -> ApiResult<ContentId> {
    raw.parse().map_err(ApiError::NotFound)
}

/// GET /api/v1/content/{id}
pub async fn get_content(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let doc = state
        .content
        .get_document(id)
        .await
        .ok_or(ContentError::Missing(id))?;
    Ok(ApiResponse::ok(doc))
}

#[derive(Debug, Default, Deserialize)]
pub struct WatchQuery {
    /// Last `updated_at` the caller has seen.
    #[serde(default)]
    pub since: u64,
    /// Seconds to hold the request; capped by the server setting.
    pub timeout: Option<u64>,
}

/// GET /api/v1/content/{id}/watch?since=
///
/// Answers with the document once its `updated_at` is newer than
/// `since`, or `204 No Content` when the wait times out.
pub async fn watch_content(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(query): Query<WatchQuery>,
) -> ApiResult<Response> {
    let id = parse_id(&id)?;
    let timeout = query
        .timeout
        .map(Duration::from_secs)
        .map_or(state.watch_timeout, |t| t.min(state.watch_timeout));
    let content = state.content.clone();
    let since = query.since;

    let newer = match id {
        ContentId::SiteMetadata => wait_newer::<SiteMetadata>(content, since, timeout).await,
        ContentId::HomePage => wait_newer::<HomePage>(content, since, timeout).await,
        ContentId::LineupPage => wait_newer::<LineupPage>(content, since, timeout).await,
        ContentId::SchedulePage => wait_newer::<SchedulePage>(content, since, timeout).await,
        ContentId::TicketsPage => wait_newer::<TicketsPage>(content, since, timeout).await,
        ContentId::Navigation => wait_newer::<Navigation>(content, since, timeout).await,
    };
    Ok(match newer {
        Some(doc) => ApiResponse::ok(doc).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

async fn wait_newer<T: ContentKind>(
    content: ContentService,
    since: u64,
    timeout: Duration,
) -> Option<ContentDocument> {
    let mut binding = LiveBinding::<T>::mount(content);
    let settled = tokio::time::timeout(
        timeout,
        binding.wait_for(|s| match s {
            BindingState::Ready(Some(doc)) => doc.updated_at() > since,
            BindingState::Error(_) => true,
            _ => false,
        }),
    )
    .await;
    match settled {
        Ok(Some(BindingState::Ready(Some(doc)))) => Some(doc.into_document()),
        Ok(Some(BindingState::Error(e))) => {
            debug!(id = %T::ID, error = %e, "watch ended by binding error");
            None
        }
        _ => None,
    }
}

/// GET /api/v1/admin/content/{id}
///
/// Unlike the public read, store failures surface as errors here.
pub async fn admin_get_content(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let doc = state
        .content
        .try_get_document(id)
        .await?
        .ok_or(ContentError::Missing(id))?;
    Ok(ApiResponse::ok(doc))
}

/// PUT /api/v1/admin/content/{id}
pub async fn update_content(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Extension(current): Extension<CurrentAdmin>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let patch = ContentPatch::from_json(id, body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let doc = state.content.apply_patch(&patch, &current.admin.id).await?;
    Ok(ApiResponse::ok(doc))
}

/// GET /api/v1/admin/content/{id}/history
pub async fn content_history(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::ok(state.content.history(id)?))
}

/// POST /api/v1/admin/content/initialize
pub async fn initialize_content(State(state): State<ApiState>) -> ApiResult<impl IntoResponse> {
    state.content.initialize_default_content().await?;
    Ok(ApiResponse::ok("default content initialized"))
}
