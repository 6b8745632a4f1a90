//! Ordered-list endpoints, generic over the four list kinds.
//!
//! Each list gets the same five routes under its own prefix:
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | POST | `…` | [`add_entry`] |
//! | PUT | `…/{entry_id}` | [`update_entry`] |
//! | DELETE | `…/{entry_id}` | [`remove_entry`] |
//! | POST | `…/{entry_id}/move` | [`move_entry`] |
//! | POST | `…/reorder` | [`reorder_entries`] |

use axum::Json;
use axum::Router;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{post, put};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;

use fest_content::{ContentKind, Direction, ListEntry};

use crate::ApiState;
use crate::response::{ApiResponse, ApiResult};
use crate::session::CurrentAdmin;

/// Bounds an entry type needs to travel over the API.
pub trait ApiEntry: ListEntry + Serialize + DeserializeOwned {}

impl<E: ListEntry + Serialize + DeserializeOwned> ApiEntry for E {}

/// Route prefix of a list under `/api/v1/admin`, e.g. `/lineup/artists`.
pub fn list_path<E: ListEntry>() -> String {
    let page = <E::Page as ContentKind>::ID.as_str();
    format!("/{}/{}", page.trim_end_matches("_page"), E::LIST)
}

/// Add the five list routes for `E` to `router`.
pub fn mount_list<E>(router: Router<ApiState>) -> Router<ApiState>
where
    E: ApiEntry,
    <E as ListEntry>::Page: Serialize,
{
    let base = list_path::<E>();
    router
        .route(&base, post(add_entry::<E>))
        .route(&format!("{base}/reorder"), post(reorder_entries::<E>))
        .route(
            &format!("{base}/{{entry_id}}"),
            put(update_entry::<E>).delete(remove_entry::<E>),
        )
        .route(&format!("{base}/{{entry_id}}/move"), post(move_entry::<E>))
}

pub async fn add_entry<E: ApiEntry>(
    State(state): State<ApiState>,
    Extension(current): Extension<CurrentAdmin>,
    Json(entry): Json<E>,
) -> ApiResult<impl IntoResponse> {
    let added = state.content.add_entry(entry, &current.admin.id).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(added)))
}

pub async fn update_entry<E: ApiEntry>(
    State(state): State<ApiState>,
    Path(entry_id): Path<String>,
    Extension(current): Extension<CurrentAdmin>,
    Json(entry): Json<E>,
) -> ApiResult<impl IntoResponse> {
    let updated = state
        .content
        .update_entry(&entry_id, entry, &current.admin.id)
        .await?;
    Ok(ApiResponse::ok(updated))
}

pub async fn remove_entry<E>(
    State(state): State<ApiState>,
    Path(entry_id): Path<String>,
    Extension(current): Extension<CurrentAdmin>,
) -> ApiResult<impl IntoResponse>
where
    E: ApiEntry,
    <E as ListEntry>::Page: Serialize,
{
    let page = state
        .content
        .remove_entry::<E>(&entry_id, &current.admin.id)
        .await?;
    Ok(ApiResponse::ok(page))
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub direction: Direction,
}

pub async fn move_entry<E>(
    State(state): State<ApiState>,
    Path(entry_id): Path<String>,
    Extension(current): Extension<CurrentAdmin>,
    Json(req): Json<MoveRequest>,
) -> ApiResult<impl IntoResponse>
where
    E: ApiEntry,
    <E as ListEntry>::Page: Serialize,
{
    let page = state
        .content
        .move_entry::<E>(&entry_id, req.direction, &current.admin.id)
        .await?;
    Ok(ApiResponse::ok(page))
}

/// 0-based positions, as reported by a drag-and-drop list.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub from: usize,
    pub to: usize,
}

pub async fn reorder_entries<E>(
    State(state): State<ApiState>,
    Extension(current): Extension<CurrentAdmin>,
    Json(req): Json<ReorderRequest>,
) -> ApiResult<impl IntoResponse>
where
    E: ApiEntry,
    <E as ListEntry>::Page: Serialize,
{
    let page = state
        .content
        .reorder_entries::<E>(req.from, req.to, &current.admin.id)
        .await?;
    Ok(ApiResponse::ok(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fest_state::{Artist, NavigationItem, ScheduleEvent, TicketTier};

    #[test]
    fn list_paths_match_route_table() {
        assert_eq!(list_path::<Artist>(), "/lineup/artists");
        assert_eq!(list_path::<ScheduleEvent>(), "/schedule/events");
        assert_eq!(list_path::<TicketTier>(), "/tickets/tiers");
        assert_eq!(list_path::<NavigationItem>(), "/navigation/items");
    }
}
