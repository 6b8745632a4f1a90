//! fest-site — server-rendered public festival site.
//!
//! Provides axum route handlers that render the landing page (with the
//! registration form), lineup, schedule and tickets pages from the
//! content layer.
//!
//! # Routes
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /` | Landing page and registration form |
//! | `POST /register` | Registration form submit |
//! | `GET /lineup` | Artists grouped by billing |
//! | `GET /schedule` | Day schedule |
//! | `GET /tickets` | Ticket tiers |

pub mod actions;
pub mod pages;
pub mod views;

use axum::Router;
use axum::routing::{get, post};
use fest_content::{ContentService, RegistrationDesk};

/// Shared state for site handlers.
#[derive(Clone)]
pub struct SiteState {
    pub content: ContentService,
    pub registrations: RegistrationDesk,
}

/// Build the public site router.
pub fn site_router(state: SiteState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/register", post(actions::register))
        .route("/lineup", get(pages::lineup))
        .route("/schedule", get(pages::schedule))
        .route("/tickets", get(pages::tickets))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use fest_state::StateStore;
    use tower::ServiceExt;

    fn state(store: &StateStore) -> SiteState {
        SiteState {
            content: ContentService::new(Arc::new(store.clone()), Duration::from_secs(300)),
            registrations: RegistrationDesk::new(store.clone()),
        }
    }

    async fn body_text(resp: axum::response::Response) -> String {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn register_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/register")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn pages_render_fallback_content_on_empty_store() {
        let store = StateStore::open_in_memory().unwrap();
        let router = site_router(state(&store));

        for path in ["/", "/lineup", "/schedule", "/tickets"] {
            let req = Request::builder().uri(path).body(Body::empty()).unwrap();
            let resp = router.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "{path}");
            let html = body_text(resp).await;
            assert!(!html.contains("Template error"), "{path}: {html}");
        }
    }

    #[tokio::test]
    async fn lineup_shows_initialized_artists() {
        let store = StateStore::open_in_memory().unwrap();
        let state = state(&store);
        state.content.initialize_default_content().await.unwrap();
        let lineup = state.content.get_or_fallback::<fest_state::LineupPage>().await;
        let router = site_router(state);

        let req = Request::builder().uri("/lineup").body(Body::empty()).unwrap();
        let html = body_text(router.oneshot(req).await.unwrap()).await;
        for artist in &lineup.artists {
            assert!(html.contains(&artist.time), "missing {}", artist.name);
        }
    }

    #[tokio::test]
    async fn register_accepts_then_flags_duplicate() {
        let store = StateStore::open_in_memory().unwrap();
        let router = site_router(state(&store));
        let form = "name=Ann&email=ann%40example.com&phone=";

        let resp = router.clone().oneshot(register_request(form)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(store.count_registrations().unwrap(), 1);

        let resp = router.oneshot(register_request(form)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("already registered"));
        assert_eq!(store.count_registrations().unwrap(), 1);
    }

    #[tokio::test]
    async fn register_rejects_bad_email() {
        let store = StateStore::open_in_memory().unwrap();
        let router = site_router(state(&store));

        let resp = router
            .oneshot(register_request("name=Ann&email=not-an-email&phone="))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(store.count_registrations().unwrap(), 0);
    }
}
