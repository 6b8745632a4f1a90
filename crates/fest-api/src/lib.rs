//! fest-api — REST API for the festival site.
//!
//! Provides axum route handlers for content, registrations, admin
//! sessions and the monitoring cron. Mounts the public site at `/`.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/v1/content/{id}` | Cached content read |
//! | GET | `/api/v1/content/{id}/watch` | Long-poll for a newer version |
//! | POST | `/api/v1/registrations` | Public registration |
//! | POST | `/api/v1/auth/login` | Sign in |
//! | POST | `/api/v1/auth/logout` | Sign out (session) |
//! | POST | `/api/v1/auth/reset-password` | Start a password reset |
//! | POST | `/api/v1/auth/complete-reset` | Finish a password reset |
//! | POST | `/api/v1/auth/setup` | Create the first admin |
//! | * | `/api/v1/admin/...` | Admin routes (session) |
//! | GET | `/api/cron/check-registrations` | Monitoring check (cron secret) |

pub mod content;
pub mod lists;
pub mod monitoring;
pub mod registrations;
pub mod response;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};

use fest_auth::{AuthService, LocalAuthProvider};
use fest_content::{ContentService, RegistrationDesk};
use fest_core::FestConfig;
use fest_monitor::RegistrationMonitor;
use fest_site::SiteState;
use fest_state::{Artist, NavigationItem, ScheduleEvent, StateStore, TicketTier};

/// Longest a watch request is held open.
pub const DEFAULT_WATCH_TIMEOUT: Duration = Duration::from_secs(25);

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub content: ContentService,
    pub registrations: RegistrationDesk,
    pub auth: AuthService,
    pub monitor: Arc<RegistrationMonitor>,
    pub export_prefix: String,
    pub watch_timeout: Duration,
}

impl ApiState {
    /// Wire every service over one store with the local auth provider.
    pub fn new(store: StateStore, config: &FestConfig) -> Self {
        let content = ContentService::new(Arc::new(store.clone()), config.content.cache_ttl());
        let provider = Arc::new(LocalAuthProvider::new(store.clone()));
        let monitor = RegistrationMonitor::new(
            store.clone(),
            config.monitoring.clone(),
            config.site.name.clone(),
        );
        Self {
            auth: AuthService::new(provider, store.clone(), content.clone()),
            registrations: RegistrationDesk::new(store),
            content,
            monitor: Arc::new(monitor),
            export_prefix: config.site.export_prefix.clone(),
            watch_timeout: DEFAULT_WATCH_TIMEOUT,
        }
    }

    pub fn with_monitor(mut self, monitor: RegistrationMonitor) -> Self {
        self.monitor = Arc::new(monitor);
        self
    }

    pub fn with_watch_timeout(mut self, timeout: Duration) -> Self {
        self.watch_timeout = timeout;
        self
    }
}

fn admin_routes(state: &ApiState) -> Router<ApiState> {
    let router = Router::new()
        .route("/me", get(session::me))
        .route("/content/initialize", post(content::initialize_content))
        .route(
            "/content/{id}",
            get(content::admin_get_content).put(content::update_content),
        )
        .route("/content/{id}/history", get(content::content_history))
        .route(
            "/registrations",
            get(registrations::list).post(registrations::add),
        )
        .route("/registrations/export", get(registrations::export))
        .route(
            "/registrations/{id}",
            put(registrations::edit).delete(registrations::delete),
        )
        .route("/monitoring/status", get(monitoring::status));

    let router = lists::mount_list::<Artist>(router);
    let router = lists::mount_list::<ScheduleEvent>(router);
    let router = lists::mount_list::<TicketTier>(router);
    let router = lists::mount_list::<NavigationItem>(router);

    router.layer(from_fn_with_state(state.clone(), session::require_admin))
}

/// Build the complete router (REST API + cron + public site).
pub fn build_router(state: ApiState) -> Router {
    let site_state = SiteState {
        content: state.content.clone(),
        registrations: state.registrations.clone(),
    };

    let logout = post(session::logout)
        .layer(from_fn_with_state(state.clone(), session::require_admin));

    let api_routes = Router::new()
        .route("/content/{id}", get(content::get_content))
        .route("/content/{id}/watch", get(content::watch_content))
        .route("/registrations", post(registrations::submit))
        .route("/auth/login", post(session::login))
        .route("/auth/logout", logout)
        .route("/auth/reset-password", post(session::reset_password))
        .route("/auth/complete-reset", post(session::complete_reset))
        .route("/auth/setup", post(session::setup))
        .nest("/admin", admin_routes(&state))
        .with_state(state.clone());

    Router::new()
        .nest("/api/v1", api_routes)
        .route(
            "/api/cron/check-registrations",
            get(monitoring::check_registrations).with_state(state),
        )
        .merge(fest_site::site_router(site_state))
}
