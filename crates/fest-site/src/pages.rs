//! Public page handlers.
//!
//! Every page reads through the content cache and falls back to the
//! static documents when a read comes back empty, so the site renders
//! even before content has been initialized.

use askama::Template;
use axum::extract::State;
use axum::response::Html;

use fest_content::RegistrationForm;
use fest_state::{HomePage, LineupPage, Navigation, SchedulePage, SiteMetadata, TicketsPage};

use crate::SiteState;
use crate::views::*;

pub(crate) fn render<T: Template>(tmpl: T) -> Html<String> {
    Html(tmpl.render().unwrap_or_else(|e| {
        format!("<pre>Template error: {e}</pre>")
    }))
}

async fn chrome(state: &SiteState, path: &str, section: Option<&str>) -> Chrome {
    let (meta, nav) = tokio::join!(
        state.content.get_or_fallback::<SiteMetadata>(),
        state.content.get_or_fallback::<Navigation>(),
    );
    Chrome::new(&meta, &nav, path, section)
}

// ── Home ────────────────────────────────────────────────────────

/// A message shown above the registration form.
pub struct Notice {
    pub kind: &'static str,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: "info",
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: "error",
            text: text.into(),
        }
    }
}

/// What the registration form shows on this render.
#[derive(Default)]
pub struct FormState {
    pub submitted: bool,
    pub notice: Option<Notice>,
    /// Values to put back in the inputs.
    pub form: RegistrationForm,
}

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    chrome: Chrome,
    home: HomePage,
    submitted: bool,
    notice: Option<Notice>,
    form: RegistrationForm,
}

pub(crate) async fn render_home(state: &SiteState, form: FormState) -> Html<String> {
    let (chrome, home) = tokio::join!(
        chrome(state, "/", None),
        state.content.get_or_fallback::<HomePage>(),
    );
    render(HomeTemplate {
        chrome,
        home,
        submitted: form.submitted,
        notice: form.notice,
        form: form.form,
    })
}

pub async fn home(State(state): State<SiteState>) -> Html<String> {
    render_home(&state, FormState::default()).await
}

// ── Lineup ──────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "lineup.html")]
struct LineupTemplate {
    chrome: Chrome,
    page: LineupPage,
    groups: LineupGroups,
}

pub async fn lineup(State(state): State<SiteState>) -> Html<String> {
    let (chrome, page) = tokio::join!(
        chrome(&state, "/lineup", Some("Lineup")),
        state.content.get_or_fallback::<LineupPage>(),
    );
    let groups = LineupGroups::new(&page.artists);
    render(LineupTemplate {
        chrome,
        page,
        groups,
    })
}

// ── Schedule ────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "schedule.html")]
struct ScheduleTemplate {
    chrome: Chrome,
    page: SchedulePage,
    events: Vec<EventView>,
}

pub async fn schedule(State(state): State<SiteState>) -> Html<String> {
    let (chrome, page) = tokio::join!(
        chrome(&state, "/schedule", Some("Schedule")),
        state.content.get_or_fallback::<SchedulePage>(),
    );
    let events = event_views(&page.events);
    render(ScheduleTemplate {
        chrome,
        page,
        events,
    })
}

// ── Tickets ─────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "tickets.html")]
struct TicketsTemplate {
    chrome: Chrome,
    page: TicketsPage,
    tiers: Vec<TierView>,
}

pub async fn tickets(State(state): State<SiteState>) -> Html<String> {
    let (chrome, page) = tokio::join!(
        chrome(&state, "/tickets", Some("Tickets")),
        state.content.get_or_fallback::<TicketsPage>(),
    );
    let tiers = tier_views(&page);
    render(TicketsTemplate {
        chrome,
        page,
        tiers,
    })
}
