//! Domain types for the festival document store.
//!
//! Six singleton content documents drive the public site. Each one is
//! stored under a fixed [`ContentId`] and carries an `updated_at` stamp.
//! Documents own ordered lists of sub-entities (artists, schedule events,
//! ticket tiers, navigation items) whose `order` values are always the
//! dense sequence `1..=N`.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── Identifiers ────────────────────────────────────────────────────

/// Fixed id of a singleton content document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentId {
    SiteMetadata,
    HomePage,
    LineupPage,
    SchedulePage,
    TicketsPage,
    Navigation,
}

impl ContentId {
    pub const ALL: [ContentId; 6] = [
        ContentId::SiteMetadata,
        ContentId::HomePage,
        ContentId::LineupPage,
        ContentId::SchedulePage,
        ContentId::TicketsPage,
        ContentId::Navigation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentId::SiteMetadata => "site_metadata",
            ContentId::HomePage => "home_page",
            ContentId::LineupPage => "lineup_page",
            ContentId::SchedulePage => "schedule_page",
            ContentId::TicketsPage => "tickets_page",
            ContentId::Navigation => "navigation",
        }
    }

    /// Short type tag recorded in version records.
    pub fn content_type(&self) -> ContentType {
        match self {
            ContentId::SiteMetadata => ContentType::Metadata,
            ContentId::HomePage => ContentType::Home,
            ContentId::LineupPage => ContentType::Lineup,
            ContentId::SchedulePage => ContentType::Schedule,
            ContentId::TicketsPage => ContentType::Tickets,
            ContentId::Navigation => ContentType::Navigation,
        }
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("unknown content id: {s}"))
    }
}

/// Content type tag stored alongside each version record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Metadata,
    Home,
    Lineup,
    Schedule,
    Tickets,
    Navigation,
}

// ── Ordered sub-entities ───────────────────────────────────────────

/// A list entry with a client-generated id and a 1-based position.
pub trait Ordered {
    fn entry_id(&self) -> &str;
    fn set_entry_id(&mut self, id: String);
    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);
}

/// Renumber `order` to match the current slice position (1-based).
pub fn repack<T: Ordered>(items: &mut [T]) {
    for (i, item) in items.iter_mut().enumerate() {
        item.set_order(i as u32 + 1);
    }
}

/// Sort by incoming `order` (unset orders last, ties keep their position),
/// give fresh ids to entries whose id is missing or already used by an
/// earlier entry, then repack.
pub fn normalize<T: Ordered>(items: &mut Vec<T>) {
    items.sort_by_key(|item| match item.order() {
        0 => u32::MAX,
        o => o,
    });
    let mut seen = HashSet::new();
    for item in items.iter_mut() {
        if item.entry_id().is_empty() || seen.contains(item.entry_id()) {
            item.set_entry_id(fest_core::time_id());
        }
        seen.insert(item.entry_id().to_string());
    }
    repack(items);
}

macro_rules! impl_ordered {
    ($($ty:ty),+) => {
        $(impl Ordered for $ty {
            fn entry_id(&self) -> &str {
                &self.id
            }
            fn set_entry_id(&mut self, id: String) {
                self.id = id;
            }
            fn order(&self) -> u32 {
                self.order
            }
            fn set_order(&mut self, order: u32) {
                self.order = order;
            }
        })+
    };
}

impl_ordered!(Artist, ScheduleEvent, TicketTier, NavigationItem);

/// Billing tier of a lineup artist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtistCategory {
    Headliner,
    Featured,
    #[default]
    Opener,
}

impl ArtistCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtistCategory::Headliner => "headliner",
            ArtistCategory::Featured => "featured",
            ArtistCategory::Opener => "opener",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Artist {
    pub id: String,
    pub name: String,
    /// Set time as displayed ("7:30 PM").
    pub time: String,
    pub category: ArtistCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleEvent {
    pub id: String,
    pub time: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketTier {
    pub id: String,
    pub name: String,
    /// Price in whole dollars.
    pub price: u32,
    pub features: Vec<String>,
    pub popular: bool,
    pub sold_out: bool,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationItem {
    pub id: String,
    pub label: String,
    pub href: String,
    pub order: u32,
    pub active: bool,
}

// ── Nested value objects ───────────────────────────────────────────

/// Per-field strings for the name/email/phone registration form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormFields {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuccessMessage {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventDetails {
    pub date: String,
    pub time: String,
    pub venue: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InfoSection {
    pub title: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventInfo {
    pub date: String,
    pub venue: String,
}

// ── Content documents ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteMetadata {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    pub updated_at: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HomePage {
    pub headline: String,
    pub subheadline: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_title: Option<String>,
    pub form_labels: FormFields,
    pub form_placeholders: FormFields,
    pub submit_button: String,
    pub success_message: SuccessMessage,
    pub trust_builders: Vec<String>,
    pub event_details: EventDetails,
    pub updated_at: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LineupPage {
    pub title: String,
    pub subtitle: String,
    pub artists: Vec<Artist>,
    pub footer_text: String,
    pub updated_at: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulePage {
    pub title: String,
    pub date: String,
    pub events: Vec<ScheduleEvent>,
    pub notes: Vec<String>,
    pub updated_at: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketsPage {
    pub title: String,
    pub subtitle: String,
    pub tickets_enabled: bool,
    pub tiers: Vec<TicketTier>,
    pub info_section: InfoSection,
    pub contact_email: String,
    pub updated_at: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Navigation {
    pub title: String,
    pub items: Vec<NavigationItem>,
    pub cta_button: Link,
    pub event_info: EventInfo,
    pub updated_at: u64,
}

/// Any one of the six content documents, tagged with its fixed id.
///
/// Serializes as the document's fields plus `"id": "<content id>"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "id", rename_all = "snake_case")]
pub enum ContentDocument {
    SiteMetadata(SiteMetadata),
    HomePage(HomePage),
    LineupPage(LineupPage),
    SchedulePage(SchedulePage),
    TicketsPage(TicketsPage),
    Navigation(Navigation),
}

impl ContentDocument {
    pub fn id(&self) -> ContentId {
        match self {
            ContentDocument::SiteMetadata(_) => ContentId::SiteMetadata,
            ContentDocument::HomePage(_) => ContentId::HomePage,
            ContentDocument::LineupPage(_) => ContentId::LineupPage,
            ContentDocument::SchedulePage(_) => ContentId::SchedulePage,
            ContentDocument::TicketsPage(_) => ContentId::TicketsPage,
            ContentDocument::Navigation(_) => ContentId::Navigation,
        }
    }

    pub fn updated_at(&self) -> u64 {
        match self {
            ContentDocument::SiteMetadata(d) => d.updated_at,
            ContentDocument::HomePage(d) => d.updated_at,
            ContentDocument::LineupPage(d) => d.updated_at,
            ContentDocument::SchedulePage(d) => d.updated_at,
            ContentDocument::TicketsPage(d) => d.updated_at,
            ContentDocument::Navigation(d) => d.updated_at,
        }
    }

    pub fn set_updated_at(&mut self, ts: u64) {
        match self {
            ContentDocument::SiteMetadata(d) => d.updated_at = ts,
            ContentDocument::HomePage(d) => d.updated_at = ts,
            ContentDocument::LineupPage(d) => d.updated_at = ts,
            ContentDocument::SchedulePage(d) => d.updated_at = ts,
            ContentDocument::TicketsPage(d) => d.updated_at = ts,
            ContentDocument::Navigation(d) => d.updated_at = ts,
        }
    }
}
