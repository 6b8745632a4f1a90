//! Typed partial updates for content documents.
//!
//! A patch names only the fields it changes. Nested value objects are
//! replaced whole; ordered lists are replaced whole and re-packed so
//! their `order` values stay dense.

use serde::{Deserialize, Serialize};

use crate::error::{StateError, StateResult};
use crate::types::*;

macro_rules! patch_struct {
    ($(#[$meta:meta])* $name:ident { $($field:ident: $ty:ty),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
        #[serde(deny_unknown_fields)]
        pub struct $name {
            $(
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )+
        }
    };
}

patch_struct!(
    /// Partial update for [`SiteMetadata`].
    SiteMetadataPatch {
        title: String,
        description: String,
        keywords: Vec<String>,
        og_image: String,
    }
);

patch_struct!(
    /// Partial update for [`HomePage`].
    HomePagePatch {
        headline: String,
        subheadline: String,
        description: String,
        form_title: String,
        form_labels: FormFields,
        form_placeholders: FormFields,
        submit_button: String,
        success_message: SuccessMessage,
        trust_builders: Vec<String>,
        event_details: EventDetails,
    }
);

patch_struct!(
    /// Partial update for [`LineupPage`].
    LineupPagePatch {
        title: String,
        subtitle: String,
        artists: Vec<Artist>,
        footer_text: String,
    }
);

patch_struct!(
    /// Partial update for [`SchedulePage`].
    SchedulePagePatch {
        title: String,
        date: String,
        events: Vec<ScheduleEvent>,
        notes: Vec<String>,
    }
);

patch_struct!(
    /// Partial update for [`TicketsPage`].
    TicketsPagePatch {
        title: String,
        subtitle: String,
        tickets_enabled: bool,
        tiers: Vec<TicketTier>,
        info_section: InfoSection,
        contact_email: String,
    }
);

patch_struct!(
    /// Partial update for [`Navigation`].
    NavigationPatch {
        title: String,
        items: Vec<NavigationItem>,
        cta_button: Link,
        event_info: EventInfo,
    }
);

/// A partial update addressed to one content document.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPatch {
    SiteMetadata(SiteMetadataPatch),
    HomePage(HomePagePatch),
    LineupPage(LineupPagePatch),
    SchedulePage(SchedulePagePatch),
    TicketsPage(TicketsPagePatch),
    Navigation(NavigationPatch),
}

impl ContentPatch {
    pub fn target(&self) -> ContentId {
        match self {
            ContentPatch::SiteMetadata(_) => ContentId::SiteMetadata,
            ContentPatch::HomePage(_) => ContentId::HomePage,
            ContentPatch::LineupPage(_) => ContentId::LineupPage,
            ContentPatch::SchedulePage(_) => ContentId::SchedulePage,
            ContentPatch::TicketsPage(_) => ContentId::TicketsPage,
            ContentPatch::Navigation(_) => ContentId::Navigation,
        }
    }

    /// Parse a JSON body as the patch type belonging to `id`.
    /// Unknown fields are rejected.
    pub fn from_json(id: ContentId, value: serde_json::Value) -> StateResult<Self> {
        let de = |e: serde_json::Error| StateError::Deserialize(format!("{id}: {e}"));
        Ok(match id {
            ContentId::SiteMetadata => {
                ContentPatch::SiteMetadata(serde_json::from_value(value).map_err(de)?)
            }
            ContentId::HomePage => ContentPatch::HomePage(serde_json::from_value(value).map_err(de)?),
            ContentId::LineupPage => {
                ContentPatch::LineupPage(serde_json::from_value(value).map_err(de)?)
            }
            ContentId::SchedulePage => {
                ContentPatch::SchedulePage(serde_json::from_value(value).map_err(de)?)
            }
            ContentId::TicketsPage => {
                ContentPatch::TicketsPage(serde_json::from_value(value).map_err(de)?)
            }
            ContentId::Navigation => {
                ContentPatch::Navigation(serde_json::from_value(value).map_err(de)?)
            }
        })
    }

    /// The patch as it is recorded in the version log.
    pub fn to_data(&self) -> StateResult<serde_json::Value> {
        let value = match self {
            ContentPatch::SiteMetadata(p) => serde_json::to_value(p),
            ContentPatch::HomePage(p) => serde_json::to_value(p),
            ContentPatch::LineupPage(p) => serde_json::to_value(p),
            ContentPatch::SchedulePage(p) => serde_json::to_value(p),
            ContentPatch::TicketsPage(p) => serde_json::to_value(p),
            ContentPatch::Navigation(p) => serde_json::to_value(p),
        };
        value.map_err(|e| StateError::Serialize(e.to_string()))
    }
}

fn set<T: Clone>(field: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *field = v.clone();
    }
}

fn set_opt<T: Clone>(field: &mut Option<T>, value: &Option<T>) {
    if let Some(v) = value {
        *field = Some(v.clone());
    }
}

fn set_list<T: Ordered + Clone>(field: &mut Vec<T>, value: &Option<Vec<T>>) {
    if let Some(v) = value {
        let mut items = v.clone();
        normalize(&mut items);
        *field = items;
    }
}

impl ContentDocument {
    /// Merge `patch` into this document. `updated_at` is left to the caller.
    pub fn apply(&mut self, patch: &ContentPatch) -> StateResult<()> {
        match (self, patch) {
            (ContentDocument::SiteMetadata(d), ContentPatch::SiteMetadata(p)) => {
                set(&mut d.title, &p.title);
                set(&mut d.description, &p.description);
                set(&mut d.keywords, &p.keywords);
                set_opt(&mut d.og_image, &p.og_image);
            }
            (ContentDocument::HomePage(d), ContentPatch::HomePage(p)) => {
                set(&mut d.headline, &p.headline);
                set(&mut d.subheadline, &p.subheadline);
                set(&mut d.description, &p.description);
                set_opt(&mut d.form_title, &p.form_title);
                set(&mut d.form_labels, &p.form_labels);
                set(&mut d.form_placeholders, &p.form_placeholders);
                set(&mut d.submit_button, &p.submit_button);
                set(&mut d.success_message, &p.success_message);
                set(&mut d.trust_builders, &p.trust_builders);
                set(&mut d.event_details, &p.event_details);
            }
            (ContentDocument::LineupPage(d), ContentPatch::LineupPage(p)) => {
                set(&mut d.title, &p.title);
                set(&mut d.subtitle, &p.subtitle);
                set_list(&mut d.artists, &p.artists);
                set(&mut d.footer_text, &p.footer_text);
            }
            (ContentDocument::SchedulePage(d), ContentPatch::SchedulePage(p)) => {
                set(&mut d.title, &p.title);
                set(&mut d.date, &p.date);
                set_list(&mut d.events, &p.events);
                set(&mut d.notes, &p.notes);
            }
            (ContentDocument::TicketsPage(d), ContentPatch::TicketsPage(p)) => {
                set(&mut d.title, &p.title);
                set(&mut d.subtitle, &p.subtitle);
                set(&mut d.tickets_enabled, &p.tickets_enabled);
                set_list(&mut d.tiers, &p.tiers);
                set(&mut d.info_section, &p.info_section);
                set(&mut d.contact_email, &p.contact_email);
            }
            (ContentDocument::Navigation(d), ContentPatch::Navigation(p)) => {
                set(&mut d.title, &p.title);
                set_list(&mut d.items, &p.items);
                set(&mut d.cta_button, &p.cta_button);
                set(&mut d.event_info, &p.event_info);
            }
            (doc, patch) => {
                return Err(StateError::PatchMismatch {
                    patch: patch.target().to_string(),
                    document: doc.id().to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_only_touches_named_fields() {
        let mut doc = ContentDocument::LineupPage(LineupPage {
            title: "2025 LINEUP".into(),
            subtitle: "Smooth sounds".into(),
            footer_text: "More TBA".into(),
            ..Default::default()
        });
        let patch = ContentPatch::from_json(ContentId::LineupPage, json!({"subtitle": "All day"}))
            .unwrap();
        doc.apply(&patch).unwrap();

        let ContentDocument::LineupPage(page) = doc else { unreachable!() };
        assert_eq!(page.title, "2025 LINEUP");
        assert_eq!(page.subtitle, "All day");
        assert_eq!(page.footer_text, "More TBA");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = ContentPatch::from_json(ContentId::HomePage, json!({"headlin": "typo"}));
        assert!(matches!(err, Err(StateError::Deserialize(_))));
    }

    #[test]
    fn list_patches_are_repacked() {
        let mut doc = ContentDocument::TicketsPage(TicketsPage::default());
        let patch = ContentPatch::from_json(
            ContentId::TicketsPage,
            json!({"tiers": [
                {"id": "vip", "name": "VIP", "price": 150, "order": 9},
                {"id": "ga", "name": "GA", "price": 75, "order": 3}
            ]}),
        )
        .unwrap();
        doc.apply(&patch).unwrap();

        let ContentDocument::TicketsPage(page) = doc else { unreachable!() };
        let summary: Vec<(&str, u32)> =
            page.tiers.iter().map(|t| (t.id.as_str(), t.order)).collect();
        assert_eq!(summary, vec![("ga", 1), ("vip", 2)]);
    }

    #[test]
    fn mismatched_patch_is_an_error() {
        let mut doc = ContentDocument::Navigation(Navigation::default());
        let patch = ContentPatch::SchedulePage(SchedulePagePatch::default());
        assert!(matches!(doc.apply(&patch), Err(StateError::PatchMismatch { .. })));
    }

    #[test]
    fn version_data_omits_untouched_fields() {
        let patch = ContentPatch::SiteMetadata(SiteMetadataPatch {
            title: Some("New title".into()),
            ..Default::default()
        });
        assert_eq!(patch.to_data().unwrap(), json!({"title": "New title"}));
    }
}
