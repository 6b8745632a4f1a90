//! View types for the public page templates.
//!
//! Templates only read fields; sorting, grouping and display
//! formatting happen here.

use fest_state::{
    Artist, ArtistCategory, Link, Navigation, Ordered, ScheduleEvent, SiteMetadata, TicketTier,
    TicketsPage,
};

/// Icon shown for schedule events that do not set one.
pub const DEFAULT_EVENT_ICON: &str = "🎵";

fn by_order<T: Ordered + Clone>(items: &[T]) -> Vec<T> {
    let mut sorted = items.to_vec();
    sorted.sort_by_key(|item| item.order());
    sorted
}

// ── Page chrome ─────────────────────────────────────────────────

/// Header, menu and `<head>` values shared by every page.
pub struct Chrome {
    pub page_title: String,
    pub description: String,
    pub keywords: String,
    pub site_title: String,
    pub links: Vec<NavLink>,
    pub cta: Link,
    pub event_date: String,
    pub event_venue: String,
}

pub struct NavLink {
    pub label: String,
    pub href: String,
    pub current: bool,
}

impl Chrome {
    /// `section` prefixes the document title on inner pages.
    pub fn new(meta: &SiteMetadata, nav: &Navigation, path: &str, section: Option<&str>) -> Self {
        let links = by_order(&nav.items)
            .into_iter()
            .filter(|item| item.active)
            .map(|item| NavLink {
                current: item.href == path,
                label: item.label,
                href: item.href,
            })
            .collect();
        Self {
            page_title: match section {
                Some(section) => format!("{section} | {}", meta.title),
                None => meta.title.clone(),
            },
            description: meta.description.clone(),
            keywords: meta.keywords.join(", "),
            site_title: nav.title.clone(),
            links,
            cta: nav.cta_button.clone(),
            event_date: nav.event_info.date.clone(),
            event_venue: nav.event_info.venue.clone(),
        }
    }
}

// ── Lineup ──────────────────────────────────────────────────────

pub struct ArtistView {
    pub name: String,
    pub time: String,
    pub description: String,
    pub image: String,
}

impl From<Artist> for ArtistView {
    fn from(a: Artist) -> Self {
        Self {
            name: a.name,
            time: a.time,
            description: a.description.unwrap_or_default(),
            image: a.image.unwrap_or_default(),
        }
    }
}

/// Artists split by billing, each group in running order.
pub struct LineupGroups {
    pub headliners: Vec<ArtistView>,
    pub featured: Vec<ArtistView>,
    pub openers: Vec<ArtistView>,
}

impl LineupGroups {
    pub fn new(artists: &[Artist]) -> Self {
        let mut groups = Self {
            headliners: Vec::new(),
            featured: Vec::new(),
            openers: Vec::new(),
        };
        for artist in by_order(artists) {
            let bucket = match artist.category {
                ArtistCategory::Headliner => &mut groups.headliners,
                ArtistCategory::Featured => &mut groups.featured,
                ArtistCategory::Opener => &mut groups.openers,
            };
            bucket.push(artist.into());
        }
        groups
    }
}

// ── Schedule ────────────────────────────────────────────────────

pub struct EventView {
    pub time: String,
    pub title: String,
    pub description: String,
    pub icon: String,
}

pub fn event_views(events: &[ScheduleEvent]) -> Vec<EventView> {
    by_order(events)
        .into_iter()
        .map(|e| EventView {
            icon: e
                .icon
                .filter(|i| !i.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT_ICON.to_string()),
            time: e.time,
            title: e.title,
            description: e.description,
        })
        .collect()
}

// ── Tickets ─────────────────────────────────────────────────────

pub struct TierView {
    pub name: String,
    pub price_display: String,
    pub features: Vec<String>,
    pub popular: bool,
    pub sold_out: bool,
    pub button_label: &'static str,
}

impl TierView {
    fn new(tier: TicketTier, sales_open: bool) -> Self {
        let button_label = if tier.sold_out {
            "Sold Out"
        } else if sales_open {
            "Buy Tickets"
        } else {
            "Coming Soon"
        };
        Self {
            name: tier.name,
            price_display: format!("${}", tier.price),
            features: tier.features,
            popular: tier.popular,
            sold_out: tier.sold_out,
            button_label,
        }
    }
}

pub fn tier_views(page: &TicketsPage) -> Vec<TierView> {
    by_order(&page.tiers)
        .into_iter()
        .map(|tier| TierView::new(tier, page.tickets_enabled))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fest_state::NavigationItem;

    fn artist(name: &str, category: ArtistCategory, order: u32) -> Artist {
        Artist {
            id: name.to_lowercase(),
            name: name.into(),
            category,
            order,
            ..Default::default()
        }
    }

    #[test]
    fn lineup_groups_by_category_in_order() {
        let artists = vec![
            artist("Late Opener", ArtistCategory::Opener, 3),
            artist("Headliner", ArtistCategory::Headliner, 2),
            artist("Early Opener", ArtistCategory::Opener, 1),
        ];
        let groups = LineupGroups::new(&artists);
        assert_eq!(groups.headliners.len(), 1);
        assert!(groups.featured.is_empty());
        let openers: Vec<_> = groups.openers.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(openers, ["Early Opener", "Late Opener"]);
    }

    #[test]
    fn chrome_hides_inactive_links_and_marks_current() {
        let nav = Navigation {
            title: "Yacht Rock".into(),
            items: vec![
                NavigationItem {
                    id: "2".into(),
                    label: "Schedule".into(),
                    href: "/schedule".into(),
                    order: 2,
                    active: true,
                },
                NavigationItem {
                    id: "1".into(),
                    label: "Lineup".into(),
                    href: "/lineup".into(),
                    order: 1,
                    active: true,
                },
                NavigationItem {
                    id: "3".into(),
                    label: "Hidden".into(),
                    href: "/hidden".into(),
                    order: 3,
                    active: false,
                },
            ],
            ..Default::default()
        };
        let meta = SiteMetadata {
            title: "Fest".into(),
            keywords: vec!["a".into(), "b".into()],
            ..Default::default()
        };

        let chrome = Chrome::new(&meta, &nav, "/schedule", Some("Schedule"));
        let labels: Vec<_> = chrome.links.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, ["Lineup", "Schedule"]);
        assert!(chrome.links[1].current);
        assert_eq!(chrome.page_title, "Schedule | Fest");
        assert_eq!(chrome.keywords, "a, b");
    }

    #[test]
    fn tier_button_reflects_sales_state() {
        let page = TicketsPage {
            tickets_enabled: false,
            tiers: vec![
                TicketTier {
                    name: "VIP".into(),
                    price: 150,
                    order: 1,
                    ..Default::default()
                },
                TicketTier {
                    name: "Captain".into(),
                    price: 250,
                    sold_out: true,
                    order: 2,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let tiers = tier_views(&page);
        assert_eq!(tiers[0].price_display, "$150");
        assert_eq!(tiers[0].button_label, "Coming Soon");
        assert_eq!(tiers[1].button_label, "Sold Out");
    }

    #[test]
    fn events_fall_back_to_default_icon() {
        let events = vec![ScheduleEvent {
            title: "Doors".into(),
            icon: Some(String::new()),
            ..Default::default()
        }];
        assert_eq!(event_views(&events)[0].icon, DEFAULT_EVENT_ICON);
    }
}
