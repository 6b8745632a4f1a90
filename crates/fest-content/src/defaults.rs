//! Built-in festival content.
//!
//! Two sets live here. The *default* documents are the full launch
//! content written by `initialize_default_content`. The *fallback*
//! documents are the trimmed static copy the public site renders when a
//! read comes back absent, so a page never renders blank.

use fest_state::*;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn artist(id: &str, name: &str, time: &str, category: ArtistCategory, order: u32) -> Artist {
    Artist {
        id: id.into(),
        name: name.into(),
        time: time.into(),
        category,
        image: None,
        description: None,
        order,
    }
}

fn event(id: &str, time: &str, title: &str, description: &str, icon: &str, order: u32) -> ScheduleEvent {
    ScheduleEvent {
        id: id.into(),
        time: time.into(),
        title: title.into(),
        description: description.into(),
        icon: Some(icon.into()),
        order,
    }
}

fn tier(id: &str, name: &str, price: u32, features: &[&str], popular: bool, order: u32) -> TicketTier {
    TicketTier {
        id: id.into(),
        name: name.into(),
        price,
        features: strings(features),
        popular,
        sold_out: false,
        order,
    }
}

fn nav_item(id: &str, label: &str, href: &str, order: u32) -> NavigationItem {
    NavigationItem {
        id: id.into(),
        label: label.into(),
        href: href.into(),
        order,
        active: true,
    }
}

// ── Default content ────────────────────────────────────────────────

/// Full launch content for `id`, stamped with `updated_at`.
pub fn default_document(id: ContentId, updated_at: u64) -> ContentDocument {
    match id {
        ContentId::SiteMetadata => ContentDocument::SiteMetadata(SiteMetadata {
            title: "San Diego Yacht Rock Festival 2025 | Liberty Station".into(),
            description: "San Diego's Premier Yacht Rock Festival - October 11, 2025 at Liberty \
                          Station. Featuring Yacht Rock Revue, Christopher Cross, and more smooth \
                          sailing sounds!"
                .into(),
            keywords: strings(&[
                "yacht rock",
                "festival",
                "san diego",
                "liberty station",
                "music festival",
                "2025",
                "christopher cross",
                "yacht rock revue",
                "smooth music",
            ]),
            og_image: None,
            updated_at,
        }),
        ContentId::HomePage => ContentDocument::HomePage(HomePage {
            headline: "Get Priority Access to San Diego Yacht Rock Festival Tickets".into(),
            subheadline: "Get On Board for San Diego's Smoothest Summer Festival".into(),
            description: "First access to tickets, lineup drops, and VIP upgrades, straight to \
                          your inbox."
                .into(),
            form_title: None,
            form_labels: FormFields {
                name: "Name".into(),
                email: "Email ✅".into(),
                phone: "Cell Number 📱".into(),
            },
            form_placeholders: FormFields {
                name: "Captain Smooth".into(),
                email: "smooth@sailing.com".into(),
                phone: "(619) 555-YACHT".into(),
            },
            submit_button: "🚢 Join the Captain's List".into(),
            success_message: SuccessMessage {
                title: "Welcome Aboard, Captain! ⛵".into(),
                description: "You're on the list! Check your inbox for exclusive updates.".into(),
            },
            trust_builders: strings(&[
                "✨ No spam. Just smooth sailing.",
                "🎯 You'll hear from us before the general public.",
            ]),
            event_details: EventDetails {
                date: "SAT OCT 11 • 2025".into(),
                time: "5PM - 10PM".into(),
                venue: "LIBERTY STATION : INGRAM PLAZA".into(),
                address: "2751 DEWEY RD SAN DIEGO CA 92106".into(),
            },
            updated_at,
        }),
        ContentId::LineupPage => ContentDocument::LineupPage(LineupPage {
            title: "2025 LINEUP".into(),
            subtitle: "Smooth sounds all day long".into(),
            artists: vec![
                artist("1", "Yacht Rock Revue", "9:00 PM", ArtistCategory::Headliner, 1),
                artist("2", "Christopher Cross", "7:30 PM", ArtistCategory::Headliner, 2),
                artist("3", "Player", "6:30 PM", ArtistCategory::Featured, 3),
                artist("4", "Ambrosia", "5:45 PM", ArtistCategory::Featured, 4),
                artist("5", "The Doobie Brothers Tribute", "5:00 PM", ArtistCategory::Opener, 5),
            ],
            footer_text: "More artists to be announced!".into(),
            updated_at,
        }),
        ContentId::SchedulePage => ContentDocument::SchedulePage(SchedulePage {
            title: "EVENT SCHEDULE".into(),
            date: "Saturday, October 11, 2025".into(),
            events: vec![
                event("1", "4:00 PM", "Gates Open", "Welcome aboard! Get your wristbands and explore the festival grounds", "🚪", 1),
                event("2", "4:30 PM", "Food & Drink Service Begins", "Tropical cocktails, craft beer, and delicious food from local vendors", "🍹", 2),
                event("3", "5:00 PM", "The Doobie Brothers Tribute", "Opening act takes the stage", "🎸", 3),
                event("4", "5:45 PM", "Ambrosia", "Smooth sounds continue", "🎵", 4),
                event("5", "6:30 PM", "Player", "Keep the party going", "🎤", 5),
                event("6", "7:30 PM", "Christopher Cross", "Sailing into the sunset", "⛵", 6),
                event("7", "9:00 PM", "Yacht Rock Revue", "Headliner performance", "🌟", 7),
                event("8", "10:00 PM", "Festival Ends", "Until next year, smooth sailors!", "🌙", 8),
            ],
            notes: strings(&[
                "Schedule subject to change",
                "Re-entry allowed with wristband",
                "VIP areas open all day",
                "Merch booth open until 9:30 PM",
            ]),
            updated_at,
        }),
        ContentId::TicketsPage => ContentDocument::TicketsPage(TicketsPage {
            title: "GET YOUR TICKETS".into(),
            subtitle: "Limited availability - Book now!".into(),
            tickets_enabled: false,
            tiers: vec![
                tier(
                    "1",
                    "General Admission",
                    75,
                    &[
                        "Festival entry",
                        "Access to all performances",
                        "Food & drink vendors",
                        "Festival merchandise",
                    ],
                    false,
                    1,
                ),
                tier(
                    "2",
                    "VIP Experience",
                    150,
                    &[
                        "Everything in General Admission",
                        "VIP viewing area",
                        "Premium bar access",
                        "VIP restrooms",
                        "Commemorative laminate",
                    ],
                    true,
                    2,
                ),
                tier(
                    "3",
                    "Captain's Table",
                    250,
                    &[
                        "Everything in VIP",
                        "Meet & greet opportunities",
                        "Complimentary drinks",
                        "Exclusive merch package",
                        "Premium parking",
                    ],
                    false,
                    3,
                ),
            ],
            info_section: InfoSection {
                title: "Ticket Information".into(),
                items: strings(&[
                    "All sales are final",
                    "Must be 21+ to purchase alcohol",
                    "Children 12 and under free with adult ticket",
                    "Group discounts available for 10+ tickets",
                ]),
            },
            contact_email: "tickets@sdyachtrockfest.com".into(),
            updated_at,
        }),
        ContentId::Navigation => ContentDocument::Navigation(Navigation {
            title: "YACHT ROCK FESTIVAL".into(),
            items: vec![
                nav_item("1", "Lineup", "/lineup", 1),
                nav_item("2", "Schedule", "/schedule", 2),
                nav_item("3", "Tickets", "/tickets", 3),
            ],
            cta_button: Link {
                label: "Buy Tickets".into(),
                href: "/tickets".into(),
            },
            event_info: EventInfo {
                date: "SAT OCT 11, 2025 • 5PM - 10PM".into(),
                venue: "Liberty Station • Ingram Plaza".into(),
            },
            updated_at,
        }),
    }
}

/// Default content for every id.
pub fn default_documents(updated_at: u64) -> Vec<ContentDocument> {
    ContentId::ALL
        .into_iter()
        .map(|id| default_document(id, updated_at))
        .collect()
}

// ── Fallback content ───────────────────────────────────────────────

/// Static stand-in for `id` when the store has nothing to serve.
pub fn fallback_document(id: ContentId) -> ContentDocument {
    match id {
        ContentId::SiteMetadata => ContentDocument::SiteMetadata(SiteMetadata {
            title: "San Diego Yacht Rock Festival 2025 | Liberty Station".into(),
            description: "San Diego's Premier Yacht Rock Festival".into(),
            keywords: strings(&["yacht rock", "festival", "san diego"]),
            ..Default::default()
        }),
        ContentId::HomePage => ContentDocument::HomePage(HomePage {
            headline: "Get Priority Access to San Diego Yacht Rock Festival Tickets".into(),
            subheadline: "Get On Board for San Diego's Smoothest Summer Festival".into(),
            description: "First access to tickets, lineup drops, and VIP upgrades".into(),
            form_labels: FormFields {
                name: "Name".into(),
                email: "Email".into(),
                phone: "Phone".into(),
            },
            form_placeholders: FormFields {
                name: "Your name".into(),
                email: "your@email.com".into(),
                phone: "(619) 555-0000".into(),
            },
            submit_button: "Join the Captain's List".into(),
            success_message: SuccessMessage {
                title: "Welcome Aboard!".into(),
                description: "You're on the list!".into(),
            },
            trust_builders: strings(&[
                "No spam. Just smooth sailing.",
                "You'll hear from us before the general public.",
            ]),
            event_details: EventDetails {
                date: "SAT OCT 11 • 2025".into(),
                time: "5PM - 10PM".into(),
                venue: "LIBERTY STATION".into(),
                address: "2751 DEWEY RD SAN DIEGO CA".into(),
            },
            ..Default::default()
        }),
        ContentId::LineupPage => ContentDocument::LineupPage(LineupPage {
            title: "2025 LINEUP".into(),
            subtitle: "Smooth sounds all day long".into(),
            footer_text: "More artists to be announced!".into(),
            ..Default::default()
        }),
        ContentId::SchedulePage => ContentDocument::SchedulePage(SchedulePage {
            title: "EVENT SCHEDULE".into(),
            date: "Saturday, October 11, 2025".into(),
            ..Default::default()
        }),
        ContentId::TicketsPage => ContentDocument::TicketsPage(TicketsPage {
            title: "GET YOUR TICKETS".into(),
            subtitle: "Limited availability".into(),
            info_section: InfoSection {
                title: "Ticket Information".into(),
                items: Vec::new(),
            },
            contact_email: "tickets@sdyachtrockfest.com".into(),
            ..Default::default()
        }),
        ContentId::Navigation => ContentDocument::Navigation(Navigation {
            title: "YACHT ROCK FESTIVAL".into(),
            cta_button: Link {
                label: "Buy Tickets".into(),
                href: "/tickets".into(),
            },
            event_info: EventInfo {
                date: "SAT OCT 11, 2025".into(),
                venue: "Liberty Station".into(),
            },
            ..Default::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_id_has_matching_documents() {
        for id in ContentId::ALL {
            assert_eq!(default_document(id, 1).id(), id);
            assert_eq!(fallback_document(id).id(), id);
        }
    }

    #[test]
    fn default_lists_are_densely_ordered() {
        let docs = default_documents(42);
        for doc in &docs {
            assert_eq!(doc.updated_at(), 42);
            let orders: Vec<u32> = match doc {
                ContentDocument::LineupPage(p) => p.artists.iter().map(|a| a.order).collect(),
                ContentDocument::SchedulePage(p) => p.events.iter().map(|e| e.order).collect(),
                ContentDocument::TicketsPage(p) => p.tiers.iter().map(|t| t.order).collect(),
                ContentDocument::Navigation(p) => p.items.iter().map(|i| i.order).collect(),
                _ => continue,
            };
            let expected: Vec<u32> = (1..=orders.len() as u32).collect();
            assert_eq!(orders, expected, "{}", doc.id());
        }
    }

    #[test]
    fn fallback_lineup_has_no_artists() {
        match fallback_document(ContentId::LineupPage) {
            ContentDocument::LineupPage(page) => {
                assert!(page.artists.is_empty());
                assert_eq!(page.title, "2025 LINEUP");
            }
            other => panic!("unexpected document {}", other.id()),
        }
    }
}
