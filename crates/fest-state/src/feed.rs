//! Per-document change feed.
//!
//! One `watch` channel per content id holds the latest committed
//! snapshot. Subscribers see every write made through any handle to the
//! same store, which is how one admin's save reaches another admin's
//! open view.

use std::collections::HashMap;

use tokio::sync::watch;
use tracing::debug;

use crate::types::{ContentDocument, ContentId};

/// Receiver half handed to subscribers. `None` until the first write
/// observed by this process.
pub type ChangeReceiver = watch::Receiver<Option<ContentDocument>>;

pub struct ChangeFeed {
    channels: HashMap<ContentId, watch::Sender<Option<ContentDocument>>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let channels = ContentId::ALL
            .into_iter()
            .map(|id| (id, watch::channel(None).0))
            .collect();
        Self { channels }
    }

    /// Open a subscription for `id`. The current value counts as seen.
    pub fn subscribe(&self, id: ContentId) -> ChangeReceiver {
        self.channels[&id].subscribe()
    }

    /// Publish a committed snapshot to every subscriber of its id.
    pub fn publish(&self, doc: &ContentDocument) {
        let id = doc.id();
        let sender = &self.channels[&id];
        sender.send_replace(Some(doc.clone()));
        debug!(%id, subscribers = sender.receiver_count(), "content change published");
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SchedulePage;

    #[tokio::test]
    async fn subscriber_sees_publish_for_its_id_only() {
        let feed = ChangeFeed::new();
        let mut schedule = feed.subscribe(ContentId::SchedulePage);
        let lineup = feed.subscribe(ContentId::LineupPage);

        feed.publish(&ContentDocument::SchedulePage(SchedulePage {
            title: "EVENT SCHEDULE".into(),
            ..Default::default()
        }));

        schedule.changed().await.unwrap();
        let seen = schedule.borrow_and_update().clone().unwrap();
        assert_eq!(seen.id(), ContentId::SchedulePage);
        assert!(!lineup.has_changed().unwrap());
    }
}
