//! Content service: read-through cache accessors, versioned writers and
//! list editing over a [`ContentStore`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use fest_core::{epoch_secs, time_id};
use fest_state::{
    ChangeReceiver, ContentDocument, ContentId, ContentPatch, ContentStore, StateError,
    VersionRecord,
};

use crate::cache::ContentCache;
use crate::defaults::default_documents;
use crate::error::{ContentError, ContentResult};
use crate::kind::{ContentKind, ListEntry};
use crate::ordering::{self, Direction};

/// Owns the content cache and mediates every read and write of the six
/// content documents.
///
/// Cheap to clone; clones share the store and the cache.
#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn ContentStore>,
    cache: Arc<ContentCache>,
}

impl ContentService {
    pub fn new(store: Arc<dyn ContentStore>, cache_ttl: Duration) -> Self {
        Self {
            store,
            cache: Arc::new(ContentCache::new(cache_ttl)),
        }
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Drop every cached document.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Open a change subscription for `id` on the backing store.
    pub fn subscribe(&self, id: ContentId) -> ChangeReceiver {
        self.store.subscribe(id)
    }

    // ── Reads ──────────────────────────────────────────────────────

    /// Read `id` through the cache, propagating store failures.
    ///
    /// A fetch that overlaps a cache clear is returned but not cached.
    pub async fn try_get_document(&self, id: ContentId) -> ContentResult<Option<ContentDocument>> {
        if let Some(doc) = self.cache.get(id).await {
            return Ok(Some(doc));
        }
        let generation = self.cache.generation().await;
        let fetched = self.store.get_document(id)?;
        if let Some(doc) = &fetched {
            self.cache.set_if_current(id, doc.clone(), generation).await;
        }
        Ok(fetched)
    }

    /// Read `id` through the cache. Store failures are logged and read
    /// as absent; callers substitute fallback content.
    pub async fn get_document(&self, id: ContentId) -> Option<ContentDocument> {
        match self.try_get_document(id).await {
            Ok(doc) => doc,
            Err(e) => {
                error!(%id, error = %e, "failed to read content document");
                None
            }
        }
    }

    pub async fn try_get<T: ContentKind>(&self) -> ContentResult<Option<T>> {
        Ok(self.try_get_document(T::ID).await?.and_then(T::from_document))
    }

    /// Typed read; `None` when absent or unreadable.
    pub async fn get<T: ContentKind>(&self) -> Option<T> {
        self.get_document(T::ID).await.and_then(T::from_document)
    }

    /// Typed read that never comes back empty.
    pub async fn get_or_fallback<T: ContentKind>(&self) -> T {
        match self.get::<T>().await {
            Some(doc) => doc,
            None => {
                debug!(id = %T::ID, "serving fallback content");
                T::fallback()
            }
        }
    }

    // ── Writes ─────────────────────────────────────────────────────

    /// Merge `patch` into its document, stamp `updated_at`, and append a
    /// version record in the same store transaction. The cache is cleared
    /// afterwards whatever the outcome.
    pub async fn apply_patch(
        &self,
        patch: &ContentPatch,
        changed_by: &str,
    ) -> ContentResult<ContentDocument> {
        let result = self.write_patch(patch, changed_by);
        self.cache.clear().await;
        result
    }

    fn write_patch(&self, patch: &ContentPatch, changed_by: &str) -> ContentResult<ContentDocument> {
        let id = patch.target();
        let now = epoch_secs();
        let record = VersionRecord {
            id: time_id(),
            content_type: id.content_type(),
            content_id: id,
            data: patch.to_data()?,
            changed_by: changed_by.to_string(),
            changed_at: now,
            change_note: None,
        };
        let doc = self
            .store
            .merge_document_versioned(patch, now, &record)
            .map_err(|e| match e {
                StateError::NotFound(_) => ContentError::Missing(id),
                other => other.into(),
            })?;
        info!(%id, changed_by, version = %record.id, "content updated");
        Ok(doc)
    }

    /// Typed partial update. Returns the merged document.
    pub async fn update<T: ContentKind>(&self, patch: T::Patch, changed_by: &str) -> ContentResult<T> {
        let doc = self.apply_patch(&T::wrap_patch(patch), changed_by).await?;
        T::from_document(doc).ok_or(ContentError::Missing(T::ID))
    }

    /// Overwrite all six documents with the default festival content.
    pub async fn initialize_default_content(&self) -> ContentResult<()> {
        let result = default_documents(epoch_secs())
            .iter()
            .try_for_each(|doc| self.store.put_document(doc));
        self.cache.clear().await;
        result?;
        info!("default content initialized");
        Ok(())
    }

    // ── Version history ────────────────────────────────────────────

    /// Version records for `id`, newest first.
    ///
    /// Scans the whole log and filters here; the log is small for a
    /// single-event site.
    pub fn history(&self, id: ContentId) -> ContentResult<Vec<VersionRecord>> {
        let all = self.store.list_versions()?;
        Ok(all.into_iter().filter(|v| v.content_id == id).collect())
    }

    // ── Ordered lists ──────────────────────────────────────────────

    /// Append `entry` to its list at position N+1.
    pub async fn add_entry<E: ListEntry>(&self, entry: E, changed_by: &str) -> ContentResult<E> {
        let (_, added) = self
            .edit_list::<E, _>(changed_by, |entries| {
                Ok((ordering::push(entries, entry).clone(), true))
            })
            .await?;
        Ok(added)
    }

    /// Replace the fields of one entry, keeping its id and position.
    pub async fn update_entry<E: ListEntry>(
        &self,
        entry_id: &str,
        entry: E,
        changed_by: &str,
    ) -> ContentResult<E> {
        let (_, updated) = self
            .edit_list::<E, _>(changed_by, |entries| {
                let stored = ordering::replace(entries, entry_id, entry)
                    .cloned()
                    .ok_or_else(|| entry_not_found::<E>(entry_id))?;
                Ok((stored, true))
            })
            .await?;
        Ok(updated)
    }

    pub async fn remove_entry<E: ListEntry>(
        &self,
        entry_id: &str,
        changed_by: &str,
    ) -> ContentResult<E::Page> {
        let (page, _) = self
            .edit_list::<E, _>(changed_by, |entries| {
                ordering::remove(entries, entry_id).ok_or_else(|| entry_not_found::<E>(entry_id))?;
                Ok(((), true))
            })
            .await?;
        Ok(page)
    }

    /// Move one step up or down. At the edges nothing is written.
    pub async fn move_entry<E: ListEntry>(
        &self,
        entry_id: &str,
        direction: Direction,
        changed_by: &str,
    ) -> ContentResult<E::Page> {
        let (page, _) = self
            .edit_list::<E, _>(changed_by, |entries| {
                let moved = ordering::move_entry(entries, entry_id, direction)
                    .ok_or_else(|| entry_not_found::<E>(entry_id))?;
                Ok(((), moved))
            })
            .await?;
        Ok(page)
    }

    /// Drag-and-drop reorder by 0-based position.
    pub async fn reorder_entries<E: ListEntry>(
        &self,
        from: usize,
        to: usize,
        changed_by: &str,
    ) -> ContentResult<E::Page> {
        let (page, _) = self
            .edit_list::<E, _>(changed_by, |entries| {
                let len = entries.len();
                if !ordering::reorder(entries, from, to) {
                    return Err(ContentError::OutOfRange {
                        list: E::LIST,
                        index: from.max(to),
                        len,
                    });
                }
                Ok(((), from != to))
            })
            .await?;
        Ok(page)
    }

    /// Read-modify-write of one list. The list is read from the store,
    /// not the cache, so edits always start from the committed state.
    /// `edit` returns its output and whether anything changed.
    async fn edit_list<E, R>(
        &self,
        changed_by: &str,
        edit: impl FnOnce(&mut Vec<E>) -> ContentResult<(R, bool)>,
    ) -> ContentResult<(E::Page, R)>
    where
        E: ListEntry,
    {
        let page = self
            .store
            .get_document(E::Page::ID)?
            .and_then(E::Page::from_document)
            .ok_or(ContentError::Missing(E::Page::ID))?;

        let mut entries = E::entries(&page).to_vec();
        let (out, changed) = edit(&mut entries)?;
        if !changed {
            return Ok((page, out));
        }
        let page = self
            .update::<E::Page>(E::replace_patch(entries), changed_by)
            .await?;
        Ok((page, out))
    }
}

fn entry_not_found<E: ListEntry>(id: &str) -> ContentError {
    ContentError::EntryNotFound {
        list: E::LIST,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use fest_state::*;

    /// Delegating store that counts document reads and can be switched
    /// into failing mode.
    struct ProbeStore {
        inner: StateStore,
        reads: AtomicUsize,
        offline: AtomicBool,
        versions_offline: AtomicBool,
    }

    impl ProbeStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                inner: StateStore::open_in_memory().unwrap(),
                reads: AtomicUsize::new(0),
                offline: Default::default(),
                versions_offline: Default::default(),
            })
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        fn go_offline(&self) {
            self.offline.store(true, Ordering::SeqCst);
        }

        fn reject_versions(&self) {
            self.versions_offline.store(true, Ordering::SeqCst);
        }

        fn check(&self) -> StateResult<()> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(StateError::Unavailable("store offline".into()));
            }
            Ok(())
        }

        fn check_versions(&self) -> StateResult<()> {
            self.check()?;
            if self.versions_offline.load(Ordering::SeqCst) {
                return Err(StateError::Write("version log rejected the record".into()));
            }
            Ok(())
        }
    }

    impl ContentStore for ProbeStore {
        fn get_document(&self, id: ContentId) -> StateResult<Option<ContentDocument>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            self.inner.get_document(id)
        }
        fn merge_document(&self, patch: &ContentPatch, updated_at: u64) -> StateResult<ContentDocument> {
            self.check()?;
            self.inner.merge_document(patch, updated_at)
        }
        fn merge_document_versioned(
            &self,
            patch: &ContentPatch,
            updated_at: u64,
            record: &VersionRecord,
        ) -> StateResult<ContentDocument> {
            // One transaction: a rejected record means nothing is merged.
            self.check_versions()?;
            self.inner.merge_document_versioned(patch, updated_at, record)
        }
        fn put_document(&self, doc: &ContentDocument) -> StateResult<()> {
            self.check()?;
            self.inner.put_document(doc)
        }
        fn append_version(&self, record: &VersionRecord) -> StateResult<()> {
            self.check_versions()?;
            self.inner.append_version(record)
        }
        fn list_versions(&self) -> StateResult<Vec<VersionRecord>> {
            self.check()?;
            self.inner.list_versions()
        }
        fn subscribe(&self, id: ContentId) -> ChangeReceiver {
            self.inner.subscribe(id)
        }
    }

    async fn seeded(ttl: Duration) -> (Arc<ProbeStore>, ContentService) {
        let store = ProbeStore::new();
        let service = ContentService::new(store.clone(), ttl);
        service.initialize_default_content().await.unwrap();
        (store, service)
    }

    #[tokio::test]
    async fn get_within_ttl_is_served_from_cache() {
        let (store, service) = seeded(Duration::from_secs(300)).await;

        let first = service.get::<LineupPage>().await.unwrap();
        let second = service.get::<LineupPage>().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.reads(), 1);
    }

    #[tokio::test]
    async fn expired_entries_are_refetched() {
        let (store, service) = seeded(Duration::ZERO).await;

        service.get::<LineupPage>().await.unwrap();
        service.get::<LineupPage>().await.unwrap();

        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn update_twice_is_idempotent_but_versioned_twice() {
        let (_, service) = seeded(Duration::from_secs(300)).await;
        let patch = LineupPagePatch {
            title: Some("2026 LINEUP".into()),
            ..Default::default()
        };

        let once = service.update::<LineupPage>(patch.clone(), "admin-1").await.unwrap();
        let twice = service.update::<LineupPage>(patch, "admin-1").await.unwrap();

        assert_eq!(once.title, twice.title);
        assert_eq!(once.artists, twice.artists);
        let history = service.history(ContentId::LineupPage).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|v| v.changed_by == "admin-1"));
        assert_eq!(history[0].data, serde_json::json!({ "title": "2026 LINEUP" }));
    }

    #[tokio::test]
    async fn update_invalidates_every_cached_document() {
        let (_, service) = seeded(Duration::from_secs(300)).await;
        service.get::<Navigation>().await.unwrap();
        let before = service.get::<LineupPage>().await.unwrap();

        service
            .update::<LineupPage>(
                LineupPagePatch {
                    subtitle: Some("All day".into()),
                    ..Default::default()
                },
                "admin-1",
            )
            .await
            .unwrap();

        assert!(service.cache().is_empty().await);
        let after = service.get::<LineupPage>().await.unwrap();
        assert_ne!(before.subtitle, after.subtitle);
        assert_eq!(after.subtitle, "All day");
    }

    #[tokio::test]
    async fn update_of_missing_document_fails_and_writes_no_version() {
        let store = ProbeStore::new();
        let service = ContentService::new(store.clone(), Duration::from_secs(300));

        let err = service
            .update::<SiteMetadata>(SiteMetadataPatch::default(), "admin-1")
            .await
            .unwrap_err();

        assert!(matches!(err, ContentError::Missing(ContentId::SiteMetadata)));
        assert!(store.inner.list_versions().unwrap().is_empty());
    }

    #[tokio::test]
    async fn read_failure_reads_as_absent_and_falls_back() {
        let (store, service) = seeded(Duration::ZERO).await;
        store.go_offline();

        assert!(service.get::<HomePage>().await.is_none());
        assert!(service.try_get::<HomePage>().await.is_err());
        let page = service.get_or_fallback::<HomePage>().await;
        assert_eq!(page, HomePage::fallback());
    }

    #[tokio::test]
    async fn write_failure_propagates() {
        let (store, service) = seeded(Duration::from_secs(300)).await;
        store.go_offline();

        let result = service
            .update::<TicketsPage>(
                TicketsPagePatch {
                    tickets_enabled: Some(true),
                    ..Default::default()
                },
                "admin-1",
            )
            .await;
        assert!(matches!(result, Err(ContentError::State(StateError::Unavailable(_)))));
    }

    #[tokio::test]
    async fn history_filters_by_document() {
        let (_, service) = seeded(Duration::from_secs(300)).await;
        service
            .update::<Navigation>(
                NavigationPatch {
                    title: Some("YACHT ROCK".into()),
                    ..Default::default()
                },
                "a",
            )
            .await
            .unwrap();
        service
            .update::<SchedulePage>(
                SchedulePagePatch {
                    date: Some("Sunday".into()),
                    ..Default::default()
                },
                "b",
            )
            .await
            .unwrap();

        let nav = service.history(ContentId::Navigation).unwrap();
        assert_eq!(nav.len(), 1);
        assert_eq!(nav[0].content_type, ContentType::Navigation);
        assert!(service.history(ContentId::HomePage).unwrap().is_empty());
    }

    #[tokio::test]
    async fn added_opener_moved_up_lands_at_position_n() {
        let (_, service) = seeded(Duration::from_secs(300)).await;
        let n = service.get::<LineupPage>().await.unwrap().artists.len();

        let added = service
            .add_entry(
                Artist {
                    name: "Little River Band".into(),
                    time: "4:30 PM".into(),
                    category: ArtistCategory::Opener,
                    ..Default::default()
                },
                "admin-1",
            )
            .await
            .unwrap();
        assert_eq!(added.order as usize, n + 1);

        let page = service
            .move_entry::<Artist>(&added.id, Direction::Up, "admin-1")
            .await
            .unwrap();

        let orders: Vec<u32> = page.artists.iter().map(|a| a.order).collect();
        assert_eq!(orders, (1..=n as u32 + 1).collect::<Vec<_>>());
        let moved = page.artists.iter().find(|a| a.id == added.id).unwrap();
        assert_eq!(moved.order as usize, n);
        assert_eq!(service.history(ContentId::LineupPage).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn move_at_edge_writes_nothing() {
        let (_, service) = seeded(Duration::from_secs(300)).await;

        let page = service
            .move_entry::<NavigationItem>("1", Direction::Up, "admin-1")
            .await
            .unwrap();

        assert_eq!(page.items[0].id, "1");
        assert!(service.history(ContentId::Navigation).unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_edits_report_unknown_entries_and_bad_positions() {
        let (_, service) = seeded(Duration::from_secs(300)).await;

        let missing = service.remove_entry::<TicketTier>("nope", "a").await.unwrap_err();
        assert!(matches!(missing, ContentError::EntryNotFound { list: "tiers", .. }));

        let range = service
            .reorder_entries::<ScheduleEvent>(0, 99, "a")
            .await
            .unwrap_err();
        assert!(matches!(range, ContentError::OutOfRange { list: "events", len: 8, .. }));
    }

    #[tokio::test]
    async fn remove_and_reorder_keep_orders_dense() {
        let (_, service) = seeded(Duration::from_secs(300)).await;

        let page = service.remove_entry::<ScheduleEvent>("3", "a").await.unwrap();
        assert_eq!(page.events.len(), 7);
        let page = service.reorder_entries::<ScheduleEvent>(6, 0, "a").await.unwrap();

        assert_eq!(page.events[0].title, "Festival Ends");
        let orders: Vec<u32> = page.events.iter().map(|e| e.order).collect();
        assert_eq!(orders, (1..=7).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn update_entry_keeps_position() {
        let (_, service) = seeded(Duration::from_secs(300)).await;

        let tier = service
            .update_entry(
                "2",
                TicketTier {
                    name: "VIP".into(),
                    price: 175,
                    sold_out: true,
                    ..Default::default()
                },
                "a",
            )
            .await
            .unwrap();

        assert_eq!((tier.id.as_str(), tier.order, tier.price), ("2", 2, 175));
        let page = service.get::<TicketsPage>().await.unwrap();
        assert!(page.tiers[1].sold_out);
    }

    #[tokio::test]
    async fn rejected_version_record_leaves_document_unchanged() {
        let (store, service) = seeded(Duration::from_secs(300)).await;
        let before = service.get::<LineupPage>().await.unwrap();
        store.reject_versions();

        let result = service
            .update::<LineupPage>(
                LineupPagePatch {
                    title: Some("2026 LINEUP".into()),
                    ..Default::default()
                },
                "admin-1",
            )
            .await;

        assert!(matches!(result, Err(ContentError::State(StateError::Write(_)))));
        let after = store.inner.get_document(ContentId::LineupPage).unwrap().unwrap();
        assert_eq!(after, ContentDocument::LineupPage(before));
        assert!(service.history(ContentId::LineupPage).unwrap().is_empty());
    }

    /// Store whose next document read, once armed, parks after fetching
    /// until the test lets it go.
    struct GatedStore {
        inner: StateStore,
        armed: AtomicBool,
        fetched: Barrier,
        release: Barrier,
    }

    impl ContentStore for GatedStore {
        fn get_document(&self, id: ContentId) -> StateResult<Option<ContentDocument>> {
            let doc = self.inner.get_document(id);
            if self.armed.swap(false, Ordering::SeqCst) {
                self.fetched.wait();
                self.release.wait();
            }
            doc
        }
        fn merge_document(&self, patch: &ContentPatch, updated_at: u64) -> StateResult<ContentDocument> {
            self.inner.merge_document(patch, updated_at)
        }
        fn merge_document_versioned(
            &self,
            patch: &ContentPatch,
            updated_at: u64,
            record: &VersionRecord,
        ) -> StateResult<ContentDocument> {
            self.inner.merge_document_versioned(patch, updated_at, record)
        }
        fn put_document(&self, doc: &ContentDocument) -> StateResult<()> {
            self.inner.put_document(doc)
        }
        fn append_version(&self, record: &VersionRecord) -> StateResult<()> {
            self.inner.append_version(record)
        }
        fn list_versions(&self) -> StateResult<Vec<VersionRecord>> {
            self.inner.list_versions()
        }
        fn subscribe(&self, id: ContentId) -> ChangeReceiver {
            self.inner.subscribe(id)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn read_overlapping_an_update_does_not_cache_the_old_document() {
        let store = Arc::new(GatedStore {
            inner: StateStore::open_in_memory().unwrap(),
            armed: AtomicBool::new(false),
            fetched: Barrier::new(2),
            release: Barrier::new(2),
        });
        let service = ContentService::new(store.clone(), Duration::from_secs(300));
        service.initialize_default_content().await.unwrap();

        store.armed.store(true, Ordering::SeqCst);
        let reader = tokio::spawn({
            let service = service.clone();
            async move { service.get::<LineupPage>().await }
        });
        let gate = store.clone();
        tokio::task::spawn_blocking(move || gate.fetched.wait()).await.unwrap();

        service
            .update::<LineupPage>(
                LineupPagePatch {
                    title: Some("NEW".into()),
                    ..Default::default()
                },
                "admin-1",
            )
            .await
            .unwrap();

        let gate = store.clone();
        tokio::task::spawn_blocking(move || gate.release.wait()).await.unwrap();
        let stale = reader.await.unwrap().unwrap();
        assert_ne!(stale.title, "NEW");

        let served = service.get::<LineupPage>().await.unwrap();
        assert_eq!(served.title, "NEW");
    }
}
