//! StateStore — redb-backed persistence for the festival site.
//!
//! Provides typed operations over content documents, the version log,
//! registrations, and the admin allow-list. All values are JSON-serialized
//! into redb's `&[u8]` value columns. The store supports both on-disk and
//! in-memory backends (the latter for testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::feed::{ChangeFeed, ChangeReceiver};
use crate::patch::ContentPatch;
use crate::records::VersionRecord;
use crate::tables::*;
use crate::types::*;

/// Storage operations the content layer depends on.
///
/// `StateStore` is the production implementation; tests substitute
/// counting or failing stores.
pub trait ContentStore: Send + Sync + 'static {
    /// Fetch a content document by its fixed id.
    fn get_document(&self, id: ContentId) -> StateResult<Option<ContentDocument>>;

    /// Merge `patch` into the existing document and stamp `updated_at`.
    /// Fails with [`StateError::NotFound`] when the document was never created.
    fn merge_document(&self, patch: &ContentPatch, updated_at: u64) -> StateResult<ContentDocument>;

    /// Replace a document wholesale.
    fn put_document(&self, doc: &ContentDocument) -> StateResult<()>;

    /// Merge `patch` and append `record` to the version log atomically.
    fn merge_document_versioned(
        &self,
        patch: &ContentPatch,
        updated_at: u64,
        record: &VersionRecord,
    ) -> StateResult<ContentDocument>;

    /// Append a record to the version log.
    fn append_version(&self, record: &VersionRecord) -> StateResult<()>;

    /// Every version record across all documents, newest first.
    fn list_versions(&self) -> StateResult<Vec<VersionRecord>>;

    /// Subscribe to committed changes of one document.
    fn subscribe(&self, id: ContentId) -> ChangeReceiver;
}

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    pub(crate) db: Arc<Database>,
    feed: Arc<ChangeFeed>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self::from_database(db)?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self::from_database(db)?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    fn from_database(db: Database) -> StateResult<Self> {
        let store = Self {
            db: Arc::new(db),
            feed: Arc::new(ChangeFeed::new()),
        };
        store.ensure_tables()?;
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(CONTENT).map_err(map_err!(Table))?;
        txn.open_table(CONTENT_VERSIONS).map_err(map_err!(Table))?;
        txn.open_table(REGISTRATIONS).map_err(map_err!(Table))?;
        txn.open_table(ADMINS).map_err(map_err!(Table))?;
        txn.open_table(CREDENTIALS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Generic JSON helpers ───────────────────────────────────────

    pub(crate) fn put_json<T: Serialize>(
        &self,
        table_def: JsonTable,
        key: &str,
        value: &T,
    ) -> StateResult<()> {
        let value = serde_json::to_vec(value).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(table_def).map_err(map_err!(Table))?;
            table
                .insert(key, value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    pub(crate) fn get_json<T: DeserializeOwned>(
        &self,
        table_def: JsonTable,
        key: &str,
    ) -> StateResult<Option<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table_def).map_err(map_err!(Table))?;
        match table.get(key).map_err(map_err!(Read))? {
            Some(guard) => {
                let value: T =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// All values of a table in key order.
    pub(crate) fn list_json<T: DeserializeOwned>(
        &self,
        table_def: JsonTable,
    ) -> StateResult<Vec<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table_def).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let item: T = serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(item);
        }
        Ok(results)
    }

    pub(crate) fn delete_key(
        &self,
        table_def: JsonTable,
        key: &str,
    ) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(table_def).map_err(map_err!(Table))?;
            existed = table.remove(key).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(existed)
    }

    pub(crate) fn count(&self, table_def: JsonTable) -> StateResult<u64> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table_def).map_err(map_err!(Table))?;
        table.len().map_err(map_err!(Read))
    }

    // ── Content documents ──────────────────────────────────────────

    /// Merge `patch` and, when given, insert `record` into the version
    /// log in the same write transaction. Either both land or neither.
    fn commit_merge(
        &self,
        patch: &ContentPatch,
        updated_at: u64,
        record: Option<&VersionRecord>,
    ) -> StateResult<ContentDocument> {
        let id = patch.target();
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let doc = {
            let mut table = txn.open_table(CONTENT).map_err(map_err!(Table))?;
            let existing = table
                .get(id.as_str())
                .map_err(map_err!(Read))?
                .map(|guard| guard.value().to_vec());
            let Some(bytes) = existing else {
                return Err(StateError::NotFound(format!("content document {id}")));
            };
            let mut doc: ContentDocument =
                serde_json::from_slice(&bytes).map_err(map_err!(Deserialize))?;
            doc.apply(patch)?;
            doc.set_updated_at(updated_at);
            let value = serde_json::to_vec(&doc).map_err(map_err!(Serialize))?;
            table
                .insert(id.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
            doc
        };
        if let Some(record) = record {
            let key = record.table_key();
            let value = serde_json::to_vec(record).map_err(map_err!(Serialize))?;
            let mut versions = txn.open_table(CONTENT_VERSIONS).map_err(map_err!(Table))?;
            // Version records are immutable.
            let taken = versions.get(key.as_str()).map_err(map_err!(Read))?.is_some();
            if taken {
                return Err(StateError::Write(format!("version {key} already recorded")));
            }
            versions
                .insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%id, updated_at, versioned = record.is_some(), "content document merged");
        self.feed.publish(&doc);
        Ok(doc)
    }

    /// List every content document that has been created.
    pub fn list_documents(&self) -> StateResult<Vec<ContentDocument>> {
        self.list_json(CONTENT)
    }

    /// Number of version records across all documents.
    pub fn version_count(&self) -> StateResult<u64> {
        self.count(CONTENT_VERSIONS)
    }
}

impl ContentStore for StateStore {
    fn get_document(&self, id: ContentId) -> StateResult<Option<ContentDocument>> {
        self.get_json(CONTENT, id.as_str())
    }

    fn merge_document(&self, patch: &ContentPatch, updated_at: u64) -> StateResult<ContentDocument> {
        self.commit_merge(patch, updated_at, None)
    }

    fn merge_document_versioned(
        &self,
        patch: &ContentPatch,
        updated_at: u64,
        record: &VersionRecord,
    ) -> StateResult<ContentDocument> {
        self.commit_merge(patch, updated_at, Some(record))
    }

    fn put_document(&self, doc: &ContentDocument) -> StateResult<()> {
        let id = doc.id();
        self.put_json(CONTENT, id.as_str(), doc)?;
        debug!(%id, "content document stored");
        self.feed.publish(doc);
        Ok(())
    }

    fn append_version(&self, record: &VersionRecord) -> StateResult<()> {
        let key = record.table_key();
        self.put_json(CONTENT_VERSIONS, &key, record)?;
        debug!(%key, content_id = %record.content_id, "version recorded");
        Ok(())
    }

    fn list_versions(&self) -> StateResult<Vec<VersionRecord>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(CONTENT_VERSIONS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))?.rev() {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let record: VersionRecord =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(record);
        }
        Ok(results)
    }

    fn subscribe(&self, id: ContentId) -> ChangeReceiver {
        self.feed.subscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::LineupPagePatch;
    use serde_json::json;

    fn lineup(title: &str) -> ContentDocument {
        ContentDocument::LineupPage(LineupPage {
            title: title.to_string(),
            subtitle: "Smooth sounds all day long".to_string(),
            artists: vec![Artist {
                id: "1".to_string(),
                name: "Yacht Rock Revue".to_string(),
                time: "9:00 PM".to_string(),
                category: ArtistCategory::Headliner,
                order: 1,
                ..Default::default()
            }],
            footer_text: "More artists to be announced!".to_string(),
            updated_at: 1000,
        })
    }

    fn version(content_id: ContentId, id: &str, changed_at: u64) -> VersionRecord {
        VersionRecord {
            id: id.to_string(),
            content_type: content_id.content_type(),
            content_id,
            data: json!({"title": id}),
            changed_by: "admin-1".to_string(),
            changed_at,
            change_note: None,
        }
    }

    // ── Content CRUD ───────────────────────────────────────────────

    #[test]
    fn document_put_and_get() {
        let store = StateStore::open_in_memory().unwrap();
        let doc = lineup("2025 LINEUP");

        store.put_document(&doc).unwrap();
        let retrieved = store.get_document(ContentId::LineupPage).unwrap();

        assert_eq!(retrieved, Some(doc));
    }

    #[test]
    fn document_get_missing_returns_none() {
        let store = StateStore::open_in_memory().unwrap();
        assert!(store.get_document(ContentId::TicketsPage).unwrap().is_none());
    }

    #[test]
    fn merge_updates_named_fields_and_stamps_time() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_document(&lineup("2025 LINEUP")).unwrap();

        let patch = ContentPatch::LineupPage(LineupPagePatch {
            title: Some("2026 LINEUP".to_string()),
            ..Default::default()
        });
        let merged = store.merge_document(&patch, 2000).unwrap();

        let ContentDocument::LineupPage(page) = merged else { unreachable!() };
        assert_eq!(page.title, "2026 LINEUP");
        assert_eq!(page.artists.len(), 1);
        assert_eq!(page.updated_at, 2000);

        let stored = store.get_document(ContentId::LineupPage).unwrap().unwrap();
        assert_eq!(stored.updated_at(), 2000);
    }

    #[test]
    fn merge_into_missing_document_fails() {
        let store = StateStore::open_in_memory().unwrap();
        let patch = ContentPatch::LineupPage(LineupPagePatch::default());
        assert!(matches!(
            store.merge_document(&patch, 1),
            Err(StateError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn merge_publishes_to_subscribers() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_document(&lineup("2025 LINEUP")).unwrap();
        let mut rx = store.subscribe(ContentId::LineupPage);

        // A second handle to the same store (another admin session).
        let other = store.clone();
        let patch = ContentPatch::LineupPage(LineupPagePatch {
            footer_text: Some("Lineup complete".to_string()),
            ..Default::default()
        });
        other.merge_document(&patch, 3000).unwrap();

        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone().unwrap();
        assert_eq!(snapshot.updated_at(), 3000);
    }

    // ── Version log ────────────────────────────────────────────────

    #[test]
    fn versions_list_newest_first() {
        let store = StateStore::open_in_memory().unwrap();
        store.append_version(&version(ContentId::HomePage, "a", 100)).unwrap();
        store.append_version(&version(ContentId::LineupPage, "b", 300)).unwrap();
        store.append_version(&version(ContentId::HomePage, "c", 200)).unwrap();

        let ids: Vec<String> = store
            .list_versions()
            .unwrap()
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert_eq!(store.version_count().unwrap(), 3);
    }

    #[test]
    fn versioned_merge_commits_document_and_record_together() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_document(&lineup("2025 LINEUP")).unwrap();
        let patch = ContentPatch::LineupPage(LineupPagePatch {
            title: Some("2026 LINEUP".to_string()),
            ..Default::default()
        });

        let record = version(ContentId::LineupPage, "v1", 2000);
        store.merge_document_versioned(&patch, 2000, &record).unwrap();
        assert_eq!(store.list_versions().unwrap(), vec![record.clone()]);

        // A failed version insert leaves the document untouched.
        let retitled = ContentPatch::LineupPage(LineupPagePatch {
            title: Some("2027 LINEUP".to_string()),
            ..Default::default()
        });
        let err = store.merge_document_versioned(&retitled, 2001, &record);
        assert!(matches!(err, Err(StateError::Write(_))));

        let stored = store.get_document(ContentId::LineupPage).unwrap().unwrap();
        let ContentDocument::LineupPage(page) = stored else { unreachable!() };
        assert_eq!((page.title.as_str(), page.updated_at), ("2026 LINEUP", 2000));
        assert_eq!(store.version_count().unwrap(), 1);
    }

    #[test]
    fn versions_with_same_timestamp_are_all_kept() {
        let store = StateStore::open_in_memory().unwrap();
        store.append_version(&version(ContentId::HomePage, "1001", 100)).unwrap();
        store.append_version(&version(ContentId::HomePage, "1002", 100)).unwrap();
        assert_eq!(store.list_versions().unwrap().len(), 2);
    }

    // ── Persistence (on-disk) ──────────────────────────────────────

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        {
            let store = StateStore::open(&db_path).unwrap();
            store.put_document(&lineup("2025 LINEUP")).unwrap();
        }

        // Reopen the same database file.
        let store = StateStore::open(&db_path).unwrap();
        let docs = store.list_documents().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id(), ContentId::LineupPage);
    }
}
