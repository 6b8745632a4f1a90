//! Process-local TTL cache for content documents.
//!
//! An entry is a hit only while `now - fetched_at < ttl`. There is no
//! eviction besides expiry and [`ContentCache::clear`], which the content
//! service calls after every write and every observed remote change. The
//! key space is the six fixed content ids, so the map stays tiny.
//!
//! Every clear starts a new generation. A reader that fetched before a
//! clear stores its result with [`ContentCache::set_if_current`], which
//! drops it once the generation has moved on.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use fest_state::{ContentDocument, ContentId};

/// Default freshness window.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheEntry {
    value: ContentDocument,
    fetched_at: Instant,
}

#[derive(Default)]
struct Entries {
    generation: u64,
    map: HashMap<ContentId, CacheEntry>,
}

pub struct ContentCache {
    ttl: Duration,
    entries: RwLock<Entries>,
}

impl ContentCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(Entries::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached value for `key` if it is still fresh.
    pub async fn get(&self, key: ContentId) -> Option<ContentDocument> {
        self.get_at(key, Instant::now()).await
    }

    /// [`get`](Self::get) against an explicit clock reading.
    pub async fn get_at(&self, key: ContentId, now: Instant) -> Option<ContentDocument> {
        let entries = self.entries.read().await;
        entries
            .map
            .get(&key)
            .filter(|entry| now.saturating_duration_since(entry.fetched_at) < self.ttl)
            .map(|entry| entry.value.clone())
    }

    pub async fn set(&self, key: ContentId, value: ContentDocument) {
        self.set_at(key, value, Instant::now()).await;
    }

    pub async fn set_at(&self, key: ContentId, value: ContentDocument, fetched_at: Instant) {
        let mut entries = self.entries.write().await;
        entries.map.insert(key, CacheEntry { value, fetched_at });
    }

    /// Current generation. Capture it before reading the store.
    pub async fn generation(&self) -> u64 {
        self.entries.read().await.generation
    }

    /// Store `value` only if no clear happened since `generation` was
    /// captured. Returns whether it was stored.
    pub async fn set_if_current(&self, key: ContentId, value: ContentDocument, generation: u64) -> bool {
        let mut entries = self.entries.write().await;
        if entries.generation != generation {
            debug!(%key, "discarding read that raced a cache clear");
            return false;
        }
        entries.map.insert(
            key,
            CacheEntry {
                value,
                fetched_at: Instant::now(),
            },
        );
        true
    }

    /// Drop every entry and start a new generation.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let dropped = entries.map.len();
        entries.map.clear();
        entries.generation += 1;
        debug!(dropped, generation = entries.generation, "content cache cleared");
    }

    /// Number of stored entries, fresh or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
