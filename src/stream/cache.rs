//! Fixed-TTL resolution cache.
//!
//! Entries expire lazily: every lookup first drops whatever has passed its
//! `cache_until`, then looks the id up. Access never extends an entry's life.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use tracing::debug;

use crate::stream::models::{CacheEntry, StreamItem};

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Storage behind the cache. Only the in-memory store exists today.
pub trait CacheStore: Send + Sync {
    fn get(&self, id: &str) -> Option<Arc<CacheEntry>>;

    /// Insert or replace the entry for `entry.item.id`.
    fn put(&self, entry: Arc<CacheEntry>);

    /// Drop every expired entry, returning how many went.
    fn remove_expired(&self, now: SystemTime) -> usize;

    fn len(&self) -> usize;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Arc<CacheEntry>>>,
}

impl CacheStore for MemoryStore {
    fn get(&self, id: &str) -> Option<Arc<CacheEntry>> {
        self.entries.lock().get(id).cloned()
    }

    fn put(&self, entry: Arc<CacheEntry>) {
        self.entries.lock().insert(entry.item.id.clone(), entry);
    }

    fn remove_expired(&self, now: SystemTime) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

pub struct ResolutionCache {
    store: Box<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl ResolutionCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_parts(Box::new(MemoryStore::default()), Arc::new(SystemClock), ttl)
    }

    pub fn with_parts(store: Box<dyn CacheStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    pub fn get(&self, id: &str) -> Option<Arc<CacheEntry>> {
        let expired = self.store.remove_expired(self.clock.now());
        if expired > 0 {
            debug!("evicted {} expired cache entries", expired);
        }
        self.store.get(id)
    }

    pub fn insert(&self, item: StreamItem, audio_manifest: String, video_manifest: String) -> Arc<CacheEntry> {
        let entry = Arc::new(CacheEntry {
            item,
            audio_manifest,
            video_manifest,
            cache_until: self.clock.now() + self.ttl,
        });
        self.store.put(entry.clone());
        entry
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualClock;

    fn item(id: &str) -> StreamItem {
        StreamItem {
            id: id.to_string(),
            title: "t".into(),
            description: String::new(),
            published_at: 0,
            thumbnail_url: None,
            duration_seconds: None,
            tags: vec![],
            audio_manifest_url: "https://a".into(),
            video_manifest_url: "https://v".into(),
            audio_label: "audio".into(),
        }
    }

    fn cache(clock: Arc<ManualClock>) -> ResolutionCache {
        ResolutionCache::with_parts(
            Box::new(MemoryStore::default()),
            clock,
            Duration::from_secs(60),
        )
    }

    #[test]
    fn hit_within_ttl_returns_same_entry() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(clock.clone());

        let inserted = cache.insert(item("v1"), "a".into(), "v".into());
        clock.advance(Duration::from_secs(59));

        let hit = cache.get("v1").unwrap();
        assert!(Arc::ptr_eq(&inserted, &hit));
    }

    #[test]
    fn entry_expires_exactly_at_cache_until() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(clock.clone());

        cache.insert(item("v1"), "a".into(), "v".into());
        clock.advance(Duration::from_secs(60));

        assert!(cache.get("v1").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn access_does_not_extend_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(clock.clone());

        let inserted = cache.insert(item("v1"), "a".into(), "v".into());
        clock.advance(Duration::from_secs(30));
        assert_eq!(cache.get("v1").unwrap().cache_until, inserted.cache_until);
        clock.advance(Duration::from_secs(30));
        assert!(cache.get("v1").is_none());
    }

    #[test]
    fn lookup_evicts_other_expired_entries() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(clock.clone());

        cache.insert(item("old"), "a".into(), "v".into());
        clock.advance(Duration::from_secs(45));
        cache.insert(item("new"), "a".into(), "v".into());
        clock.advance(Duration::from_secs(20));

        assert!(cache.get("new").is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn last_writer_wins() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(clock);

        cache.insert(item("v1"), "first".into(), "v".into());
        cache.insert(item("v1"), "second".into(), "v".into());

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("v1").unwrap().audio_manifest, "second");
    }
}
