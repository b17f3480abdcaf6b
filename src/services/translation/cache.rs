use lru::LruCache;
use parking_lot::RwLock;
use std::num::NonZeroUsize;
use tracing::debug;

/// Normalized cache key for a translation request.
///
/// Language codes are lower-cased at construction so requests differing only
/// in code case share an entry; the text itself is compared byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    text: String,
    source_lang: String,
    target_lang: String,
}

impl CacheKey {
    pub fn new(text: &str, source_lang: &str, target_lang: &str) -> Self {
        Self {
            text: text.to_string(),
            source_lang: source_lang.to_lowercase(),
            target_lang: target_lang.to_lowercase(),
        }
    }
}

/// Bounded in-memory translation cache with LRU eviction.
///
/// Memory-only: entries are created on successful translations, refreshed on
/// every lookup, and evicted strictly by recency once capacity is reached.
/// There is no time-based expiry and no persistence across restarts.
///
/// All reordering happens under a single lock; `get` takes the write lock
/// because a hit also moves the entry to the most-recently-used position.
pub struct TranslationCache {
    entries: RwLock<LruCache<CacheKey, String>>,
}

impl TranslationCache {
    /// Create a cache bounded to `capacity` entries. Capacity is fixed for
    /// the lifetime of the cache.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    /// Look up a translation, refreshing the entry's recency on a hit.
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        let mut entries = self.entries.write();
        entries.get(key).cloned()
    }

    /// Insert or overwrite a translation, marking it most recently used.
    /// When the insert would exceed capacity the least-recently-used entry
    /// is evicted, so the entry count never exceeds the configured bound.
    pub fn put(&self, key: CacheKey, translated: String) {
        let mut entries = self.entries.write();
        if entries.put(key, translated).is_none() && entries.len() == entries.cap().get() {
            debug!(capacity = entries.cap().get(), "translation cache at capacity");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.read().cap().get()
    }
}
