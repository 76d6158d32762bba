use crate::content::EntityId;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Cache key. `content_version` makes entries stale as soon as content
/// changes, without touching them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub path: String,
    pub language: String,
    pub content_version: u64,
}

impl CacheKey {
    pub fn new(path: &str, language: &str, content_version: u64) -> Self {
        Self {
            path: path.to_string(),
            language: language.to_string(),
            content_version,
        }
    }
}

/// Cached outcome of one resolution. `NotFound` is a real negative entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedResolution {
    Entity(EntityId),
    Archive(String),
    NotFound,
}

/// Bounded LRU cache of resolutions, shared across requests.
#[derive(Debug)]
pub struct ResolutionCache {
    entries: Mutex<LruCache<CacheKey, CachedResolution>>,
}

impl ResolutionCache {
    pub const DEFAULT_CAPACITY: usize = 4096;

    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<CacheKey, CachedResolution>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &CacheKey) -> Option<CachedResolution> {
        self.lock().get(key).cloned()
    }

    pub fn put(&self, key: CacheKey, value: CachedResolution) {
        self.lock().put(key, value);
    }

    /// Drop every entry. Needed when the route table changes, which the
    /// content version does not track.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let cache = ResolutionCache::new(8);
        let key = CacheKey::new("en/hello", "en", 1);
        assert_eq!(cache.get(&key), None);

        cache.put(key.clone(), CachedResolution::Entity(EntityId(123)));
        assert_eq!(cache.get(&key), Some(CachedResolution::Entity(EntityId(123))));
    }

    #[test]
    fn test_version_is_part_of_key() {
        let cache = ResolutionCache::new(8);
        cache.put(CacheKey::new("hallo", "de", 1), CachedResolution::NotFound);
        assert_eq!(cache.get(&CacheKey::new("hallo", "de", 2)), None);
        assert_eq!(
            cache.get(&CacheKey::new("hallo", "de", 1)),
            Some(CachedResolution::NotFound)
        );
    }

    #[test]
    fn test_capacity_is_bounded() {
        let cache = ResolutionCache::new(2);
        for i in 0..5 {
            cache.put(CacheKey::new(&format!("p{}", i), "de", 1), CachedResolution::NotFound);
        }
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&CacheKey::new("p0", "de", 1)).is_none());
        assert!(cache.get(&CacheKey::new("p4", "de", 1)).is_some());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        assert_eq!(ResolutionCache::new(0).capacity(), 1);
    }

    #[test]
    fn test_clear() {
        let cache = ResolutionCache::new(4);
        cache.put(CacheKey::new("a", "de", 1), CachedResolution::Archive("book".to_string()));
        cache.clear();
        assert!(cache.is_empty());
    }
}
