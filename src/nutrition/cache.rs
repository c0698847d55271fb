use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use super::Resolution;

/// Thread-safe LRU cache of resolved ingredients, keyed by canonical name.
///
/// Entries optionally expire after a time-to-live. Clones share storage.
#[derive(Clone)]
pub struct NutritionCache {
    cache: Arc<Mutex<LruCache<String, (Resolution, Instant)>>>,
    ttl: Option<Duration>,
}

impl NutritionCache {
    /// A capacity of zero is treated as one
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<Resolution> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let expired = match cache.get(key) {
            None => return None,
            Some((resolution, stored_at)) => match self.ttl {
                Some(ttl) if stored_at.elapsed() >= ttl => true,
                _ => return Some(resolution.clone()),
            },
        };
        if expired {
            cache.pop(key);
        }
        None
    }

    pub fn put(&self, key: String, resolution: Resolution) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.put(key, (resolution, Instant::now()));
    }

    pub fn len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::ScoreSource;

    fn resolution(score: u8) -> Resolution {
        Resolution {
            facts: None,
            health_score: score,
            source: ScoreSource::Table,
        }
    }

    #[test]
    fn test_cache_hit_after_put() {
        let cache = NutritionCache::new(10, None);
        cache.put("ui".to_string(), resolution(7));
        assert_eq!(cache.get("ui"), Some(resolution(7)));
        assert_eq!(cache.get("prei"), None);
    }

    #[test]
    fn test_capacity_enforcement() {
        let cache = NutritionCache::new(2, None);
        cache.put("a".to_string(), resolution(1));
        cache.put("b".to_string(), resolution(2));
        cache.put("c".to_string(), resolution(3));

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(resolution(2)));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let cache = NutritionCache::new(10, Some(Duration::ZERO));
        cache.put("ui".to_string(), resolution(7));
        assert_eq!(cache.get("ui"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = NutritionCache::new(10, None);
        let shared = cache.clone();
        let handle = std::thread::spawn(move || shared.put("kip".to_string(), resolution(6)));
        handle.join().unwrap();
        assert_eq!(cache.get("kip"), Some(resolution(6)));
    }
}
