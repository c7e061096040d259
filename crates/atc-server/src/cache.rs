//! Bounded, TTL-pruned analysis cache.

use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

pub trait CacheEntry {
    fn stored_at(&self) -> Instant;
}

/// Drop expired entries, then the oldest ones until `max_entries` remain.
pub fn prune_cache<K, V>(cache: &DashMap<K, V>, max_entries: usize, max_age: Duration)
where
    K: Clone + Eq + Hash,
    V: CacheEntry,
{
    let now = Instant::now();
    let mut entries: Vec<(K, Instant)> = cache
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().stored_at()))
        .collect();

    entries.retain(|(key, stored_at)| {
        let expired = now.duration_since(*stored_at) > max_age;
        if expired {
            cache.remove(key);
        }
        !expired
    });

    if cache.len() <= max_entries {
        return;
    }

    entries.sort_by_key(|(_, stored_at)| *stored_at);
    for (key, _) in entries {
        if cache.len() <= max_entries {
            break;
        }
        cache.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stamp(Instant);

    impl CacheEntry for Stamp {
        fn stored_at(&self) -> Instant {
            self.0
        }
    }

    #[test]
    fn evicts_oldest_over_capacity() {
        let cache = DashMap::new();
        let start = Instant::now();
        for i in 0..5u64 {
            cache.insert(i, Stamp(start + Duration::from_millis(i)));
        }

        prune_cache(&cache, 3, Duration::from_secs(60));
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains_key(&0));
        assert!(!cache.contains_key(&1));
        assert!(cache.contains_key(&4));
    }

    #[test]
    fn evicts_expired_entries() {
        let cache = DashMap::new();
        cache.insert("stale", Stamp(Instant::now()));
        std::thread::sleep(Duration::from_millis(60));
        cache.insert("fresh", Stamp(Instant::now()));

        prune_cache(&cache, 10, Duration::from_millis(30));
        assert!(cache.contains_key("fresh"));
        assert!(!cache.contains_key("stale"));
    }
}
