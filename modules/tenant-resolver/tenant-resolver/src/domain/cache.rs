//! Short-lived cache of positive directory lookups, keyed by normalized slug.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tenant_resolver_sdk::TenantRecord;

#[derive(Debug, Clone)]
struct Entry {
    record: TenantRecord,
    stored_at: Instant,
}

/// Only active tenants are stored; misses and inactive tenants always go to
/// the directory. A zero TTL disables the cache.
///
/// Every invalidation bumps a generation counter. Lookups that started before
/// an invalidation must not populate the cache afterwards; they store through
/// [`TenantCache::insert_if_unchanged`] with the generation read beforehand.
#[derive(Debug)]
pub struct TenantCache {
    entries: DashMap<String, Entry>,
    generation: AtomicU64,
    ttl: Duration,
    capacity: usize,
}

impl TenantCache {
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            generation: AtomicU64::new(0),
            ttl,
            capacity,
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, 0)
    }

    fn enabled(&self) -> bool {
        !self.ttl.is_zero() && self.capacity > 0
    }

    pub fn get(&self, slug: &str) -> Option<TenantRecord> {
        if !self.enabled() {
            return None;
        }
        let fresh = {
            let entry = self.entries.get(slug)?;
            (entry.stored_at.elapsed() < self.ttl).then(|| entry.record.clone())
        };
        if fresh.is_none() {
            self.entries
                .remove_if(slug, |_, e| e.stored_at.elapsed() >= self.ttl);
        }
        fresh
    }

    pub fn insert(&self, record: &TenantRecord) {
        if !self.enabled() || !record.active {
            return;
        }
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&record.slug) {
            self.evict_one();
        }
        self.entries.insert(
            record.slug.clone(),
            Entry {
                record: record.clone(),
                stored_at: Instant::now(),
            },
        );
    }

    /// Current invalidation generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Store `record` unless an invalidation happened since `seen` was read.
    pub fn insert_if_unchanged(&self, record: &TenantRecord, seen: u64) {
        if self.generation() != seen {
            return;
        }
        self.insert(record);
        // An invalidation between the check and the insert wins.
        if self.generation() != seen {
            self.entries.remove(&record.slug);
        }
    }

    pub fn invalidate(&self, slug: &str) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if self.entries.remove(slug).is_some() {
            tracing::debug!(
                category = "tenant_resolver",
                event = "cache.invalidated",
                tenant_slug = %slug
            );
        }
    }

    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.entries.clear();
        tracing::debug!(category = "tenant_resolver", event = "cache.cleared");
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Expired entries go first; otherwise the oldest one.
    fn evict_one(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, e| e.stored_at.elapsed() < ttl);
        if self.entries.len() < self.capacity {
            return;
        }
        let oldest = self
            .entries
            .iter()
            .min_by_key(|e| e.value().stored_at)
            .map(|e| e.key().clone());
        if let Some(slug) = oldest {
            self.entries.remove(&slug);
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::domain::test_support::record;

    #[test]
    fn stores_and_returns_active_records() {
        let cache = TenantCache::new(Duration::from_secs(60), 10);
        let r = record("cafe-kopi", true);
        cache.insert(&r);
        assert_eq!(cache.get("cafe-kopi"), Some(r));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn inactive_records_are_not_cached() {
        let cache = TenantCache::new(Duration::from_secs(60), 10);
        cache.insert(&record("closed-shop", false));
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_ttl_disables_cache() {
        let cache = TenantCache::disabled();
        cache.insert(&record("cafe-kopi", true));
        assert!(cache.get("cafe-kopi").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn expired_entries_are_dropped_on_read() {
        let cache = TenantCache::new(Duration::from_millis(20), 10);
        cache.insert(&record("cafe-kopi", true));
        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get("cafe-kopi").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidation_hooks() {
        let cache = TenantCache::new(Duration::from_secs(60), 10);
        cache.insert(&record("cafe-kopi", true));
        cache.insert(&record("warung-ani", true));

        cache.invalidate("cafe-kopi");
        assert!(cache.get("cafe-kopi").is_none());
        assert!(cache.get("warung-ani").is_some());

        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn stale_lookup_is_not_stored_after_invalidation() {
        let cache = TenantCache::new(Duration::from_secs(60), 10);
        let r = record("cafe-kopi", true);

        let seen = cache.generation();
        cache.invalidate("cafe-kopi");
        cache.insert_if_unchanged(&r, seen);
        assert!(cache.get("cafe-kopi").is_none());

        let seen = cache.generation();
        cache.invalidate_all();
        cache.insert_if_unchanged(&r, seen);
        assert!(cache.is_empty());

        cache.insert_if_unchanged(&r, cache.generation());
        assert_eq!(cache.get("cafe-kopi"), Some(r));
    }

    #[test]
    fn capacity_is_bounded() {
        let cache = TenantCache::new(Duration::from_secs(60), 2);
        cache.insert(&record("shop-one", true));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert(&record("shop-two", true));
        cache.insert(&record("shop-three", true));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("shop-one").is_none());
        assert!(cache.get("shop-three").is_some());
    }
}
