// ABOUTME: Bounded in-memory cache tier with LRU eviction, TTL checks, and sharded locking
// ABOUTME: Writers to one key serialize on its shard; reads of keys in other shards proceed in parallel
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use lru::LruCache;
use tokio::sync::Mutex;
use tracing::debug;

use super::CacheEntry;

/// LRU memory tier split into independently locked shards
///
/// Total capacity is divided across shards (the first `capacity % shards`
/// shards hold one extra entry), so the tier never holds more than the
/// configured number of entries.
pub struct ShardedMemoryCache {
    shards: Vec<Mutex<LruCache<String, CacheEntry>>>,
    capacity: usize,
}

impl ShardedMemoryCache {
    /// Create a tier holding at most `capacity` entries across `shards` locks
    ///
    /// Zero values are raised to 1; the shard count never exceeds the capacity.
    #[must_use]
    pub fn new(capacity: usize, shards: usize) -> Self {
        let capacity = capacity.max(1);
        let shard_count = shards.clamp(1, capacity);
        let base = capacity / shard_count;
        let extra = capacity % shard_count;

        let shards = (0..shard_count)
            .map(|index| {
                let shard_capacity = base + usize::from(index < extra);
                let shard_capacity = NonZeroUsize::new(shard_capacity).unwrap_or(NonZeroUsize::MIN);
                Mutex::new(LruCache::new(shard_capacity))
            })
            .collect();

        Self { shards, capacity }
    }

    fn shard(&self, key: &str) -> &Mutex<LruCache<String, CacheEntry>> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() % self.shards.len() as u64) as usize;
        &self.shards[index]
    }

    /// Fetch a live entry, dropping it if expired
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        let mut shard = self.shard(key).lock().await;
        let expired = shard.get(key)?.is_expired();
        if expired {
            shard.pop(key);
            drop(shard);
            debug!(cache.key = %key, "Dropped expired memory cache entry");
            return None;
        }
        shard.get(key).cloned()
    }

    /// Insert or replace an entry, evicting the shard's least recently used entry if full
    pub async fn insert(&self, entry: CacheEntry) {
        let mut shard = self.shard(&entry.query_key).lock().await;
        let key = entry.query_key.clone();
        if let Some((evicted, _)) = shard.push(key, entry) {
            if shard.peek(&evicted).is_none() {
                debug!(cache.key = %evicted, "Evicted least recently used entry");
            }
        }
    }

    /// Remove an entry; returns whether it existed
    pub async fn remove(&self, key: &str) -> bool {
        self.shard(key).lock().await.pop(key).is_some()
    }

    /// Number of entries across all shards
    pub async fn len(&self) -> usize {
        let mut total = 0;
        for shard in &self.shards {
            total += shard.lock().await.len();
        }
        total
    }

    /// Whether the tier holds no entries
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove every entry; returns the number removed
    pub async fn clear(&self) -> usize {
        let mut removed = 0;
        for shard in &self.shards {
            let mut guard = shard.lock().await;
            removed += guard.len();
            guard.clear();
        }
        removed
    }

    /// Remove expired entries; returns the number removed
    pub async fn purge_expired(&self) -> usize {
        let mut removed = 0;
        for shard in &self.shards {
            let mut guard = shard.lock().await;
            let expired: Vec<String> = guard
                .iter()
                .filter(|(_, entry)| entry.is_expired())
                .map(|(key, _)| key.clone())
                .collect();
            for key in &expired {
                guard.pop(key);
            }
            removed += expired.len();
        }
        if removed > 0 {
            debug!("Purged {removed} expired memory cache entries");
        }
        removed
    }

    /// Configured total capacity
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of lock shards
    #[must_use]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }
}
