// ABOUTME: Two-tier food lookup cache service shared across concurrent lookups and requests
// ABOUTME: Memory-then-persistent reads with promotion, dual writes, per-key locks, stats, and admin ops
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use super::{CacheConfig, CacheEntry, PersistentStore, ShardedMemoryCache, SqliteFoodStore};
use crate::errors::AppResult;
use crate::models::FoodRecord;

/// Tier that served a cache hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    /// Bounded in-memory LRU
    Memory,
    /// Durable store (promoted into memory on hit)
    Persistent,
}

/// Candidate list served from cache
#[derive(Debug, Clone)]
pub struct CacheHit {
    /// Cached candidates (possibly empty)
    pub records: Vec<FoodRecord>,
    /// Serving tier
    pub tier: CacheTier,
}

/// Cache counters and sizes
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Entries currently in memory
    pub memory_entries: usize,
    /// Memory tier capacity
    pub memory_capacity: usize,
    /// Entries in the persistent tier, when configured
    pub persistent_entries: Option<u64>,
    /// Lookups served from memory
    pub memory_hits: u64,
    /// Lookups served from the persistent tier
    pub persistent_hits: u64,
    /// Lookups that reached the remote source
    pub misses: u64,
    /// Entries written after a remote fetch
    pub writes: u64,
}

#[derive(Default)]
struct Counters {
    memory_hits: AtomicU64,
    persistent_hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
}

/// Exclusive hold on one cache key
///
/// Dropping the guard releases the key and removes its lock from the table
/// once no other task is waiting on it.
pub struct KeyGuard<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Two-tier cache keyed by normalized query
pub struct FoodCache {
    memory: ShardedMemoryCache,
    persistent: Option<Arc<dyn PersistentStore>>,
    ttl: Duration,
    cache_empty_results: bool,
    key_locks: DashMap<String, Arc<Mutex<()>>>,
    counters: Counters,
}

impl FoodCache {
    /// Build from configuration and an optional persistent tier
    #[must_use]
    pub fn new(config: &CacheConfig, persistent: Option<Arc<dyn PersistentStore>>) -> Self {
        Self {
            memory: ShardedMemoryCache::new(config.memory_capacity, config.memory_shards),
            persistent,
            ttl: config.ttl,
            cache_empty_results: config.cache_empty_results,
            key_locks: DashMap::new(),
            counters: Counters::default(),
        }
    }

    /// Build from configuration, opening the `SQLite` tier when a URL is configured
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the persistent tier cannot be opened
    pub async fn from_config(config: &CacheConfig) -> AppResult<Self> {
        let persistent: Option<Arc<dyn PersistentStore>> = if config.has_persistent_tier() {
            Some(Arc::new(SqliteFoodStore::connect(&config.database_url).await?))
        } else {
            None
        };
        Ok(Self::new(config, persistent))
    }

    /// Look up a normalized query, memory first, then the persistent tier
    ///
    /// A persistent hit is promoted into memory. Expired entries and
    /// persistent-tier failures count as misses.
    pub async fn get(&self, key: &str) -> Option<CacheHit> {
        if let Some(entry) = self.memory.get(key).await {
            self.counters.memory_hits.fetch_add(1, Ordering::Relaxed);
            return Some(CacheHit {
                records: entry.records,
                tier: CacheTier::Memory,
            });
        }

        if let Some(store) = &self.persistent {
            match store.get(key).await {
                Ok(Some(entry)) if !entry.is_expired() => {
                    self.counters.persistent_hits.fetch_add(1, Ordering::Relaxed);
                    let records = entry.records.clone();
                    self.memory.insert(entry).await;
                    debug!(cache.key = %key, "Promoted persistent cache entry into memory");
                    return Some(CacheHit {
                        records,
                        tier: CacheTier::Persistent,
                    });
                }
                Ok(Some(_)) => debug!(cache.key = %key, "Persistent cache entry expired"),
                Ok(None) => {}
                Err(e) => warn!(cache.key = %key, error = %e, "Persistent cache read failed"),
            }
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Write a fresh candidate list to both tiers
    ///
    /// Replaces any previous entry wholesale. A persistent-tier failure is
    /// logged; the memory tier still holds the entry.
    pub async fn put(&self, key: &str, records: Vec<FoodRecord>) {
        if records.is_empty() && !self.cache_empty_results {
            return;
        }
        let entry = CacheEntry::new(key, records, self.ttl);

        if let Some(store) = &self.persistent {
            if let Err(e) = store.put(&entry).await {
                warn!(cache.key = %key, error = %e, "Persistent cache write failed");
            }
        }
        self.memory.insert(entry).await;
        self.counters.writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Serialize work on one key; other keys are unaffected
    pub async fn lock_key(&self, key: &str) -> KeyGuard<'_> {
        let lock = Arc::clone(
            &self
                .key_locks
                .entry(key.to_owned())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        );
        let guard = lock.lock_owned().await;
        KeyGuard {
            locks: &self.key_locks,
            key: key.to_owned(),
            guard: Some(guard),
        }
    }

    /// Keys currently locked or awaited
    #[must_use]
    pub fn active_key_locks(&self) -> usize {
        self.key_locks.len()
    }

    /// Counters and tier sizes
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the persistent tier cannot be counted
    pub async fn stats(&self) -> AppResult<CacheStats> {
        let persistent_entries = match &self.persistent {
            Some(store) => Some(store.entry_count().await?),
            None => None,
        };
        Ok(CacheStats {
            memory_entries: self.memory.len().await,
            memory_capacity: self.memory.capacity(),
            persistent_entries,
            memory_hits: self.counters.memory_hits.load(Ordering::Relaxed),
            persistent_hits: self.counters.persistent_hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            writes: self.counters.writes.load(Ordering::Relaxed),
        })
    }

    /// Drop expired entries from both tiers; returns the number removed
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the persistent tier fails
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let mut removed = self.memory.purge_expired().await as u64;
        if let Some(store) = &self.persistent {
            removed += store.purge_expired().await?;
        }
        Ok(removed)
    }

    /// Drop every entry from both tiers; returns the number removed
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the persistent tier fails
    pub async fn clear(&self) -> AppResult<u64> {
        let mut removed = self.memory.clear().await as u64;
        if let Some(store) = &self.persistent {
            removed += store.clear().await?;
        }
        Ok(removed)
    }

    /// Entry lifetime applied on write
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}
