// ABOUTME: Two-tier lookup cache keyed by normalized query
// ABOUTME: Bounded sharded LRU memory tier in front of a durable SQLite tier, with TTL expiry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Lookup Cache
//!
//! The cache is the only state shared across concurrent lookups and across
//! requests. Entries hold the full candidate list returned for a normalized
//! query and are overwritten wholesale on refresh, never mutated in place.

/// Sharded in-memory LRU tier
pub mod memory;
/// Two-tier cache service with per-key write serialization
pub mod service;
/// `SQLite` persistent tier
pub mod sqlite;

use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{env_parse, env_var_or};
use crate::constants::cache::{
    DEFAULT_DATABASE_URL, DEFAULT_MEMORY_CAPACITY, DEFAULT_MEMORY_SHARDS, DEFAULT_TTL_SECS,
};
use crate::errors::{AppError, AppResult};
use crate::models::FoodRecord;

pub use memory::ShardedMemoryCache;
pub use service::{CacheHit, CacheStats, CacheTier, FoodCache, KeyGuard};
pub use sqlite::SqliteFoodStore;

/// Cached candidate list for one normalized query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Normalized query the records were fetched for
    pub query_key: String,
    /// Candidates as returned by the remote source (may be empty)
    pub records: Vec<FoodRecord>,
    /// When the remote call completed
    pub fetched_at: DateTime<Utc>,
    /// Lifetime from `fetched_at`
    pub ttl: Duration,
}

impl CacheEntry {
    /// New entry fetched now
    #[must_use]
    pub fn new(query_key: impl Into<String>, records: Vec<FoodRecord>, ttl: Duration) -> Self {
        Self {
            query_key: query_key.into(),
            records,
            fetched_at: Utc::now(),
            ttl,
        }
    }

    /// Expiry instant; saturates for TTLs beyond chrono's range
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        ChronoDuration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| self.fetched_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Whether the entry is stale at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    /// Whether the entry is stale now
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Durable cache tier
///
/// Implementations follow last-write-wins per key and never evict by
/// capacity; stale rows are dropped by `purge_expired`.
#[async_trait::async_trait]
pub trait PersistentStore: Send + Sync {
    /// Fetch the entry for `key`, expired or not
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails
    async fn get(&self, key: &str) -> AppResult<Option<CacheEntry>>;

    /// Insert or replace the entry for `entry.query_key`
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails
    async fn put(&self, entry: &CacheEntry) -> AppResult<()>;

    /// Delete entries whose TTL has elapsed; returns the number removed
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails
    async fn purge_expired(&self) -> AppResult<u64>;

    /// Delete every entry; returns the number removed
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails
    async fn clear(&self) -> AppResult<u64>;

    /// Number of stored entries
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails
    async fn entry_count(&self) -> AppResult<u64>;
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Memory tier capacity in entries, split across shards
    pub memory_capacity: usize,
    /// Number of memory tier lock shards
    pub memory_shards: usize,
    /// Entry lifetime
    pub ttl: Duration,
    /// Persistent tier URL (`sqlite:` path or `sqlite::memory:`); empty disables the tier
    pub database_url: String,
    /// Cache empty candidate lists so repeated misses skip the remote call
    pub cache_empty_results: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            memory_shards: DEFAULT_MEMORY_SHARDS,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            cache_empty_results: true,
        }
    }
}

impl CacheConfig {
    /// Memory tier only
    #[must_use]
    pub fn memory_only() -> Self {
        Self {
            database_url: String::new(),
            ..Self::default()
        }
    }

    /// Load from `FOOD_CACHE_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if a numeric variable does not parse
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self {
            database_url: env_var_or("FOOD_CACHE_DATABASE_URL", DEFAULT_DATABASE_URL),
            ..Self::default()
        };
        if let Some(capacity) = env_parse("FOOD_CACHE_CAPACITY")? {
            config.memory_capacity = capacity;
        }
        if let Some(shards) = env_parse("FOOD_CACHE_SHARDS")? {
            config.memory_shards = shards;
        }
        if let Some(ttl_secs) = env_parse::<u64>("FOOD_CACHE_TTL_SECS")? {
            config.ttl = Duration::from_secs(ttl_secs);
        }
        Ok(config)
    }

    /// Whether a persistent tier is configured
    #[must_use]
    pub fn has_persistent_tier(&self) -> bool {
        !self.database_url.trim().is_empty()
    }

    /// Validate sizes
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` for zero capacity, zero shards, or zero TTL
    pub fn validate(&self) -> AppResult<()> {
        if self.memory_capacity == 0 {
            return Err(AppError::config_invalid(
                "FOOD_CACHE_CAPACITY must be at least 1",
            ));
        }
        if self.memory_shards == 0 {
            return Err(AppError::config_invalid(
                "FOOD_CACHE_SHARDS must be at least 1",
            ));
        }
        if self.ttl.is_zero() {
            return Err(AppError::config_invalid(
                "FOOD_CACHE_TTL_SECS must be positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_expiry() {
        let mut entry = CacheEntry::new("rice", Vec::new(), Duration::from_secs(60));
        assert!(!entry.is_expired());
        entry.fetched_at = Utc::now() - ChronoDuration::seconds(61);
        assert!(entry.is_expired());
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        let entry = CacheEntry::new("rice", Vec::new(), Duration::MAX);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_config_rejects_zero_capacity() {
        let config = CacheConfig {
            memory_capacity: 0,
            ..CacheConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
