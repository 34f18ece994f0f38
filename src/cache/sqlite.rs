// ABOUTME: SQLite-backed persistent cache tier surviving process restarts
// ABOUTME: Stores normalized_query -> candidate records with fetch time and TTL, last write wins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tokio::fs;
use tracing::{debug, info};

use super::{CacheEntry, PersistentStore};
use crate::errors::{AppError, AppResult};
use crate::models::FoodRecord;

/// Persistent tier stored in a single `food_cache` table
#[derive(Clone)]
pub struct SqliteFoodStore {
    pool: SqlitePool,
}

impl SqliteFoodStore {
    /// Open (creating if needed) the store at `database_url` and run the schema migration
    ///
    /// Accepts `sqlite:path`, `sqlite://path`, or `sqlite::memory:`. An
    /// in-memory store uses a single connection so every query sees the same
    /// database.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the URL is invalid or the database cannot be opened
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let is_memory = database_url.contains(":memory:");
        if !is_memory {
            ensure_parent_dir(database_url).await?;
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::storage(format!("Invalid cache database URL: {e}")))?
            .create_if_missing(true);

        let pool_options = if is_memory {
            // the database lives only as long as its connection
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(4)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::storage(format!("Failed to open cache database: {e}")))?;

        let store = Self { pool };
        store.migrate().await?;
        info!(database_url = %database_url, "Persistent food cache ready");
        Ok(store)
    }

    async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS food_cache (
                query_key TEXT PRIMARY KEY,
                records_json TEXT NOT NULL,
                fetched_at TEXT NOT NULL,
                ttl_secs INTEGER NOT NULL,
                expires_at INTEGER NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::storage(format!("Failed to create food_cache table: {e}")))?;
        Ok(())
    }

    fn row_to_entry(row: &SqliteRow) -> AppResult<CacheEntry> {
        let column = |e: sqlx::Error| AppError::storage(format!("Unreadable cache row: {e}"));
        let query_key: String = row.try_get("query_key").map_err(column)?;
        let records_json: String = row.try_get("records_json").map_err(column)?;
        let fetched_at: DateTime<Utc> = row.try_get("fetched_at").map_err(column)?;
        let ttl_secs: i64 = row.try_get("ttl_secs").map_err(column)?;

        let records: Vec<FoodRecord> = serde_json::from_str(&records_json).map_err(|e| {
            AppError::serialization(format!("Corrupt cache row for '{query_key}': {e}"))
                .with_query(query_key.clone())
        })?;

        Ok(CacheEntry {
            query_key,
            records,
            fetched_at,
            ttl: Duration::from_secs(u64::try_from(ttl_secs).unwrap_or(0)),
        })
    }
}

#[async_trait::async_trait]
impl PersistentStore for SqliteFoodStore {
    async fn get(&self, key: &str) -> AppResult<Option<CacheEntry>> {
        let row = sqlx::query(
            r"
            SELECT query_key, records_json, fetched_at, ttl_secs
            FROM food_cache
            WHERE query_key = ?1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::storage(format!("Failed to read cache entry: {e}")))?;

        row.as_ref().map(Self::row_to_entry).transpose()
    }

    async fn put(&self, entry: &CacheEntry) -> AppResult<()> {
        let records_json = serde_json::to_string(&entry.records)?;
        let ttl_secs = i64::try_from(entry.ttl.as_secs()).unwrap_or(i64::MAX);

        sqlx::query(
            r"
            INSERT INTO food_cache (query_key, records_json, fetched_at, ttl_secs, expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(query_key) DO UPDATE SET
                records_json = ?2,
                fetched_at = ?3,
                ttl_secs = ?4,
                expires_at = ?5
            ",
        )
        .bind(&entry.query_key)
        .bind(records_json)
        .bind(entry.fetched_at)
        .bind(ttl_secs)
        .bind(entry.expires_at().timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::storage(format!("Failed to write cache entry: {e}")))?;

        debug!(cache.key = %entry.query_key, records = entry.records.len(), "Persisted cache entry");
        Ok(())
    }

    async fn purge_expired(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM food_cache WHERE expires_at <= ?1")
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::storage(format!("Failed to purge cache: {e}")))?;
        Ok(result.rows_affected())
    }

    async fn clear(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM food_cache")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::storage(format!("Failed to clear cache: {e}")))?;
        Ok(result.rows_affected())
    }

    async fn entry_count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM food_cache")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::storage(format!("Failed to count cache entries: {e}")))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

/// Create the directory holding a file-backed database
async fn ensure_parent_dir(database_url: &str) -> AppResult<()> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let path = path.split('?').next().unwrap_or(path);

    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .await
            .map_err(|e| {
                AppError::storage(format!(
                    "Failed to create cache directory {}: {e}",
                    parent.display()
                ))
            }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::errors::ErrorCode;
    use crate::models::{MacroProfile, SourceTier};

    fn rice() -> FoodRecord {
        FoodRecord::per_100g(
            "169756",
            SourceTier::StandardReference,
            "Rice, white, cooked",
            MacroProfile::new(130.0, 2.7, 28.2, 0.3),
        )
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let store = SqliteFoodStore::connect("sqlite::memory:").await.unwrap();
        let entry = CacheEntry::new("rice", vec![rice()], Duration::from_secs(3600));
        store.put(&entry).await.unwrap();

        let loaded = store.get("rice").await.unwrap().unwrap();
        assert_eq!(loaded.records, entry.records);
        assert_eq!(loaded.ttl, entry.ttl);
        assert!((loaded.fetched_at - entry.fetched_at).num_milliseconds().abs() < 1);
        assert!(store.get("pasta").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_time_round_trips_as_timestamp() {
        let store = SqliteFoodStore::connect("sqlite::memory:").await.unwrap();
        let mut entry = CacheEntry::new("rice", vec![rice()], Duration::from_secs(600));
        entry.fetched_at = Utc::now() - ChronoDuration::minutes(5);
        store.put(&entry).await.unwrap();

        let loaded = store.get("rice").await.unwrap().unwrap();

        assert_eq!(loaded.fetched_at.timestamp(), entry.fetched_at.timestamp());
        assert_eq!(loaded.expires_at().timestamp(), entry.expires_at().timestamp());
        assert!(!loaded.is_expired());
    }

    #[tokio::test]
    async fn test_corrupt_row_reports_query() {
        let store = SqliteFoodStore::connect("sqlite::memory:").await.unwrap();
        sqlx::query(
            "INSERT INTO food_cache (query_key, records_json, fetched_at, ttl_secs, expires_at)
             VALUES ('rice', 'not json', ?1, 60, ?2)",
        )
        .bind(Utc::now())
        .bind(Utc::now().timestamp() + 60)
        .execute(&store.pool)
        .await
        .unwrap();

        let error = store.get("rice").await.unwrap_err();

        assert_eq!(error.code, ErrorCode::SerializationError);
        assert_eq!(error.context.query.as_deref(), Some("rice"));
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = SqliteFoodStore::connect("sqlite::memory:").await.unwrap();
        store
            .put(&CacheEntry::new("rice", vec![rice()], Duration::from_secs(60)))
            .await
            .unwrap();
        store
            .put(&CacheEntry::new("rice", Vec::new(), Duration::from_secs(60)))
            .await
            .unwrap();

        let loaded = store.get("rice").await.unwrap().unwrap();
        assert!(loaded.records.is_empty());
        assert_eq!(store.entry_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_purge_expired_keeps_fresh_rows() {
        let store = SqliteFoodStore::connect("sqlite::memory:").await.unwrap();
        let mut stale = CacheEntry::new("old", vec![rice()], Duration::from_secs(60));
        stale.fetched_at = Utc::now() - ChronoDuration::hours(1);
        store.put(&stale).await.unwrap();
        store
            .put(&CacheEntry::new("fresh", vec![rice()], Duration::from_secs(60)))
            .await
            .unwrap();

        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert!(store.get("fresh").await.unwrap().is_some());
        assert_eq!(store.clear().await.unwrap(), 1);
    }
}
