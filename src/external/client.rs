// ABOUTME: Food database client combining the lookup cache, a remote source, and the retry policy
// ABOUTME: Cache-first lookups keyed by normalized query, with per-attempt timeouts and backoff
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use super::retry::RetryPolicy;
use super::source::FoodDataSource;
use crate::cache::FoodCache;
use crate::errors::LookupError;
use crate::models::FoodRecord;

/// Cache-first lookup client
///
/// A lookup checks memory, then the persistent tier, and only then calls the
/// remote source. Concurrent misses for the same query serialize on the
/// cache's key lock, so the second caller finds the first caller's entry
/// instead of issuing another remote call.
pub struct FoodDatabaseClient {
    source: Arc<dyn FoodDataSource>,
    cache: Arc<FoodCache>,
    policy: RetryPolicy,
    attempt_timeout: Duration,
}

impl FoodDatabaseClient {
    /// Wire a source, a cache, and a retry policy together
    #[must_use]
    pub fn new(
        source: Arc<dyn FoodDataSource>,
        cache: Arc<FoodCache>,
        policy: RetryPolicy,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            source,
            cache,
            policy,
            attempt_timeout,
        }
    }

    /// Candidates for a normalized query
    ///
    /// # Errors
    ///
    /// Returns the last `LookupError` once retries are exhausted, or the
    /// first non-retriable one
    pub async fn lookup(&self, query: &str) -> Result<Vec<FoodRecord>, LookupError> {
        if let Some(hit) = self.cache.get(query).await {
            debug!(query = %query, tier = ?hit.tier, "Cache hit");
            return Ok(hit.records);
        }

        let _guard = self.cache.lock_key(query).await;
        // another task may have filled the entry while we waited
        if let Some(hit) = self.cache.get(query).await {
            debug!(query = %query, tier = ?hit.tier, "Cache filled while waiting");
            return Ok(hit.records);
        }

        let records = self.fetch_with_retry(query).await?;
        self.cache.put(query, records.clone()).await;
        Ok(records)
    }

    async fn fetch_with_retry(&self, query: &str) -> Result<Vec<FoodRecord>, LookupError> {
        let mut attempt = 1;
        loop {
            let result = match timeout(self.attempt_timeout, self.source.search(query)).await {
                Ok(result) => result,
                Err(_) => Err(LookupError::Timeout(self.attempt_timeout)),
            };

            match result {
                Ok(records) => {
                    debug!(
                        query = %query,
                        source = self.source.name(),
                        attempt,
                        candidates = records.len(),
                        "Remote lookup succeeded"
                    );
                    return Ok(records);
                }
                Err(error) if self.policy.should_retry(attempt, &error) => {
                    let delay = self.policy.delay_for(attempt, &error);
                    warn!(
                        query = %query,
                        source = self.source.name(),
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        error.kind = error.kind(),
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Remote lookup failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    warn!(
                        query = %query,
                        source = self.source.name(),
                        attempt,
                        error = %error,
                        "Remote lookup failed"
                    );
                    return Err(error);
                }
            }
        }
    }

    /// Shared cache handle
    #[must_use]
    pub const fn cache(&self) -> &Arc<FoodCache> {
        &self.cache
    }
}
