// ABOUTME: Shared test utilities for grounding integration tests
// ABOUTME: Scripted lookup source with call counters and injected failures, record builders, engine setup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `nutrition_grounding`

use std::collections::VecDeque;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::sleep;
use tracing::Level;

use nutrition_grounding::cache::{CacheConfig, FoodCache};
use nutrition_grounding::config::{EngineConfig, RetryPolicy};
use nutrition_grounding::engine::GroundingEngine;
use nutrition_grounding::errors::{AppResult, LookupError};
use nutrition_grounding::external::FoodDataSource;
use nutrition_grounding::models::{FoodRecord, MacroProfile, SourceTier};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .init();
    });
}

/// Per-100g record with complete macros
pub fn record(
    id: &str,
    tier: SourceTier,
    description: &str,
    calories: f64,
    protein_g: f64,
    carbs_g: f64,
    fat_g: f64,
) -> FoodRecord {
    FoodRecord::per_100g(
        id,
        tier,
        description,
        MacroProfile::new(calories, protein_g, carbs_g, fat_g),
    )
}

/// Lookup source answering from a table, with scripted failures and call counts
///
/// Failures queued for a query are returned, one per call, before the
/// table answer. Queries absent from the table return no candidates.
#[derive(Default)]
pub struct ScriptedSource {
    records: DashMap<String, Vec<FoodRecord>>,
    failures: DashMap<String, VecDeque<LookupError>>,
    delays: DashMap<String, Duration>,
    calls: DashMap<String, usize>,
    total_calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `records`
    pub fn with_records(self, query: &str, records: Vec<FoodRecord>) -> Self {
        self.records.insert(query.to_owned(), records);
        self
    }

    /// Fail the next calls for `query` with `errors`, in order
    pub fn with_failures(self, query: &str, errors: Vec<LookupError>) -> Self {
        self.failures.insert(query.to_owned(), errors.into());
        self
    }

    /// Sleep before answering `query`
    pub fn with_delay(self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_owned(), delay);
        self
    }

    /// Calls received for `query`
    pub fn calls_for(&self, query: &str) -> usize {
        self.calls.get(query).map_or(0, |count| *count)
    }

    /// Calls received across all queries
    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FoodDataSource for ScriptedSource {
    async fn search(&self, query: &str) -> Result<Vec<FoodRecord>, LookupError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        *self.calls.entry(query.to_owned()).or_insert(0) += 1;

        let delay = self.delays.get(query).map(|d| *d);
        if let Some(delay) = delay {
            sleep(delay).await;
        }

        let failure = self
            .failures
            .get_mut(query)
            .and_then(|mut queue| queue.pop_front());
        if let Some(error) = failure {
            return Err(error);
        }
        Ok(self
            .records
            .get(query)
            .map(|records| records.clone())
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Retry policy with short, distinct delays for paused-time assertions
pub fn fast_retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(100),
        multiplier: 2.0,
        rate_limit_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(5),
    }
}

/// Engine configuration for tests: memory-only cache, fast retries
pub fn test_config() -> EngineConfig {
    let mut config = EngineConfig {
        cache: CacheConfig::memory_only(),
        retry: fast_retry_policy(),
        ..EngineConfig::default()
    };
    config.usda.request_timeout_secs = 2;
    config
}

/// Engine over `source` with a fresh memory-only cache
pub fn engine_with(source: Arc<ScriptedSource>) -> AppResult<GroundingEngine> {
    engine_with_config(source, test_config())
}

/// Engine over `source` with the given configuration
pub fn engine_with_config(
    source: Arc<ScriptedSource>,
    config: EngineConfig,
) -> AppResult<GroundingEngine> {
    init_test_logging();
    let cache = Arc::new(FoodCache::new(&config.cache, None));
    GroundingEngine::new(source, cache, config)
}
