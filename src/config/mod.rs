// ABOUTME: Engine configuration assembled from environment variables with validated defaults
// ABOUTME: Aggregates USDA, retry, cache, selector, and validation settings plus the worker pool size
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Configuration
//!
//! Environment-only configuration. Every section has a `Default` built from
//! `crate::constants`, an environment overlay, and a `validate()` pass.
//! `EngineConfig::from_env` fails fast when the USDA credential is missing so
//! the process stops at startup instead of failing per request.

/// Best-match selection and validation thresholds
pub mod grounding;
/// USDA `FoodData` Central connection settings
pub mod usda;

use std::env;
use std::str::FromStr;

use tracing::info;

pub use crate::cache::CacheConfig;
use crate::constants::engine::DEFAULT_WORKER_POOL_SIZE;
use crate::errors::{AppError, AppResult};
pub use crate::external::retry::RetryPolicy;
pub use grounding::{PortionBound, SelectorConfig, ValidationConfig};
pub use usda::UsdaApiConfig;

/// Complete engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Remote database connection
    pub usda: UsdaApiConfig,
    /// Lookup retry policy
    pub retry: RetryPolicy,
    /// Two-tier cache settings
    pub cache: CacheConfig,
    /// Best-match selection thresholds
    pub selector: SelectorConfig,
    /// Consistency and plausibility checks
    pub validation: ValidationConfig,
    /// Concurrent ingredient lookups per request
    pub worker_pool_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            usda: UsdaApiConfig::default(),
            retry: RetryPolicy::default(),
            cache: CacheConfig::default(),
            selector: SelectorConfig::default(),
            validation: ValidationConfig::default(),
            worker_pool_size: DEFAULT_WORKER_POOL_SIZE,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` if `USDA_API_KEY` is unset or blank, and
    /// `ConfigInvalid` if any variable fails to parse or validate
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self {
            usda: UsdaApiConfig::from_env()?,
            retry: RetryPolicy::from_env()?,
            cache: CacheConfig::from_env()?,
            selector: SelectorConfig::from_env()?,
            validation: ValidationConfig::from_env()?,
            worker_pool_size: DEFAULT_WORKER_POOL_SIZE,
        };
        if let Some(workers) = env_parse::<usize>("GROUNDING_WORKERS")? {
            config.worker_pool_size = workers;
        }
        config.validate()?;
        config.log_summary();
        Ok(config)
    }

    /// Check every section
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` naming the first offending setting
    pub fn validate(&self) -> AppResult<()> {
        self.usda.validate()?;
        self.validate_pipeline()
    }

    /// Check everything except the remote connection
    ///
    /// Used when the engine runs against an injected lookup source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` naming the first offending setting
    pub fn validate_pipeline(&self) -> AppResult<()> {
        if self.worker_pool_size == 0 {
            return Err(AppError::config_invalid(
                "GROUNDING_WORKERS must be at least 1",
            ));
        }
        self.retry.validate()?;
        self.cache.validate()?;
        self.selector.validate()?;
        self.validation.validate()
    }

    fn log_summary(&self) {
        info!(
            usda.base_url = %self.usda.base_url,
            usda.page_size = self.usda.page_size,
            retry.max_attempts = self.retry.max_attempts,
            cache.capacity = self.cache.memory_capacity,
            cache.database = %self.cache.database_url,
            workers = self.worker_pool_size,
            "Engine configuration loaded"
        );
    }
}

/// Read an environment variable with a default
pub(crate) fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an optional environment variable
///
/// Unset or blank yields `None`; an unparseable value is a configuration error.
pub(crate) fn env_parse<T: FromStr>(key: &str) -> AppResult<Option<T>> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::config_invalid(format!("{key} has an invalid value: {raw}"))),
        _ => Ok(None),
    }
}

/// Check a fraction lies in [0, 1]
pub(crate) fn ensure_unit_interval(name: &str, value: f64) -> AppResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AppError::config_invalid(format!(
            "{name} must be between 0 and 1 (got {value})"
        )))
    }
}
