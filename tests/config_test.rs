// ABOUTME: Environment-driven configuration tests for the grounding engine
// ABOUTME: Missing credentials, invalid values, worker bounds, and LOOKUP_* overrides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;
use std::time::Duration;

use anyhow::Result;
use serial_test::serial;

use nutrition_grounding::config::EngineConfig;
use nutrition_grounding::errors::ErrorCode;

const VARS: &[&str] = &[
    "USDA_API_KEY",
    "USDA_BASE_URL",
    "USDA_PAGE_SIZE",
    "USDA_TIMEOUT_SECS",
    "LOOKUP_MAX_ATTEMPTS",
    "LOOKUP_BASE_DELAY_MS",
    "LOOKUP_BACKOFF_MULTIPLIER",
    "LOOKUP_RATE_LIMIT_DELAY_MS",
    "LOOKUP_MAX_DELAY_MS",
    "FOOD_CACHE_DATABASE_URL",
    "FOOD_CACHE_CAPACITY",
    "FOOD_CACHE_SHARDS",
    "FOOD_CACHE_TTL_SECS",
    "MATCH_MIN_SIMILARITY",
    "CALORIE_TOLERANCE_PCT",
    "GROUNDING_WORKERS",
];

fn reset_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_missing_api_key_is_config_missing() {
    reset_env();

    let error = EngineConfig::from_env().unwrap_err();

    assert_eq!(error.code, ErrorCode::ConfigMissing);
    assert!(error.message.contains("USDA_API_KEY"));
}

#[test]
#[serial]
fn test_blank_api_key_is_config_missing() {
    reset_env();
    env::set_var("USDA_API_KEY", "   ");

    let error = EngineConfig::from_env().unwrap_err();

    assert_eq!(error.code, ErrorCode::ConfigMissing);
    reset_env();
}

#[test]
#[serial]
fn test_defaults_validate() -> Result<()> {
    reset_env();
    env::set_var("USDA_API_KEY", "test-key");
    env::set_var("FOOD_CACHE_DATABASE_URL", "");

    let config = EngineConfig::from_env()?;

    assert_eq!(config.usda.api_key, "test-key");
    assert!(config.worker_pool_size >= 1);
    assert!(!config.cache.has_persistent_tier());
    assert!((config.selector.min_similarity - 0.5).abs() < f64::EPSILON);
    reset_env();
    Ok(())
}

#[test]
#[serial]
fn test_unparseable_number_is_config_invalid() {
    reset_env();
    env::set_var("USDA_API_KEY", "test-key");
    env::set_var("LOOKUP_MAX_ATTEMPTS", "three");

    let error = EngineConfig::from_env().unwrap_err();

    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    assert!(error.message.contains("LOOKUP_MAX_ATTEMPTS"));
    reset_env();
}

#[test]
#[serial]
fn test_zero_workers_rejected() {
    reset_env();
    env::set_var("USDA_API_KEY", "test-key");
    env::set_var("GROUNDING_WORKERS", "0");

    let error = EngineConfig::from_env().unwrap_err();

    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    reset_env();
}

#[test]
#[serial]
fn test_similarity_outside_unit_interval_rejected() {
    reset_env();
    env::set_var("USDA_API_KEY", "test-key");
    env::set_var("MATCH_MIN_SIMILARITY", "1.5");

    let error = EngineConfig::from_env().unwrap_err();

    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    reset_env();
}

#[test]
#[serial]
fn test_lookup_overrides_apply() -> Result<()> {
    reset_env();
    env::set_var("USDA_API_KEY", "test-key");
    env::set_var("FOOD_CACHE_DATABASE_URL", "");
    env::set_var("LOOKUP_MAX_ATTEMPTS", "5");
    env::set_var("LOOKUP_BASE_DELAY_MS", "250");
    env::set_var("LOOKUP_RATE_LIMIT_DELAY_MS", "4000");
    env::set_var("GROUNDING_WORKERS", "8");
    env::set_var("CALORIE_TOLERANCE_PCT", "15");

    let config = EngineConfig::from_env()?;

    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.retry.base_delay, Duration::from_millis(250));
    assert_eq!(config.retry.rate_limit_delay, Duration::from_secs(4));
    assert_eq!(config.worker_pool_size, 8);
    assert!((config.validation.calorie_tolerance_pct - 15.0).abs() < f64::EPSILON);
    reset_env();
    Ok(())
}
