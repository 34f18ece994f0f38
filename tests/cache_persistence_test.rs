// ABOUTME: Tests for the two-tier lookup cache with an on-disk SQLite persistent tier
// ABOUTME: Durability across restarts, promotion, TTL expiry, last-write-wins, and administration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tempfile::TempDir;

use common::{record, test_config, ScriptedSource};
use nutrition_grounding::cache::{CacheConfig, CacheTier, FoodCache};
use nutrition_grounding::engine::GroundingEngine;
use nutrition_grounding::models::{FoodRecord, RawIngredient, SourceTier};

fn disk_config(dir: &TempDir) -> CacheConfig {
    CacheConfig {
        database_url: format!("sqlite:{}", dir.path().join("cache/food_cache.db").display()),
        ..CacheConfig::default()
    }
}

fn oats() -> Vec<FoodRecord> {
    vec![record("o-1", SourceTier::StandardReference, "Oats", 389.0, 16.9, 66.3, 6.9)]
}

#[tokio::test]
async fn test_entries_survive_restart_and_promote() -> Result<()> {
    let dir = TempDir::new()?;
    let config = disk_config(&dir);

    {
        let cache = FoodCache::from_config(&config).await?;
        cache.put("oats", oats()).await;
    }

    let reopened = FoodCache::from_config(&config).await?;
    let first = reopened.get("oats").await.unwrap();
    assert_eq!(first.tier, CacheTier::Persistent);
    assert_eq!(first.records, oats());

    let second = reopened.get("oats").await.unwrap();
    assert_eq!(second.tier, CacheTier::Memory);

    let stats = reopened.stats().await?;
    assert_eq!(stats.persistent_entries, Some(1));
    assert_eq!(stats.persistent_hits, 1);
    assert_eq!(stats.memory_hits, 1);
    Ok(())
}

#[tokio::test]
async fn test_last_write_wins() -> Result<()> {
    let dir = TempDir::new()?;
    let config = disk_config(&dir);
    let cache = FoodCache::from_config(&config).await?;

    cache.put("oats", oats()).await;
    let replacement =
        vec![record("o-2", SourceTier::CuratedRecipe, "Oatmeal, cooked", 71.0, 2.5, 12.0, 1.5)];
    cache.put("oats", replacement.clone()).await;

    let reopened = FoodCache::from_config(&config).await?;
    assert_eq!(reopened.get("oats").await.unwrap().records, replacement);
    assert_eq!(reopened.stats().await?.persistent_entries, Some(1));
    Ok(())
}

#[tokio::test]
async fn test_expired_entries_miss_and_purge() -> Result<()> {
    let dir = TempDir::new()?;
    let config = CacheConfig {
        ttl: Duration::ZERO,
        ..disk_config(&dir)
    };
    let cache = FoodCache::from_config(&config).await?;

    cache.put("oats", oats()).await;
    assert!(cache.get("oats").await.is_none());

    assert_eq!(cache.purge_expired().await?, 1);
    assert_eq!(cache.stats().await?.persistent_entries, Some(0));
    Ok(())
}

#[tokio::test]
async fn test_clear_empties_both_tiers() -> Result<()> {
    let dir = TempDir::new()?;
    let cache = FoodCache::from_config(&disk_config(&dir)).await?;

    cache.put("oats", oats()).await;
    cache.put("zorblax", Vec::new()).await;

    // two rows in each tier
    assert_eq!(cache.clear().await?, 4);
    let stats = cache.stats().await?;
    assert_eq!(stats.memory_entries, 0);
    assert_eq!(stats.persistent_entries, Some(0));
    Ok(())
}

#[tokio::test]
async fn test_engine_restart_skips_remote_call() -> Result<()> {
    let dir = TempDir::new()?;
    let mut config = test_config();
    config.cache = disk_config(&dir);

    let first_source = Arc::new(ScriptedSource::new().with_records("oats", oats()));
    let cache = Arc::new(FoodCache::from_config(&config.cache).await?);
    let engine = GroundingEngine::new(first_source.clone(), cache, config.clone())?;
    engine.analyze(&[RawIngredient::new("oats", 40.0)]).await?;
    assert_eq!(first_source.calls_for("oats"), 1);

    let second_source = Arc::new(ScriptedSource::new());
    let restarted = GroundingEngine::new(
        second_source.clone(),
        Arc::new(FoodCache::from_config(&config.cache).await?),
        config,
    )?;
    let breakdown = restarted.analyze(&[RawIngredient::new("Oats", 40.0)]).await?;

    assert_eq!(second_source.total_calls(), 0);
    assert_eq!(breakdown.validation.grounded_items, 1);
    Ok(())
}
