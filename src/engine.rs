// ABOUTME: Grounding engine running the per-ingredient pipeline through a bounded worker pool
// ABOUTME: Input-ordered results, per-ingredient failure containment, and caller-driven cancellation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Grounding Engine
//!
//! Each request gets its own pool of at most `worker_pool_size` concurrent
//! ingredient lookups. Results land in a slot indexed by input position, so
//! output order never depends on completion order. A failed or unmatched
//! ingredient becomes a `fallback_zero` item with a warning; only an invalid
//! portion rejects the batch.

use std::future::Future;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::cache::FoodCache;
use crate::config::EngineConfig;
use crate::errors::{AppError, AppResult};
use crate::external::{FoodDataSource, FoodDatabaseClient, UsdaClient};
use crate::grounding::{
    aggregate, build, grounded_item, normalize, scale, select, validate, NormalizedQuery,
};
use crate::models::{GroundedItem, MealBreakdown, RawIngredient};

/// One ingredient after normalization, lookup, and selection
struct GroundedSlot {
    item: GroundedItem,
    warnings: Vec<String>,
}

/// Meal grounding engine
pub struct GroundingEngine {
    client: FoodDatabaseClient,
    config: EngineConfig,
}

impl GroundingEngine {
    /// Engine over an injected lookup source
    ///
    /// The USDA credential is not required here; tests and offline runs
    /// supply their own source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the pipeline settings do not validate
    pub fn new(
        source: Arc<dyn FoodDataSource>,
        cache: Arc<FoodCache>,
        config: EngineConfig,
    ) -> AppResult<Self> {
        config.validate_pipeline()?;
        let client = FoodDatabaseClient::new(
            source,
            cache,
            config.retry.clone(),
            config.usda.request_timeout(),
        );
        Ok(Self { client, config })
    }

    /// Engine backed by USDA `FoodData` Central and the configured cache tiers
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` without an API key, `ConfigInvalid` for bad
    /// settings, and `StorageError` if the persistent cache cannot be opened
    pub async fn from_config(config: EngineConfig) -> AppResult<Self> {
        config.validate()?;
        let source = UsdaClient::new(config.usda.clone())?;
        let cache = FoodCache::from_config(&config.cache).await?;
        Self::new(Arc::new(source), Arc::new(cache), config)
    }

    /// Shared lookup cache
    #[must_use]
    pub const fn cache(&self) -> &Arc<FoodCache> {
        self.client.cache()
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ground a meal
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if any ingredient has `requested_grams <= 0`.
    /// Lookup failures never surface here; they degrade to fallback items.
    pub async fn analyze(&self, ingredients: &[RawIngredient]) -> AppResult<MealBreakdown> {
        for ingredient in ingredients {
            ingredient.validate()?;
        }

        let meal_id = Uuid::new_v4();
        let span = info_span!("meal", meal_id = %meal_id, items = ingredients.len());
        self.run(ingredients).instrument(span).await
    }

    /// Ground a meal unless `cancel` resolves first
    ///
    /// In-flight lookups are dropped, not awaited, when the caller gives up.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if `cancel` completes before the meal does, plus
    /// everything [`Self::analyze`] returns
    pub async fn analyze_until<F>(
        &self,
        ingredients: &[RawIngredient],
        cancel: F,
    ) -> AppResult<MealBreakdown>
    where
        F: Future<Output = ()> + Send,
    {
        tokio::select! {
            biased;
            () = cancel => {
                warn!(items = ingredients.len(), "Meal grounding cancelled by caller");
                Err(AppError::cancelled("meal grounding cancelled"))
            }
            result = self.analyze(ingredients) => result,
        }
    }

    async fn run(&self, ingredients: &[RawIngredient]) -> AppResult<MealBreakdown> {
        let mut slots: Vec<Option<GroundedSlot>> = ingredients.iter().map(|_| None).collect();

        let mut completed = stream::iter(ingredients.iter().enumerate())
            .map(|(index, ingredient)| async move {
                let query = normalize(&ingredient.name);
                let span = info_span!(
                    "ingredient",
                    index,
                    raw_name = %ingredient.name,
                    query = %query.query,
                );
                let slot = self.ground(ingredient, query).instrument(span).await;
                (index, slot)
            })
            .buffer_unordered(self.config.worker_pool_size);

        while let Some((index, slot)) = completed.next().await {
            if let Some(target) = slots.get_mut(index) {
                *target = Some(slot);
            }
        }

        let mut grounded = Vec::with_capacity(ingredients.len());
        let mut grounding_warnings = Vec::new();
        for (ingredient, slot) in ingredients.iter().zip(slots) {
            let slot = slot.ok_or_else(|| {
                AppError::internal(format!("no result produced for '{}'", ingredient.name))
            })?;
            grounded.push(slot.item);
            grounding_warnings.extend(slot.warnings);
        }

        let scaled = grounded
            .iter()
            .zip(ingredients)
            .enumerate()
            .map(|(index, (item, ingredient))| {
                scale(index, &item.per100g, ingredient.requested_grams)
            })
            .collect::<AppResult<Vec<_>>>()?;

        let aggregate = aggregate(&scaled);
        let validation = validate(
            &grounded,
            &scaled,
            &aggregate,
            &self.config.selector,
            &self.config.validation,
        );
        let breakdown = build(&grounded, &scaled, aggregate, validation, grounding_warnings);

        info!(
            calories = breakdown.totals.calories,
            grounded = breakdown.validation.grounded_items,
            fallback = breakdown.validation.fallback_items,
            confidence = breakdown.validation.confidence_overall,
            warnings = breakdown.warnings.len(),
            blocking = breakdown.validation.blocking,
            "Meal grounded"
        );
        Ok(breakdown)
    }

    /// Normalize, look up, and select for one ingredient; never fails
    async fn ground(&self, ingredient: &RawIngredient, query: NormalizedQuery) -> GroundedSlot {
        let fallback_confidence = self.config.validation.fallback_confidence;
        let fallback = |warning: String| GroundedSlot {
            item: GroundedItem::fallback(
                &ingredient.name,
                &query.query,
                !query.confirmed,
                fallback_confidence,
            ),
            warnings: vec![warning],
        };

        if query.is_empty() {
            warn!("Ingredient name is empty after normalization");
            return fallback(format!(
                "no match found for '{}' (name is empty after normalization)",
                ingredient.name
            ));
        }

        let candidates = match self.client.lookup(&query.query).await {
            Ok(candidates) => candidates,
            Err(error) => {
                warn!(error = %error, "Lookup failed, using zero fallback");
                return fallback(format!(
                    "lookup failed for '{}' ({error}); macros set to zero",
                    ingredient.name
                ));
            }
        };

        match select(&query, &candidates, &self.config.selector) {
            Ok(selection) => {
                let mut warnings = Vec::new();
                if let Some(runner_up) = &selection.runner_up {
                    warnings.push(format!(
                        "'{}' is ambiguous: matched '{}' over '{}'",
                        ingredient.name,
                        selection.best.record.description,
                        runner_up.record.description
                    ));
                }
                let item = grounded_item(
                    &ingredient.name,
                    &query,
                    selection,
                    &self.config.selector,
                    self.config.validation.caveat_penalty,
                );
                debug!(
                    record_id = item.matched_record_id.as_deref().unwrap_or_default(),
                    method = ?item.match_method,
                    confidence = item.confidence,
                    "Ingredient matched"
                );
                GroundedSlot { item, warnings }
            }
            Err(reason) => {
                warn!(reason = %reason, candidates = candidates.len(), "No acceptable match");
                fallback(format!("no match found for '{}' ({reason})", ingredient.name))
            }
        }
    }
}
