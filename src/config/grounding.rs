// ABOUTME: Best-match selection and validation thresholds for the grounding pipeline
// ABOUTME: Similarity threshold, cooking boost, tier weights, calorie tolerance, and portion bounds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Tunable thresholds. Defaults come from `crate::constants`; the ordering
//! rules (tier priority, penalties lowering confidence) are fixed, the numbers
//! are not.

use serde::{Deserialize, Serialize};

use super::{ensure_unit_interval, env_parse};
use crate::constants::matching::{
    AMBIGUITY_MARGIN, AMBIGUOUS_PENALTY, COOKING_METHOD_BOOST, DEFAULT_MIN_SIMILARITY,
    FALLBACK_CONFIDENCE, MAX_FALLBACK_CONFIDENCE, TIER_WEIGHT_BRANDED, TIER_WEIGHT_CURATED,
    TIER_WEIGHT_STANDARD, UNCONFIRMED_PENALTY,
};
use crate::constants::validation::{
    CALORIE_TOLERANCE_PCT, CAVEAT_PENALTY, CONDIMENT_MAX_GRAMS, FAT_MAX_GRAMS, GENERAL_MAX_GRAMS,
    SPICE_MAX_GRAMS, STAPLE_CARB_MAX_GRAMS, WARNING_PENALTY,
};
use crate::errors::{AppError, AppResult};
use crate::models::SourceTier;

/// Best-match selector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Minimum un-boosted similarity for a candidate to be eligible
    pub min_similarity: f64,
    /// Score bonus for a shared cooking method
    pub cooking_method_boost: f64,
    /// Runner-up score gap under which a match is flagged ambiguous
    pub ambiguity_margin: f64,
    /// Confidence multiplier for names absent from the synonym table
    pub unconfirmed_penalty: f64,
    /// Confidence multiplier for ambiguous matches
    pub ambiguous_penalty: f64,
    /// Confidence weight for curated recipe records
    pub tier_weight_curated: f64,
    /// Confidence weight for standard reference records
    pub tier_weight_standard: f64,
    /// Confidence weight for branded records
    pub tier_weight_branded: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
            cooking_method_boost: COOKING_METHOD_BOOST,
            ambiguity_margin: AMBIGUITY_MARGIN,
            unconfirmed_penalty: UNCONFIRMED_PENALTY,
            ambiguous_penalty: AMBIGUOUS_PENALTY,
            tier_weight_curated: TIER_WEIGHT_CURATED,
            tier_weight_standard: TIER_WEIGHT_STANDARD,
            tier_weight_branded: TIER_WEIGHT_BRANDED,
        }
    }
}

impl SelectorConfig {
    /// Load with `MATCH_MIN_SIMILARITY` override
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the variable does not parse
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();
        if let Some(min_similarity) = env_parse("MATCH_MIN_SIMILARITY")? {
            config.min_similarity = min_similarity;
        }
        Ok(config)
    }

    /// Confidence weight for a source tier
    #[must_use]
    pub const fn tier_weight(&self, tier: SourceTier) -> f64 {
        match tier {
            SourceTier::CuratedRecipe => self.tier_weight_curated,
            SourceTier::StandardReference => self.tier_weight_standard,
            SourceTier::Branded => self.tier_weight_branded,
        }
    }

    /// Validate thresholds
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` when a value lies outside [0, 1]
    pub fn validate(&self) -> AppResult<()> {
        ensure_unit_interval("MATCH_MIN_SIMILARITY", self.min_similarity)?;
        ensure_unit_interval("cooking_method_boost", self.cooking_method_boost)?;
        ensure_unit_interval("ambiguity_margin", self.ambiguity_margin)?;
        ensure_unit_interval("unconfirmed_penalty", self.unconfirmed_penalty)?;
        ensure_unit_interval("ambiguous_penalty", self.ambiguous_penalty)?;
        ensure_unit_interval("tier_weight_curated", self.tier_weight_curated)?;
        ensure_unit_interval("tier_weight_standard", self.tier_weight_standard)?;
        ensure_unit_interval("tier_weight_branded", self.tier_weight_branded)
    }
}

/// Category-specific per-item gram cap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortionBound {
    /// Category label used in warnings
    pub category: String,
    /// Phrases that place an ingredient in the category (matched on whole tokens)
    pub keywords: Vec<String>,
    /// Upper bound in grams
    pub max_grams: f64,
}

impl PortionBound {
    fn new(category: &str, keywords: &[&str], max_grams: f64) -> Self {
        Self {
            category: category.to_owned(),
            keywords: keywords.iter().map(|&k| k.to_owned()).collect(),
            max_grams,
        }
    }

    /// Built-in bounds: fats, spices, condiments, staple carbohydrates
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(
                "fat",
                &["oil", "butter", "ghee", "lard", "margarine", "shortening"],
                FAT_MAX_GRAMS,
            ),
            Self::new(
                "spice",
                &[
                    "black pepper",
                    "cumin",
                    "turmeric",
                    "paprika",
                    "oregano",
                    "basil",
                    "thyme",
                    "rosemary",
                    "garlic powder",
                    "onion powder",
                    "chili powder",
                    "curry powder",
                    "garam masala",
                    "cayenne",
                    "cinnamon",
                    "nutmeg",
                ],
                SPICE_MAX_GRAMS,
            ),
            Self::new(
                "condiment",
                &[
                    "salt",
                    "soy sauce",
                    "vinegar",
                    "lemon juice",
                    "lime juice",
                    "ketchup",
                    "mustard",
                ],
                CONDIMENT_MAX_GRAMS,
            ),
            Self::new(
                "carb base",
                &[
                    "rice", "pasta", "bread", "quinoa", "oats", "noodles", "couscous", "barley",
                ],
                STAPLE_CARB_MAX_GRAMS,
            ),
        ]
    }
}

/// Validator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Allowed 4/4/9 deviation in percent
    pub calorie_tolerance_pct: f64,
    /// Category bounds, checked in order; first match wins
    pub portion_bounds: Vec<PortionBound>,
    /// Bound applied to every ingredient
    pub general_max_grams: f64,
    /// Confidence penalty per validation warning
    pub warning_penalty: f64,
    /// Confidence penalty per extraction caveat
    pub caveat_penalty: f64,
    /// Confidence for `fallback_zero` items
    pub fallback_confidence: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            calorie_tolerance_pct: CALORIE_TOLERANCE_PCT,
            portion_bounds: PortionBound::defaults(),
            general_max_grams: GENERAL_MAX_GRAMS,
            warning_penalty: WARNING_PENALTY,
            caveat_penalty: CAVEAT_PENALTY,
            fallback_confidence: FALLBACK_CONFIDENCE,
        }
    }
}

impl ValidationConfig {
    /// Load with `CALORIE_TOLERANCE_PCT` override
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the variable does not parse
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();
        if let Some(tolerance) = env_parse("CALORIE_TOLERANCE_PCT")? {
            config.calorie_tolerance_pct = tolerance;
        }
        Ok(config)
    }

    /// Validate thresholds and bounds
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` for negative tolerances, non-positive bounds,
    /// or a fallback confidence above the cap
    pub fn validate(&self) -> AppResult<()> {
        if !(self.calorie_tolerance_pct.is_finite() && self.calorie_tolerance_pct >= 0.0) {
            return Err(AppError::config_invalid(format!(
                "CALORIE_TOLERANCE_PCT must be a non-negative number (got {})",
                self.calorie_tolerance_pct
            )));
        }
        if self.general_max_grams <= 0.0 {
            return Err(AppError::config_invalid(
                "general_max_grams must be positive",
            ));
        }
        if let Some(bound) = self.portion_bounds.iter().find(|b| b.max_grams <= 0.0) {
            return Err(AppError::config_invalid(format!(
                "portion bound for '{}' must be positive",
                bound.category
            )));
        }
        ensure_unit_interval("warning_penalty", self.warning_penalty)?;
        ensure_unit_interval("caveat_penalty", self.caveat_penalty)?;
        ensure_unit_interval("fallback_confidence", self.fallback_confidence)?;
        if self.fallback_confidence > MAX_FALLBACK_CONFIDENCE {
            return Err(AppError::config_invalid(format!(
                "fallback_confidence must not exceed {MAX_FALLBACK_CONFIDENCE}"
            )));
        }
        Ok(())
    }
}
