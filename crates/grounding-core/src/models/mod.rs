// ABOUTME: Data model for the grounding pipeline from raw ingredient to meal breakdown
// ABOUTME: Re-exports food records, grounded and scaled items, totals, validation, and breakdowns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Per-request values (`RawIngredient`, `GroundedItem`, `ScaledItem`) are
//! created fresh for each meal and dropped once the `MealBreakdown` is
//! returned. `FoodRecord` is the only type that outlives a request, inside
//! the lookup cache.
//!
//! ## Core Models
//!
//! - `FoodRecord`: a candidate from the food-composition database
//! - `GroundedItem`: an ingredient resolved to a record, or an explicit fallback
//! - `ScaledItem`: per-100g macros scaled to the requested grams
//! - `MealTotals` / `ValidationResult`: meal-level aggregation and checks
//! - `MealBreakdown`: the attributed output structure

mod breakdown;
mod food;
mod meal;

pub use breakdown::{ItemBreakdown, MatchStatus, MealBreakdown};
pub use food::{FoodRecord, MacroProfile, NutrientBasis, NutrientPanel, SourceTier};
pub use meal::{
    ExtractionCaveat, GroundedItem, MacroField, MatchMethod, MealTotals, RawIngredient,
    ScaledItem, ValidationResult,
};

/// Round a value to one decimal place
#[must_use]
pub fn round_to_1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
