// ABOUTME: Data model for the grounding pipeline, re-exported from grounding-core
// ABOUTME: Ingredients, food records, grounded/scaled items, totals, validation, and breakdowns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use grounding_core::models::{
    round_to_1, ExtractionCaveat, FoodRecord, GroundedItem, ItemBreakdown, MacroField,
    MacroProfile, MatchMethod, MatchStatus, MealBreakdown, MealTotals, NutrientBasis,
    NutrientPanel, RawIngredient, ScaledItem, SourceTier, ValidationResult,
};
