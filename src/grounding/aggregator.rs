// ABOUTME: Totals aggregator summing unrounded scaled macros into meal totals
// ABOUTME: Computes calorie-share percentages, null with a warning when the meal has no calories
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::energy::{KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};
use crate::models::{round_to_1, MacroProfile, MealTotals, ScaledItem};

/// Warning emitted when percentages cannot be computed
pub const ZERO_CALORIES_WARNING: &str = "total calories are zero; macro percentages unavailable";

/// Meal totals plus the unrounded sums the validator works from
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// Rounded totals with percentages
    pub totals: MealTotals,
    /// Unrounded sums
    pub exact: MacroProfile,
    /// Set when every item had zero calories
    pub warning: Option<String>,
}

fn share(kcal_per_g: f64, grams: f64, calories: f64) -> f64 {
    round_to_1(kcal_per_g * grams / calories * 100.0)
}

/// Sum scaled items and compute the percentage breakdown
#[must_use]
pub fn aggregate(items: &[ScaledItem]) -> Aggregate {
    let exact = items
        .iter()
        .fold(MacroProfile::zero(), |sum, item| sum + *item.exact());
    let rounded = exact.rounded();

    let (protein_pct, carbs_pct, fat_pct, warning) = if exact.calories > f64::EPSILON {
        (
            Some(share(KCAL_PER_G_PROTEIN, exact.protein_g, exact.calories)),
            Some(share(KCAL_PER_G_CARBS, exact.carbs_g, exact.calories)),
            Some(share(KCAL_PER_G_FAT, exact.fat_g, exact.calories)),
            None,
        )
    } else {
        (None, None, None, Some(ZERO_CALORIES_WARNING.to_owned()))
    };

    Aggregate {
        totals: MealTotals {
            calories: rounded.calories,
            protein_g: rounded.protein_g,
            carbs_g: rounded.carbs_g,
            fat_g: rounded.fat_g,
            protein_pct,
            carbs_pct,
            fat_pct,
        },
        exact,
        warning,
    }
}
