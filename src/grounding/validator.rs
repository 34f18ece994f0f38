// ABOUTME: Meal validator running 4/4/9 calorie consistency and portion plausibility checks
// ABOUTME: Annotates without altering values, scores overall confidence, and flags universal fallback as blocking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Validation
//!
//! Both checks are non-blocking: they append warnings and lower
//! `confidence_overall`, but reported macros are never corrected. The only
//! blocking condition is a meal where no item matched a record.

use super::aggregator::Aggregate;
use crate::config::{SelectorConfig, ValidationConfig};
use crate::models::{
    round_to_1, ExtractionCaveat, GroundedItem, MacroProfile, ScaledItem, ValidationResult,
};

/// Deviation of `reported` from `expected` calories, in percent
///
/// With no macro energy to compare against, a zero report is consistent
/// and anything else counts as a full deviation.
#[must_use]
pub fn delta_pct(reported: f64, expected: f64) -> f64 {
    if expected <= f64::EPSILON {
        return if reported.abs() <= f64::EPSILON { 0.0 } else { 100.0 };
    }
    (reported - expected).abs() / expected * 100.0
}

/// 4/4/9 check for one profile; `Some(delta)` when outside tolerance
fn inconsistency(profile: &MacroProfile, tolerance_pct: f64) -> Option<f64> {
    let delta = delta_pct(profile.calories, profile.expected_calories());
    (delta > tolerance_pct).then_some(delta)
}

fn consistency_warnings(
    grounded: &[GroundedItem],
    exact: &MacroProfile,
    config: &ValidationConfig,
) -> (f64, Vec<String>) {
    let mut warnings: Vec<String> = grounded
        .iter()
        .filter(|item| item.is_matched())
        .filter(|item| !item.caveats.contains(&ExtractionCaveat::CaloriesDerived))
        .filter_map(|item| {
            let delta = inconsistency(&item.per100g, config.calorie_tolerance_pct)?;
            Some(format!(
                "{}: reported {} kcal/100g vs {} expected from macros (4/4/9), off by {}%",
                item.raw_name,
                round_to_1(item.per100g.calories),
                round_to_1(item.per100g.expected_calories()),
                round_to_1(delta)
            ))
        })
        .collect();

    let meal_delta = round_to_1(delta_pct(exact.calories, exact.expected_calories()));
    // item warnings already explain a meal-level deviation
    if warnings.is_empty() && meal_delta > config.calorie_tolerance_pct {
        warnings.push(format!(
            "meal calories deviate {meal_delta}% from the 4/4/9 estimate"
        ));
    }
    (meal_delta, warnings)
}

fn contains_phrase(padded_query: &str, phrase: &str) -> bool {
    padded_query.contains(&format!(" {phrase} "))
}

fn portion_warnings(
    grounded: &[GroundedItem],
    scaled: &[ScaledItem],
    config: &ValidationConfig,
) -> Vec<String> {
    let mut warnings = Vec::new();
    for item in scaled {
        let Some(grounded_item) = grounded.get(item.grounded_item_ref) else {
            continue;
        };
        let padded = format!(" {} ", grounded_item.normalized_query);
        let bound = config.portion_bounds.iter().find(|bound| {
            bound
                .keywords
                .iter()
                .any(|keyword| contains_phrase(&padded, keyword))
        });

        match bound {
            Some(bound) if item.grams > bound.max_grams => warnings.push(format!(
                "{} ({}g) exceeds typical {} portion (max ~{}g)",
                grounded_item.raw_name, item.grams, bound.category, bound.max_grams
            )),
            _ if item.grams > config.general_max_grams => warnings.push(format!(
                "{} ({}g) exceeds the plausible single-ingredient portion (max ~{}g)",
                grounded_item.raw_name, item.grams, config.general_max_grams
            )),
            _ => {}
        }
    }
    warnings
}

#[allow(clippy::cast_precision_loss)] // item and warning counts are small
fn overall_confidence(
    grounded: &[GroundedItem],
    warning_count: usize,
    selector: &SelectorConfig,
    config: &ValidationConfig,
) -> f64 {
    if grounded.is_empty() {
        return 0.0;
    }
    let item_sum: f64 = grounded
        .iter()
        .map(|item| {
            item.source_tier
                .map_or(item.confidence, |tier| item.confidence * selector.tier_weight(tier))
        })
        .sum();
    let mean = item_sum / grounded.len() as f64;
    let penalty = config.warning_penalty.mul_add(-(warning_count as f64), 1.0).max(0.0);
    (mean * penalty).clamp(0.0, 1.0)
}

/// Run both checks over a meal
///
/// `scaled[i].grounded_item_ref` indexes into `grounded`.
#[must_use]
pub fn validate(
    grounded: &[GroundedItem],
    scaled: &[ScaledItem],
    aggregate: &Aggregate,
    selector: &SelectorConfig,
    config: &ValidationConfig,
) -> ValidationResult {
    let (calorie_consistency_delta_pct, consistency_warnings) =
        consistency_warnings(grounded, &aggregate.exact, config);
    let portion_warnings = portion_warnings(grounded, scaled, config);

    let grounded_items = grounded.iter().filter(|item| item.is_matched()).count();
    let warning_count = consistency_warnings.len() + portion_warnings.len();

    ValidationResult {
        calorie_consistency_delta_pct,
        expected_calories: round_to_1(aggregate.exact.expected_calories()),
        reported_calories: round_to_1(aggregate.exact.calories),
        portion_warnings,
        consistency_warnings,
        confidence_overall: overall_confidence(grounded, warning_count, selector, config),
        blocking: grounded_items == 0,
        grounded_items,
        fallback_items: grounded.len() - grounded_items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grounding::aggregator::aggregate;
    use crate::grounding::scaler::scale;
    use crate::models::{MatchMethod, SourceTier};

    fn matched(name: &str, query: &str, per100g: MacroProfile) -> GroundedItem {
        GroundedItem {
            matched_record_id: Some("1".to_owned()),
            source_tier: Some(SourceTier::CuratedRecipe),
            matched_description: Some(query.to_owned()),
            match_method: MatchMethod::Exact,
            similarity: 1.0,
            confidence: 1.0,
            per100g,
            ..GroundedItem::fallback(name, query, false, 0.0)
        }
    }

    fn run(grounded: &[GroundedItem], grams: &[f64]) -> ValidationResult {
        let scaled: Vec<_> = grounded
            .iter()
            .zip(grams)
            .enumerate()
            .map(|(i, (item, &g))| scale(i, &item.per100g, g).unwrap())
            .collect();
        validate(
            grounded,
            &scaled,
            &aggregate(&scaled),
            &SelectorConfig::default(),
            &ValidationConfig::default(),
        )
    }

    #[test]
    fn test_delta_pct() {
        assert!((delta_pct(300.0, 250.0) - 20.0).abs() < 1e-9);
        assert!(delta_pct(0.0, 0.0).abs() < f64::EPSILON);
        assert!((delta_pct(5.0, 0.0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_inconsistent_item_warned_not_corrected() {
        let item = matched("steak", "steak", MacroProfile::new(300.0, 40.0, 0.0, 10.0));
        let result = run(&[item], &[100.0]);
        assert!((result.calorie_consistency_delta_pct - 20.0).abs() < 1e-9);
        assert_eq!(result.consistency_warnings.len(), 1);
        assert!(result.consistency_warnings[0].starts_with("steak:"));
        assert!((result.reported_calories - 300.0).abs() < 1e-9);
        assert!((result.expected_calories - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_consistent_meal_has_no_warnings() {
        let item = matched("chicken", "chicken breast", MacroProfile::new(165.0, 31.0, 0.0, 3.6));
        let result = run(&[item], &[150.0]);
        assert!(result.consistency_warnings.is_empty());
        assert!(result.portion_warnings.is_empty());
        assert!(!result.blocking);
        assert!((result.confidence_overall - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_derived_calories_skip_consistency_check() {
        let mut item = matched("odd", "odd", MacroProfile::new(500.0, 10.0, 10.0, 1.0));
        item.caveats.push(ExtractionCaveat::CaloriesDerived);
        let result = run(&[item], &[100.0]);
        // the meal-level check still sees the deviation
        assert_eq!(result.consistency_warnings.len(), 1);
        assert!(result.consistency_warnings[0].starts_with("meal calories"));
    }

    #[test]
    fn test_category_portion_bound() {
        let oil = matched("Olive Oil", "oil olive", MacroProfile::new(884.0, 0.0, 0.0, 100.0));
        let result = run(&[oil], &[45.0]);
        assert_eq!(
            result.portion_warnings,
            vec!["Olive Oil (45g) exceeds typical fat portion (max ~30g)".to_owned()]
        );
        assert!(result.confidence_overall < 1.0);
    }

    #[test]
    fn test_keywords_match_whole_tokens() {
        // "rice" must not place "licorice" in the carb base category
        let candy = matched("licorice", "licorice", MacroProfile::new(375.0, 0.0, 93.75, 0.0));
        assert!(run(&[candy], &[600.0]).portion_warnings.is_empty());
    }

    #[test]
    fn test_general_bound_applies_without_category() {
        let melon = matched("watermelon", "watermelon", MacroProfile::new(30.0, 0.6, 7.5, 0.0));
        let result = run(&[melon], &[1500.0]);
        assert_eq!(result.portion_warnings.len(), 1);
        assert!(result.portion_warnings[0].contains("max ~1000g"));
    }

    #[test]
    fn test_all_fallback_is_blocking() {
        let items = [
            GroundedItem::fallback("a", "a", true, 0.1),
            GroundedItem::fallback("b", "b", true, 0.1),
        ];
        let result = run(&items, &[100.0, 100.0]);
        assert!(result.blocking);
        assert_eq!(result.fallback_items, 2);
        assert!(result.confidence_overall <= 0.15);
    }

    #[test]
    fn test_tier_weight_lowers_branded_confidence() {
        let mut branded = matched("bar", "bar", MacroProfile::new(200.0, 20.0, 20.0, 4.0));
        branded.source_tier = Some(SourceTier::Branded);
        let result = run(&[branded], &[50.0]);
        assert!((result.confidence_overall - 0.8).abs() < 1e-9);
    }
}
