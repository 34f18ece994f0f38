// ABOUTME: Breakdown builder composing grounded, scaled, and validated data into the output structure
// ABOUTME: Pure composition with source attribution per item and a single ordered warning list
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::aggregator::Aggregate;
use crate::models::{
    GroundedItem, ItemBreakdown, MatchStatus, MealBreakdown, ScaledItem, ValidationResult,
};

fn match_status(item: &GroundedItem) -> MatchStatus {
    match (&item.matched_record_id, item.source_tier) {
        (Some(record_id), Some(source_tier)) if item.is_matched() => MatchStatus::Matched {
            record_id: record_id.clone(),
            source_tier,
            description: item.matched_description.clone().unwrap_or_default(),
        },
        _ => MatchStatus::Unmatched,
    }
}

/// Assemble the final breakdown
///
/// Warnings are ordered: per-item grounding warnings (input order), the
/// aggregation warning, consistency warnings, then portion warnings.
#[must_use]
pub fn build(
    grounded: &[GroundedItem],
    scaled: &[ScaledItem],
    aggregate: Aggregate,
    validation: ValidationResult,
    grounding_warnings: Vec<String>,
) -> MealBreakdown {
    let items = scaled
        .iter()
        .filter_map(|scaled_item| {
            let item = grounded.get(scaled_item.grounded_item_ref)?;
            Some(ItemBreakdown {
                raw_name: item.raw_name.clone(),
                normalized_query: item.normalized_query.clone(),
                match_status: match_status(item),
                match_method: item.match_method,
                grams: scaled_item.grams,
                calories: scaled_item.calories,
                protein_g: scaled_item.protein_g,
                carbs_g: scaled_item.carbs_g,
                fat_g: scaled_item.fat_g,
                confidence: item.confidence,
            })
        })
        .collect();

    let mut warnings = grounding_warnings;
    warnings.extend(aggregate.warning);
    warnings.extend(validation.consistency_warnings.iter().cloned());
    warnings.extend(validation.portion_warnings.iter().cloned());

    MealBreakdown {
        items,
        totals: aggregate.totals,
        validation,
        warnings,
    }
}
