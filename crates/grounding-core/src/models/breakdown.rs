// ABOUTME: Final attributed meal breakdown returned to callers
// ABOUTME: Per-item attribution with match status plus totals, validation, and ordered warnings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::food::SourceTier;
use super::meal::{MatchMethod, MealTotals, ValidationResult};

/// Source attribution for one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchStatus {
    /// Resolved to a database record
    Matched {
        /// Database identifier
        record_id: String,
        /// Rank class of the record
        source_tier: SourceTier,
        /// Record description
        description: String,
    },
    /// No acceptable record; macros are zero
    Unmatched,
}

/// One attributed line of the breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemBreakdown {
    /// Name as supplied by the caller
    pub raw_name: String,
    /// Canonical lookup query
    pub normalized_query: String,
    /// Attribution
    pub match_status: MatchStatus,
    /// Resolution method
    pub match_method: MatchMethod,
    /// Portion in grams
    pub grams: f64,
    /// Energy in kcal
    pub calories: f64,
    /// Protein in grams
    pub protein_g: f64,
    /// Carbohydrates in grams
    pub carbs_g: f64,
    /// Fat in grams
    pub fat_g: f64,
    /// Item match confidence
    pub confidence: f64,
}

/// Complete grounded result for a meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealBreakdown {
    /// Items in input order
    pub items: Vec<ItemBreakdown>,
    /// Meal totals
    pub totals: MealTotals,
    /// Validation outcome
    pub validation: ValidationResult,
    /// Human-readable warnings, ordered
    pub warnings: Vec<String>,
}

impl MealBreakdown {
    /// Whether the caller should treat the result as unusable
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        self.validation.blocking
    }

    /// Raw names of items that fell back to zero
    #[must_use]
    pub fn unmatched_names(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| item.match_status == MatchStatus::Unmatched)
            .map(|item| item.raw_name.as_str())
            .collect()
    }

    /// Short multi-line summary for logs and terminals
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let totals = &self.totals;
        let _ = writeln!(
            out,
            "{} kcal | P {:.1} g | C {:.1} g | F {:.1} g",
            totals.calories, totals.protein_g, totals.carbs_g, totals.fat_g
        );
        if let (Some(p), Some(c), Some(f)) = (totals.protein_pct, totals.carbs_pct, totals.fat_pct)
        {
            let _ = writeln!(out, "split: protein {p}% / carbs {c}% / fat {f}%");
        }
        let _ = writeln!(
            out,
            "grounded {}/{} items, confidence {:.2}{}",
            self.validation.grounded_items,
            self.items.len(),
            self.validation.confidence_overall,
            if self.validation.blocking {
                " (BLOCKING)"
            } else {
                ""
            }
        );
        for warning in &self.warnings {
            let _ = writeln!(out, "- {warning}");
        }
        out
    }
}
