// ABOUTME: Per-request meal models from raw ingredient through validation result
// ABOUTME: RawIngredient, GroundedItem, ScaledItem, MealTotals, and ValidationResult definitions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use serde::{Deserialize, Serialize};

use super::food::{MacroProfile, SourceTier};
use crate::errors::{AppError, AppResult};

/// One ingredient guess produced by the upstream estimation stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIngredient {
    /// Freeform ingredient name
    pub name: String,
    /// Requested portion in grams; must be > 0
    #[serde(alias = "grams")]
    pub requested_grams: f64,
    /// Optional free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RawIngredient {
    /// Create an ingredient without notes
    #[must_use]
    pub fn new(name: impl Into<String>, requested_grams: f64) -> Self {
        Self {
            name: name.into(),
            requested_grams,
            notes: None,
        }
    }

    /// Check the portion is a positive finite gram amount
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when `requested_grams` is zero, negative, or not finite
    pub fn validate(&self) -> AppResult<()> {
        if self.requested_grams.is_finite() && self.requested_grams > 0.0 {
            return Ok(());
        }
        Err(AppError::invalid_input(format!(
            "requested_grams must be greater than 0 (got {})",
            self.requested_grams
        ))
        .with_ingredient(self.name.clone()))
    }
}

/// How an ingredient was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Query equals the record description token-for-token
    Exact,
    /// Query was rewritten through the synonym table
    Synonym,
    /// Partial token overlap
    Fuzzy,
    /// No acceptable match; zero macros
    FallbackZero,
}

impl MatchMethod {
    /// Whether this item carries real nutrition data
    #[must_use]
    pub const fn is_matched(self) -> bool {
        !matches!(self, Self::FallbackZero)
    }
}

/// Macro field identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroField {
    /// Energy
    Calories,
    /// Protein
    Protein,
    /// Carbohydrates
    Carbs,
    /// Fat
    Fat,
}

impl fmt::Display for MacroField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Calories => "calories",
            Self::Protein => "protein",
            Self::Carbs => "carbs",
            Self::Fat => "fat",
        })
    }
}

/// Note recorded while converting a record to per-100g macros
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionCaveat {
    /// Field absent from the record; defaulted to zero
    MissingField {
        /// Which field
        field: MacroField,
    },
    /// Energy absent; derived from macros with 4/4/9
    CaloriesDerived,
    /// Record reported per serving; rescaled to 100 g
    ConvertedFromServing {
        /// Serving weight in grams
        serving_grams: f64,
    },
}

impl ExtractionCaveat {
    /// Whether this caveat should reduce item confidence
    #[must_use]
    pub const fn lowers_confidence(&self) -> bool {
        !matches!(self, Self::ConvertedFromServing { .. })
    }
}

impl fmt::Display for ExtractionCaveat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "{field} missing from record, assumed 0"),
            Self::CaloriesDerived => f.write_str("calories derived from macros (4/4/9)"),
            Self::ConvertedFromServing { serving_grams } => {
                write!(f, "converted from a {serving_grams} g serving")
            }
        }
    }
}

/// An ingredient resolved to a record, or an explicit zero fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundedItem {
    /// Name as supplied by the caller
    pub raw_name: String,
    /// Canonical lookup query
    pub normalized_query: String,
    /// Selected record id
    pub matched_record_id: Option<String>,
    /// Selected record tier
    pub source_tier: Option<SourceTier>,
    /// Selected record description
    pub matched_description: Option<String>,
    /// Resolution method
    pub match_method: MatchMethod,
    /// Token-overlap similarity of the selected record
    pub similarity: f64,
    /// Item match confidence in [0, 1]
    pub confidence: f64,
    /// Canonical per-100g macros
    pub per100g: MacroProfile,
    /// Extraction notes
    pub caveats: Vec<ExtractionCaveat>,
    /// Runner-up scored too close to call
    pub ambiguous: bool,
    /// Name was not found in the synonym table
    pub unconfirmed: bool,
}

impl GroundedItem {
    /// Build a `fallback_zero` item
    #[must_use]
    pub fn fallback(
        raw_name: impl Into<String>,
        normalized_query: impl Into<String>,
        unconfirmed: bool,
        confidence: f64,
    ) -> Self {
        Self {
            raw_name: raw_name.into(),
            normalized_query: normalized_query.into(),
            matched_record_id: None,
            source_tier: None,
            matched_description: None,
            match_method: MatchMethod::FallbackZero,
            similarity: 0.0,
            confidence,
            per100g: MacroProfile::zero(),
            caveats: Vec::new(),
            ambiguous: false,
            unconfirmed,
        }
    }

    /// Whether the item was matched to a record
    #[must_use]
    pub const fn is_matched(&self) -> bool {
        self.match_method.is_matched()
    }
}

/// Macros scaled to the requested portion
///
/// Public macro fields are rounded to one decimal; `exact` keeps the
/// unrounded values for aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledItem {
    /// Index of the grounded item in input order
    pub grounded_item_ref: usize,
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
    #[serde(skip)]
    exact: MacroProfile,
}

impl ScaledItem {
    /// Build from unrounded scaled macros
    #[must_use]
    pub fn from_exact(grounded_item_ref: usize, grams: f64, exact: MacroProfile) -> Self {
        let display = exact.rounded();
        Self {
            grounded_item_ref,
            grams,
            calories: display.calories,
            protein_g: display.protein_g,
            carbs_g: display.carbs_g,
            fat_g: display.fat_g,
            exact,
        }
    }

    /// Unrounded macros
    #[must_use]
    pub const fn exact(&self) -> &MacroProfile {
        &self.exact
    }

    /// Rounded macros
    #[must_use]
    pub const fn display(&self) -> MacroProfile {
        MacroProfile::new(self.calories, self.protein_g, self.carbs_g, self.fat_g)
    }
}

/// Meal-level sums and calorie-share percentages (0-100 scale)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealTotals {
    /// Energy in kcal
    pub calories: f64,
    /// Protein in grams
    pub protein_g: f64,
    /// Carbohydrates in grams
    pub carbs_g: f64,
    /// Fat in grams
    pub fat_g: f64,
    /// Share of calories from protein; null when calories are 0
    pub protein_pct: Option<f64>,
    /// Share of calories from carbohydrates; null when calories are 0
    pub carbs_pct: Option<f64>,
    /// Share of calories from fat; null when calories are 0
    pub fat_pct: Option<f64>,
}

/// Outcome of the consistency and plausibility checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Deviation of reported from 4/4/9-expected meal calories, in percent
    pub calorie_consistency_delta_pct: f64,
    /// 4/4/9-expected meal calories
    pub expected_calories: f64,
    /// Reported meal calories
    pub reported_calories: f64,
    /// Portion plausibility warnings, in input order
    pub portion_warnings: Vec<String>,
    /// Calorie consistency warnings, items first then meal
    pub consistency_warnings: Vec<String>,
    /// Overall confidence in [0, 1]
    pub confidence_overall: f64,
    /// No item matched; result unusable
    pub blocking: bool,
    /// Items matched to a record
    pub grounded_items: usize,
    /// Items that fell back to zero
    pub fallback_items: usize,
}

impl ValidationResult {
    /// Total number of validation warnings
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.portion_warnings.len() + self.consistency_warnings.len()
    }
}
