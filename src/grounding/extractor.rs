// ABOUTME: Macro extractor converting a food record's native panel into per-100g macros
// ABOUTME: Defaults missing fields to zero with caveats, derives absent energy, rescales servings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use thiserror::Error;

use crate::constants::energy::REFERENCE_GRAMS;
use crate::models::{
    ExtractionCaveat, FoodRecord, MacroField, MacroProfile, NutrientBasis, NutrientPanel,
};

/// Canonical per-100g macros plus notes on how they were obtained
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedMacros {
    /// Per-100g profile, every field finite and non-negative
    pub per100g: MacroProfile,
    /// Defaults and conversions applied
    pub caveats: Vec<ExtractionCaveat>,
}

impl ExtractedMacros {
    /// Caveats that reduce item confidence
    #[must_use]
    pub fn confidence_caveats(&self) -> usize {
        self.caveats
            .iter()
            .filter(|caveat| caveat.lowers_confidence())
            .count()
    }
}

/// A record that cannot serve as a candidate
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedRecord {
    /// A field is negative, NaN, or infinite
    #[error("{field} value {value} is not a non-negative number")]
    InvalidValue {
        /// Offending field
        field: MacroField,
        /// Reported value
        value: f64,
    },
    /// Per-serving record without a usable serving weight
    #[error("serving weight {grams} g is not positive")]
    InvalidServing {
        /// Reported serving weight
        grams: f64,
    },
    /// No macro field at all
    #[error("record reports no nutrient values")]
    NoNutrients,
}

fn check(field: MacroField, value: Option<f64>) -> Result<Option<f64>, MalformedRecord> {
    match value {
        Some(v) if !(v.is_finite() && v >= 0.0) => {
            Err(MalformedRecord::InvalidValue { field, value: v })
        }
        other => Ok(other),
    }
}

fn or_missing(field: MacroField, value: Option<f64>, caveats: &mut Vec<ExtractionCaveat>) -> f64 {
    value.unwrap_or_else(|| {
        caveats.push(ExtractionCaveat::MissingField { field });
        0.0
    })
}

/// Convert a record's native nutrients to the canonical per-100g shape
///
/// # Errors
///
/// Returns `MalformedRecord` when the record has no nutrients, a negative or
/// non-finite value, or a per-serving basis without a positive weight. The
/// selector skips such records.
pub fn extract(record: &FoodRecord) -> Result<ExtractedMacros, MalformedRecord> {
    let NutrientPanel {
        calories,
        protein_g,
        carbs_g,
        fat_g,
    } = record.nutrients;
    if record.nutrients.is_empty() {
        return Err(MalformedRecord::NoNutrients);
    }

    let calories = check(MacroField::Calories, calories)?;
    let protein_g = check(MacroField::Protein, protein_g)?;
    let carbs_g = check(MacroField::Carbs, carbs_g)?;
    let fat_g = check(MacroField::Fat, fat_g)?;

    let mut caveats = Vec::new();
    let protein_g = or_missing(MacroField::Protein, protein_g, &mut caveats);
    let carbs_g = or_missing(MacroField::Carbs, carbs_g, &mut caveats);
    let fat_g = or_missing(MacroField::Fat, fat_g, &mut caveats);

    let mut native = MacroProfile::new(0.0, protein_g, carbs_g, fat_g);
    native.calories = calories.unwrap_or_else(|| {
        caveats.push(ExtractionCaveat::CaloriesDerived);
        native.expected_calories()
    });

    let per100g = match record.basis {
        NutrientBasis::Per100g => native,
        NutrientBasis::PerServing { grams } => {
            if !(grams.is_finite() && grams > 0.0) {
                return Err(MalformedRecord::InvalidServing { grams });
            }
            caveats.push(ExtractionCaveat::ConvertedFromServing {
                serving_grams: grams,
            });
            native.scaled(REFERENCE_GRAMS / grams)
        }
    };

    Ok(ExtractedMacros { per100g, caveats })
}
