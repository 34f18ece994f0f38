// ABOUTME: Food-composition records as returned by the external database
// ABOUTME: SourceTier ranking, native nutrient panels, and the canonical MacroProfile
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use super::round_to_1;
use crate::constants::energy::{KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};

/// Rank class of a nutrition record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceTier {
    /// Recipe-derived survey data (most generic)
    CuratedRecipe,
    /// Laboratory standard reference data
    StandardReference,
    /// Branded product label data
    Branded,
}

impl SourceTier {
    /// Ranking priority; higher wins
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::CuratedRecipe => 3,
            Self::StandardReference => 2,
            Self::Branded => 1,
        }
    }

    /// Map a `FoodData` Central `dataType` label to a tier
    ///
    /// Unknown labels rank lowest.
    #[must_use]
    pub fn from_usda_data_type(data_type: &str) -> Self {
        match data_type.trim().to_lowercase().as_str() {
            "survey (fndds)" | "survey" | "fndds" => Self::CuratedRecipe,
            "sr legacy" | "foundation" | "sr" => Self::StandardReference,
            _ => Self::Branded,
        }
    }
}

impl fmt::Display for SourceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::CuratedRecipe => "curated recipe",
            Self::StandardReference => "standard reference",
            Self::Branded => "branded",
        };
        f.write_str(label)
    }
}

/// Reference quantity the native nutrient values are expressed against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NutrientBasis {
    /// Values are per 100 grams
    Per100g,
    /// Values are per serving of the given weight
    PerServing {
        /// Serving weight in grams
        grams: f64,
    },
}

/// Native macro values of a record; any field may be absent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientPanel {
    /// Energy in kcal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    /// Protein in grams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_g: Option<f64>,
    /// Carbohydrates in grams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs_g: Option<f64>,
    /// Fat in grams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat_g: Option<f64>,
}

impl NutrientPanel {
    /// Panel with every field present
    #[must_use]
    pub const fn complete(calories: f64, protein_g: f64, carbs_g: f64, fat_g: f64) -> Self {
        Self {
            calories: Some(calories),
            protein_g: Some(protein_g),
            carbs_g: Some(carbs_g),
            fat_g: Some(fat_g),
        }
    }

    /// True when no field is present
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.calories.is_none()
            && self.protein_g.is_none()
            && self.carbs_g.is_none()
            && self.fat_g.is_none()
    }
}

/// A candidate record from the external food database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    /// Database identifier (e.g. FDC id)
    pub record_id: String,
    /// Rank class
    pub source_tier: SourceTier,
    /// Human-readable description
    pub description: String,
    /// Brand owner for branded records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Reference quantity of `nutrients`
    pub basis: NutrientBasis,
    /// Native nutrient values
    pub nutrients: NutrientPanel,
}

impl FoodRecord {
    /// Build a per-100g record with a complete panel
    #[must_use]
    pub fn per_100g(
        record_id: impl Into<String>,
        source_tier: SourceTier,
        description: impl Into<String>,
        macros: MacroProfile,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            source_tier,
            description: description.into(),
            brand: None,
            basis: NutrientBasis::Per100g,
            nutrients: NutrientPanel::complete(
                macros.calories,
                macros.protein_g,
                macros.carbs_g,
                macros.fat_g,
            ),
        }
    }
}

/// Canonical macro values (calories in kcal, macros in grams)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroProfile {
    /// Energy in kcal
    pub calories: f64,
    /// Protein in grams
    pub protein_g: f64,
    /// Carbohydrates in grams
    pub carbs_g: f64,
    /// Fat in grams
    pub fat_g: f64,
}

impl MacroProfile {
    /// Construct a profile
    #[must_use]
    pub const fn new(calories: f64, protein_g: f64, carbs_g: f64, fat_g: f64) -> Self {
        Self {
            calories,
            protein_g,
            carbs_g,
            fat_g,
        }
    }

    /// All-zero profile used for fallback items
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Multiply every field by `factor`
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.calories * factor,
            self.protein_g * factor,
            self.carbs_g * factor,
            self.fat_g * factor,
        )
    }

    /// Calories implied by the macros under the 4/4/9 rule
    #[must_use]
    pub fn expected_calories(&self) -> f64 {
        self.fat_g.mul_add(
            KCAL_PER_G_FAT,
            self.protein_g
                .mul_add(KCAL_PER_G_PROTEIN, self.carbs_g * KCAL_PER_G_CARBS),
        )
    }

    /// Copy with every field rounded to one decimal
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self::new(
            round_to_1(self.calories),
            round_to_1(self.protein_g),
            round_to_1(self.carbs_g),
            round_to_1(self.fat_g),
        )
    }

    /// True when every field is zero
    #[must_use]
    pub fn is_zero(&self) -> bool {
        [self.calories, self.protein_g, self.carbs_g, self.fat_g]
            .iter()
            .all(|value| value.abs() < f64::EPSILON)
    }
}

impl Add for MacroProfile {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.calories + rhs.calories,
            self.protein_g + rhs.protein_g,
            self.carbs_g + rhs.carbs_g,
            self.fat_g + rhs.fat_g,
        )
    }
}

impl AddAssign for MacroProfile {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
