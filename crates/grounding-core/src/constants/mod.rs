// ABOUTME: Engine-wide constants organized by pipeline stage
// ABOUTME: Default thresholds, energy factors, cache sizing, retry timing, and USDA identifiers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Default values for every tunable. Runtime code reads these through the
//! configuration types, never directly, so deployments can override them.

/// Service identity used in structured logs
pub mod service_names {
    /// Library/service name
    pub const NUTRITION_GROUNDING: &str = "nutrition-grounding";
    /// Display name of the remote food database
    pub const USDA_FOODDATA_CENTRAL: &str = "USDA FoodData Central";
}

/// Energy factors (Atwater general factors)
pub mod energy {
    /// kcal per gram of protein
    pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
    /// kcal per gram of carbohydrate
    pub const KCAL_PER_G_CARBS: f64 = 4.0;
    /// kcal per gram of fat
    pub const KCAL_PER_G_FAT: f64 = 9.0;
    /// kJ per kcal
    pub const KJ_PER_KCAL: f64 = 4.184;
    /// Reference quantity for per-100g profiles
    pub const REFERENCE_GRAMS: f64 = 100.0;
}

/// Best-match selection defaults
pub mod matching {
    /// Minimum token-overlap similarity for a candidate to be eligible
    pub const DEFAULT_MIN_SIMILARITY: f64 = 0.5;
    /// Score bonus when query and description share a cooking method
    pub const COOKING_METHOD_BOOST: f64 = 0.1;
    /// Score gap under which the runner-up makes the match ambiguous
    pub const AMBIGUITY_MARGIN: f64 = 0.05;
    /// Confidence multiplier for names the normalizer could not confirm
    pub const UNCONFIRMED_PENALTY: f64 = 0.85;
    /// Confidence multiplier for ambiguous matches
    pub const AMBIGUOUS_PENALTY: f64 = 0.9;
    /// Confidence assigned to `fallback_zero` items
    pub const FALLBACK_CONFIDENCE: f64 = 0.1;
    /// Upper bound for fallback confidence
    pub const MAX_FALLBACK_CONFIDENCE: f64 = 0.15;
    /// Source-tier weight for curated recipe records
    pub const TIER_WEIGHT_CURATED: f64 = 1.0;
    /// Source-tier weight for standard reference records
    pub const TIER_WEIGHT_STANDARD: f64 = 0.95;
    /// Source-tier weight for branded records
    pub const TIER_WEIGHT_BRANDED: f64 = 0.8;
}

/// Validation defaults
pub mod validation {
    /// Allowed deviation between reported and 4/4/9 calories, in percent
    pub const CALORIE_TOLERANCE_PCT: f64 = 10.0;
    /// Oils and fats per-item cap (grams)
    pub const FAT_MAX_GRAMS: f64 = 30.0;
    /// Spices per-item cap (grams)
    pub const SPICE_MAX_GRAMS: f64 = 20.0;
    /// Condiments per-item cap (grams)
    pub const CONDIMENT_MAX_GRAMS: f64 = 20.0;
    /// Staple carbohydrate per-item cap (grams)
    pub const STAPLE_CARB_MAX_GRAMS: f64 = 500.0;
    /// Any single ingredient above this is suspicious
    pub const GENERAL_MAX_GRAMS: f64 = 1000.0;
    /// Confidence penalty per validation warning
    pub const WARNING_PENALTY: f64 = 0.05;
    /// Confidence penalty per extraction caveat
    pub const CAVEAT_PENALTY: f64 = 0.1;
}

/// Two-tier cache defaults
pub mod cache {
    /// Memory tier capacity (entries)
    pub const DEFAULT_MEMORY_CAPACITY: usize = 512;
    /// Memory tier lock shards
    pub const DEFAULT_MEMORY_SHARDS: usize = 8;
    /// Entry time-to-live (7 days; food composition data is stable)
    pub const DEFAULT_TTL_SECS: u64 = 7 * 24 * 3_600;
    /// Default persistent store location
    pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/food_cache.db";
}

/// Remote lookup retry defaults
pub mod retry {
    /// Attempts per lookup, including the first
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    /// Base backoff for network errors (milliseconds)
    pub const DEFAULT_BASE_DELAY_MS: u64 = 500;
    /// Exponential multiplier between attempts
    pub const DEFAULT_MULTIPLIER: f64 = 2.0;
    /// Base backoff after a rate-limit response (milliseconds)
    pub const DEFAULT_RATE_LIMIT_DELAY_MS: u64 = 5_000;
    /// Cap for any single backoff (milliseconds)
    pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;
}

/// Engine defaults
pub mod engine {
    /// Concurrent ingredient lookups per request
    pub const DEFAULT_WORKER_POOL_SIZE: usize = 4;
}

/// USDA `FoodData` Central identifiers
pub mod usda {
    /// API base URL
    pub const BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";
    /// Candidates requested per search
    pub const DEFAULT_PAGE_SIZE: u32 = 25;
    /// Per-attempt request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
    /// Data types searched, in preference order
    pub const DEFAULT_DATA_TYPES: &[&str] = &["Survey (FNDDS)", "SR Legacy", "Foundation", "Branded"];

    /// Energy (kcal)
    pub const NUTRIENT_ENERGY: u32 = 1008;
    /// Energy, Atwater general factors
    pub const NUTRIENT_ENERGY_ATWATER_GENERAL: u32 = 2047;
    /// Energy, Atwater specific factors
    pub const NUTRIENT_ENERGY_ATWATER_SPECIFIC: u32 = 2048;
    /// Protein
    pub const NUTRIENT_PROTEIN: u32 = 1003;
    /// Total lipid (fat)
    pub const NUTRIENT_FAT: u32 = 1004;
    /// Carbohydrate, by difference
    pub const NUTRIENT_CARBS: u32 = 1005;
}
