// ABOUTME: Portion scaler applying linear per-100g scaling to the requested grams
// ABOUTME: Keeps unrounded values for aggregation and one-decimal values for display
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::energy::REFERENCE_GRAMS;
use crate::errors::{AppError, AppResult};
use crate::models::{MacroProfile, ScaledItem};

/// Scale a per-100g profile to `grams`
///
/// # Errors
///
/// Returns `InvalidInput` unless `grams` is finite and positive
pub fn scale(grounded_item_ref: usize, per100g: &MacroProfile, grams: f64) -> AppResult<ScaledItem> {
    if !(grams.is_finite() && grams > 0.0) {
        return Err(AppError::invalid_input(format!(
            "portion must be a positive number of grams (got {grams})"
        )));
    }
    Ok(ScaledItem::from_exact(
        grounded_item_ref,
        grams,
        per100g.scaled(grams / REFERENCE_GRAMS),
    ))
}
