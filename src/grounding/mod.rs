// ABOUTME: Pure grounding pipeline stages from raw ingredient name to attributed breakdown
// ABOUTME: Normalizer, selector, extractor, scaler, aggregator, validator, and breakdown builder
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Grounding Pipeline
//!
//! Every stage here is synchronous and free of I/O; the engine drives them
//! and owns the only suspension point (the database lookup). Per ingredient:
//!
//! ```text
//! normalize -> lookup -> select (extract) -> scale
//! ```
//!
//! then per meal: `aggregate -> validate -> build`.

/// Totals and calorie-share percentages
pub mod aggregator;
/// Final output composition
pub mod breakdown;
/// Native nutrient panel to per-100g macros
pub mod extractor;
/// Raw name to canonical lookup query
pub mod normalizer;
/// Linear portion scaling
pub mod scaler;
/// Candidate ranking and best-match choice
pub mod selector;
/// Static synonym and translation tables
pub mod synonyms;
/// 4/4/9 consistency and portion plausibility
pub mod validator;

pub use aggregator::{aggregate, Aggregate};
pub use breakdown::build;
pub use extractor::{extract, ExtractedMacros, MalformedRecord};
pub use normalizer::{normalize, NormalizedQuery};
pub use scaler::scale;
pub use selector::{grounded_item, select, NoMatchReason, Selection};
pub use validator::validate;
