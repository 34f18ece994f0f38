// ABOUTME: Best-match selector ranking candidate records for one normalized query
// ABOUTME: Token-overlap similarity, cooking-method boost, exclusion modifiers, and an explicit tier-first comparator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Best-Match Selection
//!
//! Candidates are first filtered (malformed records, exclusion modifiers,
//! similarity below the threshold), then ordered by [`rank`]:
//!
//! 1. source tier priority (curated recipe > standard reference > branded)
//! 2. boosted similarity score, descending
//! 3. shorter description (generic over compound or branded items)
//! 4. record id, for a total order
//!
//! A runner-up in the same tier within the ambiguity margin flags the match
//! as ambiguous; the top candidate is still used.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use super::extractor::{extract, ExtractedMacros};
use super::normalizer::{clean, NormalizedQuery};
use crate::config::SelectorConfig;
use crate::models::{FoodRecord, GroundedItem, MatchMethod};

/// Cooking-method families; a shared family earns the score boost
const COOKING_METHODS: &[&[&str]] = &[
    &["fried", "fry", "deep fried", "pan fried", "sauteed", "stir fried"],
    &["grilled", "grill", "broiled", "barbecued", "bbq", "charred"],
    &["roasted", "roast", "baked"],
    &["boiled", "boil", "poached", "simmered", "stewed"],
    &["steamed", "steam"],
    &["raw", "uncooked", "fresh"],
    &["cooked"],
];

/// Modifier that changes the food when present on only one side
const EXCLUSION_MODIFIERS: &[(&str, &[&str])] = &[
    ("sweet", &["fries", "potato", "potatoes"]),
    ("veggie", &["burger", "burgers"]),
];

/// Distinct tokens of a text, normalized like queries
fn tokens(text: &str) -> BTreeSet<String> {
    clean(text).split(' ').filter(|t| !t.is_empty()).map(str::to_owned).collect()
}

fn cooking_families(tokens: &BTreeSet<String>) -> BTreeSet<usize> {
    COOKING_METHODS
        .iter()
        .enumerate()
        .filter(|(_, family)| {
            family.iter().any(|method| {
                // multi-word methods must appear as all of their tokens
                method.split(' ').all(|part| tokens.contains(part))
            })
        })
        .map(|(index, _)| index)
        .collect()
}

/// Fraction of distinct query tokens present in the description
#[must_use]
pub fn similarity(query: &str, description: &str) -> f64 {
    let query_tokens = tokens(query);
    if query_tokens.is_empty() {
        return 0.0;
    }
    overlap(&query_tokens, &tokens(description))
}

#[allow(clippy::cast_precision_loss)] // token counts are tiny
fn overlap(query: &BTreeSet<String>, description: &BTreeSet<String>) -> f64 {
    query.intersection(description).count() as f64 / query.len() as f64
}

/// Whether an exclusion modifier separates query and description
fn excluded(query: &BTreeSet<String>, description: &BTreeSet<String>) -> bool {
    EXCLUSION_MODIFIERS.iter().any(|(modifier, targets)| {
        let shares_target = targets
            .iter()
            .any(|t| query.contains(*t) && description.contains(*t));
        shares_target && query.contains(*modifier) != description.contains(*modifier)
    })
}

/// An eligible, scored candidate
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    /// Candidate record
    pub record: FoodRecord,
    /// Canonical macros of the record
    pub extracted: ExtractedMacros,
    /// Un-boosted token-overlap similarity
    pub similarity: f64,
    /// Similarity plus cooking-method boost
    pub score: f64,
    exact_tokens: bool,
}

/// Explicit ranking comparator; `Less` sorts first
#[must_use]
pub fn rank(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.record
        .source_tier
        .priority()
        .cmp(&a.record.source_tier.priority())
        .then_with(|| b.score.total_cmp(&a.score))
        .then_with(|| a.record.description.len().cmp(&b.record.description.len()))
        .then_with(|| a.record.record_id.cmp(&b.record.record_id))
}

/// Why no candidate was selected
#[derive(Debug, Clone, PartialEq)]
pub enum NoMatchReason {
    /// Nothing remained of the name after normalization
    EmptyQuery,
    /// The database returned nothing
    NoCandidates,
    /// Every candidate was malformed
    AllMalformed {
        /// Candidates skipped
        count: usize,
    },
    /// No candidate reached the similarity threshold
    BelowThreshold {
        /// Highest similarity seen
        best_similarity: f64,
    },
}

impl fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyQuery => f.write_str("name is empty after normalization"),
            Self::NoCandidates => f.write_str("no database candidates"),
            Self::AllMalformed { count } => {
                write!(f, "all {count} candidates had unusable nutrient data")
            }
            Self::BelowThreshold { best_similarity } => {
                write!(f, "best similarity {best_similarity:.2} below threshold")
            }
        }
    }
}

/// The chosen candidate and how it was chosen
#[derive(Debug, Clone)]
pub struct Selection {
    /// Top-ranked candidate
    pub best: ScoredCandidate,
    /// Same-tier runner-up within the ambiguity margin
    pub runner_up: Option<ScoredCandidate>,
    /// How the name resolved
    pub match_method: MatchMethod,
}

impl Selection {
    /// Whether a close runner-up exists
    #[must_use]
    pub const fn is_ambiguous(&self) -> bool {
        self.runner_up.is_some()
    }
}

/// Rank candidates for a normalized query and pick one
///
/// # Errors
///
/// Returns the `NoMatchReason` when no candidate is eligible; this becomes a
/// `fallback_zero` item, never a request failure.
pub fn select(
    query: &NormalizedQuery,
    candidates: &[FoodRecord],
    config: &SelectorConfig,
) -> Result<Selection, NoMatchReason> {
    if query.is_empty() {
        return Err(NoMatchReason::EmptyQuery);
    }
    if candidates.is_empty() {
        return Err(NoMatchReason::NoCandidates);
    }

    let query_tokens = tokens(&query.query);
    let query_methods = cooking_families(&query_tokens);
    let mut malformed = 0;
    let mut best_similarity: f64 = 0.0;
    let mut eligible = Vec::with_capacity(candidates.len());

    for record in candidates {
        let extracted = match extract(record) {
            Ok(extracted) => extracted,
            Err(reason) => {
                malformed += 1;
                debug!(record_id = %record.record_id, %reason, "Skipping malformed record");
                continue;
            }
        };

        let description_tokens = tokens(&record.description);
        let similarity = overlap(&query_tokens, &description_tokens);
        best_similarity = best_similarity.max(similarity);

        if excluded(&query_tokens, &description_tokens) {
            debug!(record_id = %record.record_id, "Candidate excluded by modifier");
            continue;
        }
        if similarity < config.min_similarity {
            continue;
        }

        let shares_method = !query_methods.is_disjoint(&cooking_families(&description_tokens));
        let score = if shares_method {
            similarity + config.cooking_method_boost
        } else {
            similarity
        };
        debug!(
            record_id = %record.record_id,
            tier = %record.source_tier,
            similarity,
            score,
            "Candidate eligible"
        );

        eligible.push(ScoredCandidate {
            record: record.clone(),
            extracted,
            similarity,
            score,
            exact_tokens: description_tokens == query_tokens,
        });
    }

    if eligible.is_empty() {
        return Err(if malformed == candidates.len() {
            NoMatchReason::AllMalformed { count: malformed }
        } else {
            NoMatchReason::BelowThreshold { best_similarity }
        });
    }

    eligible.sort_by(rank);
    let mut ranked = eligible.into_iter();
    let Some(best) = ranked.next() else {
        return Err(NoMatchReason::NoCandidates);
    };
    let runner_up = ranked.next().filter(|second| {
        second.record.source_tier == best.record.source_tier
            && best.score - second.score < config.ambiguity_margin
    });

    let match_method = if query.synonym_applied {
        MatchMethod::Synonym
    } else if best.exact_tokens {
        MatchMethod::Exact
    } else {
        MatchMethod::Fuzzy
    };

    Ok(Selection {
        best,
        runner_up,
        match_method,
    })
}

/// Build a grounded item from a selection
///
/// Confidence starts at the un-boosted similarity, is multiplied by the
/// unconfirmed and ambiguous penalties that apply, and loses
/// `caveat_penalty` per confidence-lowering extraction caveat.
#[must_use]
pub fn grounded_item(
    raw_name: &str,
    query: &NormalizedQuery,
    selection: Selection,
    config: &SelectorConfig,
    caveat_penalty: f64,
) -> GroundedItem {
    let ambiguous = selection.is_ambiguous();
    let unconfirmed = !query.confirmed;
    let best = selection.best;

    let mut confidence = best.similarity.min(1.0);
    if unconfirmed {
        confidence *= config.unconfirmed_penalty;
    }
    if ambiguous {
        confidence *= config.ambiguous_penalty;
    }
    #[allow(clippy::cast_precision_loss)] // a handful of caveats at most
    let caveat_loss = caveat_penalty * best.extracted.confidence_caveats() as f64;
    confidence = (confidence - caveat_loss).clamp(0.0, 1.0);

    GroundedItem {
        raw_name: raw_name.to_owned(),
        normalized_query: query.query.clone(),
        matched_record_id: Some(best.record.record_id),
        source_tier: Some(best.record.source_tier),
        matched_description: Some(best.record.description),
        match_method: selection.match_method,
        similarity: best.similarity,
        confidence,
        per100g: best.extracted.per100g,
        caveats: best.extracted.caveats,
        ambiguous,
        unconfirmed,
    }
}
