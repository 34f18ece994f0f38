// ABOUTME: Ingredient name normalizer producing cache keys and lookup queries
// ABOUTME: ASCII folding, punctuation and measurement stripping, then phrase and token synonym mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Pure and deterministic: no I/O, and `normalize(normalize(x).query).query
//! == normalize(x).query` for every input.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::synonyms::{is_canonical, phrase_alias, token_translation};

/// Outcome of normalizing one raw ingredient name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedQuery {
    /// Canonical lookup query, also the cache key
    pub query: String,
    /// Name was found in the synonym tables (as an alias or a canonical term)
    pub confirmed: bool,
    /// A table rewrote the name
    pub synonym_applied: bool,
}

impl NormalizedQuery {
    /// Whether nothing usable remained after cleaning
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }
}

fn measurement_regex() -> Option<&'static Regex> {
    static MEASUREMENT: OnceLock<Option<Regex>> = OnceLock::new();
    MEASUREMENT
        .get_or_init(|| {
            Regex::new(
                r"\b\d+ ?(?:g|kg|mg|ml|l|oz|lb|lbs|fl oz|gram|grams|kilogram|kilograms|milligram|milligrams|milliliter|milliliters|millilitre|millilitres|liter|liters|litre|litres|ounce|ounces|pound|pounds)\b",
            )
            .ok()
        })
        .as_ref()
}

/// Fold a lowercase non-ASCII letter to its ASCII base
const fn fold_char(c: char) -> Option<&'static str> {
    Some(match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'ī' => "i",
        'ñ' | 'ń' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => "o",
        'œ' => "oe",
        'ß' => "ss",
        'ś' | 'š' => "s",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' => "u",
        'ý' | 'ÿ' => "y",
        'ž' | 'ź' | 'ż' => "z",
        'ł' => "l",
        _ => return None,
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase, fold to ASCII, drop punctuation and symbols, strip measurements
///
/// Keeps `[a-z0-9%]` so fat-percentage qualifiers ("2% milk") survive.
#[must_use]
pub fn clean(raw: &str) -> String {
    let mut folded = String::with_capacity(raw.len());
    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '%' {
            folded.push(c);
        } else if let Some(ascii) = fold_char(c) {
            folded.push_str(ascii);
        } else {
            folded.push(' ');
        }
    }

    let mut cleaned = collapse_whitespace(&folded);
    if let Some(re) = measurement_regex() {
        // removal can expose a new match ("3 3 g g"), so run to a fixed point
        loop {
            let next = collapse_whitespace(&re.replace_all(&cleaned, " "));
            if next == cleaned {
                break;
            }
            cleaned = next;
        }
    }
    cleaned
}

/// Translate tokens through the multilingual table
fn translate_tokens(cleaned: &str) -> Option<String> {
    let mut translated = false;
    let tokens: Vec<&str> = cleaned
        .split(' ')
        .map(|token| {
            token_translation(token).map_or(token, |english| {
                translated = true;
                english
            })
        })
        .collect();
    translated.then(|| tokens.join(" "))
}

/// Normalize a raw ingredient name into a lookup query
///
/// Order: clean, whole-phrase alias, per-token translation (followed by a
/// second phrase lookup on the translated text). A name that hits no table
/// passes through cleaned and is flagged unconfirmed unless it already is a
/// canonical term.
#[must_use]
pub fn normalize(raw: &str) -> NormalizedQuery {
    let cleaned = clean(raw);

    if let Some(canonical) = phrase_alias(&cleaned) {
        return NormalizedQuery {
            query: canonical.to_owned(),
            confirmed: true,
            synonym_applied: true,
        };
    }

    if let Some(translated) = translate_tokens(&cleaned) {
        let query = phrase_alias(&translated).map_or(translated, str::to_owned);
        return NormalizedQuery {
            query,
            confirmed: true,
            synonym_applied: true,
        };
    }

    NormalizedQuery {
        confirmed: is_canonical(&cleaned),
        query: cleaned,
        synonym_applied: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grounding::synonyms::{alias_keys, canonical_terms};

    #[test]
    fn test_clean_strips_noise() {
        assert_eq!(clean("  Coca-Cola®  500ml "), "coca cola");
        assert_eq!(clean("Chicken Breast, grilled (200 g)"), "chicken breast grilled");
        assert_eq!(clean("Jalapeño"), "jalapeno");
        assert_eq!(clean("Café au lait"), "cafe au lait");
        assert_eq!(clean("12 fl. oz orange juice"), "orange juice");
    }

    #[test]
    fn test_clean_keeps_percentages() {
        assert_eq!(clean("2% Milk"), "2% milk");
    }

    #[test]
    fn test_clean_handles_exposed_measurements() {
        assert_eq!(clean("3 3 g g"), clean(&clean("3 3 g g")));
    }

    #[test]
    fn test_phrase_alias() {
        let n = normalize("Basmati Rice");
        assert_eq!(n.query, "rice");
        assert!(n.confirmed);
        assert!(n.synonym_applied);
    }

    #[test]
    fn test_regional_names_collapse() {
        assert_eq!(normalize("arroz").query, normalize("rice").query);
        assert_eq!(normalize("chawal").query, "rice");
        assert_eq!(normalize("Käse").query, "cheese");
    }

    #[test]
    fn test_token_translation_keeps_other_tokens() {
        assert_eq!(normalize("arroz con pollo").query, "rice con chicken");
        assert_eq!(normalize("grilled pollo").query, "grilled chicken");
    }

    #[test]
    fn test_canonical_term_confirmed_without_rewrite() {
        let n = normalize("Rice");
        assert_eq!(n.query, "rice");
        assert!(n.confirmed);
        assert!(!n.synonym_applied);
    }

    #[test]
    fn test_unknown_name_passes_through_unconfirmed() {
        let n = normalize("Rendang (beef)");
        assert_eq!(n.query, "rendang beef");
        assert!(!n.confirmed);
        assert!(!n.synonym_applied);
    }

    #[test]
    fn test_empty_after_cleaning() {
        assert!(normalize("  ®™ 200g ").is_empty());
    }

    #[test]
    fn test_canonical_terms_are_fixed_points() {
        for term in canonical_terms() {
            let n = normalize(term);
            assert_eq!(n.query, term, "canonical term '{term}' is not a fixed point");
            assert!(n.confirmed);
        }
    }

    #[test]
    fn test_idempotent_over_tables_and_samples() {
        let samples = [
            "Grilled Chicken Breast 150g",
            "arroz con pollo",
            "Whole Milk (500 ml)",
            "Sweet potato fries",
            "naïve café crème",
            "3 3 g g",
            "",
            "   ",
            "dal makhani",
            "COKE™ zero",
        ];
        for raw in samples.into_iter().chain(alias_keys()) {
            let once = normalize(raw).query;
            let twice = normalize(&once).query;
            assert_eq!(once, twice, "normalize is not idempotent for '{raw}'");
        }
    }
}
