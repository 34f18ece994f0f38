// ABOUTME: Static synonym tables mapping regional, alternate, and foreign food names to canonical terms
// ABOUTME: Loaded once into immutable maps; every canonical term is a fixed point of normalization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Whole-phrase aliases, keyed by the cleaned phrase
const PHRASE_ALIASES: &[(&str, &str)] = &[
    // staple grains
    ("basmati rice", "rice"),
    ("jasmine rice", "rice"),
    ("white rice", "rice"),
    ("plain rice", "rice"),
    ("arroz blanco", "rice"),
    ("riz blanc", "rice"),
    ("rolled oats", "oats"),
    ("porridge oats", "oats"),
    ("oatmeal", "oats"),
    ("atta", "whole wheat flour"),
    ("maida", "flour"),
    ("all purpose flour", "flour"),
    // drinks
    ("soda", "cola"),
    ("pop", "cola"),
    ("coke", "cola"),
    ("soft drink", "cola"),
    // potatoes
    ("french fries", "fries"),
    ("potato fries", "fries"),
    // protein powder
    ("whey protein", "protein powder whey"),
    ("whey powder", "protein powder whey"),
    ("protein shake powder", "protein powder whey"),
    ("casein protein", "protein powder casein"),
    ("plant protein", "protein powder plant"),
    ("pea protein", "protein powder plant"),
    // milk
    ("whole milk", "milk whole"),
    ("full fat milk", "milk whole"),
    ("2% milk", "milk 2%"),
    ("1% milk", "milk 1%"),
    ("skim milk", "milk skim"),
    ("nonfat milk", "milk skim"),
    ("fat free milk", "milk skim"),
    ("curd", "yogurt"),
    ("yoghurt", "yogurt"),
    // oils
    ("olive oil", "oil olive"),
    ("extra virgin olive oil", "oil olive"),
    ("vegetable oil", "oil vegetable"),
    ("canola oil", "oil canola"),
    ("rapeseed oil", "oil canola"),
    // vegetables
    ("aubergine", "eggplant"),
    ("brinjal", "eggplant"),
    ("courgette", "zucchini"),
    ("capsicum", "bell pepper"),
    ("scallion", "green onion"),
    ("spring onion", "green onion"),
    ("coriander leaves", "cilantro"),
    ("garbanzo beans", "chickpeas"),
    ("garbanzo", "chickpeas"),
    // proteins
    ("prawn", "shrimp"),
    ("prawns", "shrimp"),
    ("minced beef", "ground beef"),
    ("beef mince", "ground beef"),
    ("groundnuts", "peanuts"),
    ("peanut", "peanuts"),
];

/// Single-token translations (Spanish, French, German, Italian, transliterated South Asian)
///
/// Applied per token when no phrase alias matches, so "arroz con pollo"
/// becomes "rice con chicken". Words that double as English food terms
/// ("pan", "latte") are left out.
const TOKEN_TRANSLATIONS: &[(&str, &str)] = &[
    // Spanish
    ("pollo", "chicken"),
    ("arroz", "rice"),
    ("leche", "milk"),
    ("queso", "cheese"),
    ("huevo", "egg"),
    ("huevos", "egg"),
    ("carne", "meat"),
    ("pescado", "fish"),
    ("manzana", "apple"),
    ("naranja", "orange"),
    ("frijoles", "beans"),
    // French
    ("poulet", "chicken"),
    ("riz", "rice"),
    ("lait", "milk"),
    ("fromage", "cheese"),
    ("pain", "bread"),
    ("oeuf", "egg"),
    ("viande", "meat"),
    ("poisson", "fish"),
    ("pomme", "apple"),
    // German
    ("huhn", "chicken"),
    ("hahnchen", "chicken"),
    ("reis", "rice"),
    ("milch", "milk"),
    ("kase", "cheese"),
    ("brot", "bread"),
    ("ei", "egg"),
    ("fleisch", "meat"),
    ("fisch", "fish"),
    ("apfel", "apple"),
    // Italian
    ("riso", "rice"),
    ("formaggio", "cheese"),
    ("pane", "bread"),
    ("uovo", "egg"),
    ("pesce", "fish"),
    ("mela", "apple"),
    // transliterated South Asian
    ("chawal", "rice"),
    ("chai", "tea"),
    ("paneer", "cheese"),
    ("dal", "lentils"),
    ("daal", "lentils"),
    ("naan", "bread"),
    ("roti", "bread"),
    ("chapati", "bread"),
    ("dosa", "rice pancake"),
    ("idli", "rice cake"),
    ("aloo", "potato"),
    ("gobi", "cauliflower"),
    ("palak", "spinach"),
    ("murgh", "chicken"),
    ("doodh", "milk"),
    ("dahi", "yogurt"),
    ("chana", "chickpeas"),
    ("baingan", "eggplant"),
];

/// Generic foods accepted as-is (confirmed without rewriting)
const CANONICAL_FOODS: &[&str] = &[
    "apple",
    "avocado",
    "bacon",
    "banana",
    "beans",
    "beef",
    "bread",
    "broccoli",
    "butter",
    "carrot",
    "cauliflower",
    "cheese",
    "chicken",
    "chicken breast",
    "chicken thigh",
    "chickpeas",
    "cola",
    "egg",
    "eggplant",
    "fish",
    "flour",
    "fries",
    "ghee",
    "green onion",
    "ground beef",
    "lentils",
    "meat",
    "milk",
    "oats",
    "oil",
    "onion",
    "orange",
    "pasta",
    "peanuts",
    "potato",
    "quinoa",
    "rice",
    "salmon",
    "shrimp",
    "spinach",
    "sugar",
    "tea",
    "tofu",
    "tomato",
    "yogurt",
    "zucchini",
];

/// Phrase alias lookup
pub fn phrase_alias(phrase: &str) -> Option<&'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE
        .get_or_init(|| PHRASE_ALIASES.iter().copied().collect())
        .get(phrase)
        .copied()
}

/// Token translation lookup
pub fn token_translation(token: &str) -> Option<&'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE
        .get_or_init(|| TOKEN_TRANSLATIONS.iter().copied().collect())
        .get(token)
        .copied()
}

/// Whether a phrase is a canonical term (a table target or a listed generic food)
pub fn is_canonical(phrase: &str) -> bool {
    static TERMS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    TERMS
        .get_or_init(|| canonical_terms().collect())
        .contains(phrase)
}

/// Every canonical target in the tables
pub fn canonical_terms() -> impl Iterator<Item = &'static str> {
    PHRASE_ALIASES
        .iter()
        .chain(TOKEN_TRANSLATIONS)
        .map(|&(_, canonical)| canonical)
        .chain(CANONICAL_FOODS.iter().copied())
}

/// Every alias key in the tables
pub fn alias_keys() -> impl Iterator<Item = &'static str> {
    PHRASE_ALIASES
        .iter()
        .chain(TOKEN_TRANSLATIONS)
        .map(|&(alias, _)| alias)
}
