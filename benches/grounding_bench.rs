// ABOUTME: Criterion benchmarks for the grounding hot paths
// ABOUTME: Measures name normalization, best-match selection over candidate lists, and cache reads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for the grounding pipeline.
//!
//! Lookups are network-bound; these benchmarks cover the CPU-side stages that
//! run once per ingredient regardless of where candidates come from.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::runtime::Runtime;

use nutrition_grounding::cache::{CacheConfig, FoodCache};
use nutrition_grounding::config::SelectorConfig;
use nutrition_grounding::grounding::{normalize, select};
use nutrition_grounding::models::{FoodRecord, MacroProfile, SourceTier};

const NAMES: &[&str] = &[
    "Chicken Breast (grilled)",
    "arroz blanco",
    "2 tbsp Extra-Virgin Olive Oil",
    "pollo a la plancha",
    "Sweet Potato Fries",
    "basmati rice",
    "Greek yogurt, plain, non-fat",
    "zorblax paste",
];

const DESCRIPTIONS: &[&str] = &[
    "Chicken breast, grilled",
    "Chicken breast, roasted, skin not eaten",
    "Chicken, broilers or fryers, breast, meat only, cooked, grilled",
    "Chicken breast, fried, coated",
    "Chicken breast tenders, breaded",
    "Chicken, ground, raw",
    "Chicken salad sandwich",
    "Rice, white, cooked",
];

fn candidates(count: usize) -> Vec<FoodRecord> {
    (0..count)
        .map(|i| {
            let tier = match i % 3 {
                0 => SourceTier::CuratedRecipe,
                1 => SourceTier::StandardReference,
                _ => SourceTier::Branded,
            };
            FoodRecord::per_100g(
                format!("bench-{i}"),
                tier,
                DESCRIPTIONS[i % DESCRIPTIONS.len()],
                MacroProfile::new(165.0, 31.0, 0.0, 3.6),
            )
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    group.throughput(Throughput::Elements(NAMES.len() as u64));
    group.bench_function("mixed_names", |b| {
        b.iter(|| {
            for name in NAMES {
                black_box(normalize(black_box(name)));
            }
        });
    });
    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");
    let config = SelectorConfig::default();
    let query = normalize("grilled chicken breast");

    for count in [5_usize, 25, 100] {
        let records = candidates(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("candidates", count), &records, |b, records| {
            b.iter(|| black_box(select(&query, records, &config)));
        });
    }
    group.finish();
}

fn bench_cache_hit(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let cache = FoodCache::new(&CacheConfig::memory_only(), None);
    rt.block_on(cache.put("chicken breast grilled", candidates(25)));

    c.bench_function("cache_memory_hit", |b| {
        b.iter(|| rt.block_on(async { black_box(cache.get("chicken breast grilled").await) }));
    });
}

criterion_group!(benches, bench_normalize, bench_select, bench_cache_hit);
criterion_main!(benches);
