// ABOUTME: Engine-wide default values, re-exported from grounding-core
// ABOUTME: Thresholds, energy factors, cache sizing, retry timing, and USDA identifiers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use grounding_core::constants::{
    cache, energy, engine, matching, retry, service_names, usda, validation,
};
