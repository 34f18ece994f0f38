// ABOUTME: Core types and constants for the nutrition grounding engine
// ABOUTME: Foundation crate with error handling, constants, and the meal data model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Grounding Core
//!
//! Foundation crate providing shared types and constants for the nutrition
//! grounding engine. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and the `LookupError` taxonomy
//! - **constants**: Default thresholds, TTLs, nutrient identifiers, and energy factors
//! - **models**: Ingredients, food records, grounded/scaled items, totals, and breakdowns

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by pipeline stage
pub mod constants;

/// Data model for ingredients, food records, and meal results
pub mod models;
