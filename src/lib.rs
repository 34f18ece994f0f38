// ABOUTME: Main library entry point for the nutrition grounding engine
// ABOUTME: Grounds freeform ingredient lists against USDA FoodData Central and validates the totals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Nutrition Grounding
//!
//! Converts a list of ingredient guesses (name + grams) into verified nutrient
//! totals. Each ingredient is normalized, looked up in a food-composition
//! database through a two-tier cache, matched to one record, scaled to the
//! requested portion, and aggregated. The meal is then checked for calorie
//! consistency and portion plausibility before it is returned with per-item
//! source attribution.
//!
//! ## Architecture
//!
//! - **grounding**: the pure pipeline stages (normalizer, selector, extractor,
//!   scaler, aggregator, validator, breakdown builder)
//! - **external**: the remote lookup seam, the USDA client, and the retrying
//!   database client
//! - **cache**: bounded in-memory tier and durable `SQLite` tier behind one service
//! - **engine**: the bounded worker pool that runs the pipeline per meal
//! - **config** / **logging**: environment-driven configuration and tracing setup
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use nutrition_grounding::config::EngineConfig;
//! use nutrition_grounding::engine::GroundingEngine;
//! use nutrition_grounding::models::RawIngredient;
//! use nutrition_grounding::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = EngineConfig::from_env()?;
//!     let engine = GroundingEngine::from_config(config).await?;
//!
//!     let breakdown = engine
//!         .analyze(&[
//!             RawIngredient::new("grilled chicken breast", 150.0),
//!             RawIngredient::new("arroz", 200.0),
//!         ])
//!         .await?;
//!
//!     println!("{}", breakdown.summary());
//!     Ok(())
//! }
//! ```

/// Two-tier lookup cache (memory + `SQLite`)
pub mod cache;

/// Environment-driven configuration
pub mod config;

/// Re-exported constants from the core crate
pub mod constants;

/// Grounding engine with a bounded worker pool
pub mod engine;

/// Re-exported error types from the core crate
pub mod errors;

/// Remote food database access
pub mod external;

/// Pure pipeline stages
pub mod grounding;

/// Structured logging setup
pub mod logging;

/// Re-exported data model from the core crate
pub mod models;
