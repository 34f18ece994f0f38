// ABOUTME: Remote food database access: the lookup seam, USDA client, and retrying cached client
// ABOUTME: Everything that can suspend on the network lives under this module
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! External food-composition databases.

/// Cache-first client with retries and per-attempt timeouts
pub mod client;
/// Backoff policy
pub mod retry;
/// `FoodDataSource` trait and a static source
pub mod source;
/// USDA `FoodData` Central client
pub mod usda_client;

pub use client::FoodDatabaseClient;
pub use retry::RetryPolicy;
pub use source::{FoodDataSource, StaticFoodSource};
pub use usda_client::UsdaClient;
