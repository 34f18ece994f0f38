// ABOUTME: Remote lookup seam for food-composition databases
// ABOUTME: FoodDataSource trait plus a fixed in-memory source for offline runs and tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::LookupError;
use crate::models::FoodRecord;

/// A searchable food-composition database
///
/// One call is one remote attempt; retries, timeouts and caching live in
/// [`super::FoodDatabaseClient`].
#[async_trait]
pub trait FoodDataSource: Send + Sync {
    /// Candidates for a normalized query, possibly empty
    ///
    /// # Errors
    ///
    /// Returns a retriable `LookupError` for network and rate-limit failures,
    /// `LookupError::Remote` for permanent ones
    async fn search(&self, query: &str) -> Result<Vec<FoodRecord>, LookupError>;

    /// Name used in logs
    fn name(&self) -> &'static str;
}

/// Source answering from a fixed query table
#[derive(Debug, Clone, Default)]
pub struct StaticFoodSource {
    records: HashMap<String, Vec<FoodRecord>>,
}

impl StaticFoodSource {
    /// Empty source; every query returns no candidates
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register candidates for a query
    #[must_use]
    pub fn with_records(mut self, query: impl Into<String>, records: Vec<FoodRecord>) -> Self {
        self.records.entry(query.into()).or_default().extend(records);
        self
    }
}

#[async_trait]
impl FoodDataSource for StaticFoodSource {
    async fn search(&self, query: &str) -> Result<Vec<FoodRecord>, LookupError> {
        Ok(self.records.get(query).cloned().unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
