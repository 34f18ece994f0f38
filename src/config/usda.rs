// ABOUTME: USDA FoodData Central connection configuration
// ABOUTME: API key, base URL, page size, searched data types, and per-attempt timeout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::time::Duration;

use super::{env_parse, env_var_or};
use crate::constants::usda::{BASE_URL, DEFAULT_DATA_TYPES, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS};
use crate::errors::{AppError, AppResult};

/// USDA `FoodData` Central API configuration
#[derive(Clone)]
pub struct UsdaApiConfig {
    /// API key (free from <https://fdc.nal.usda.gov/api-key-signup.html>)
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Candidates requested per search (1-200)
    pub page_size: u32,
    /// `dataType` filters sent with each search
    pub data_types: Vec<String>,
    /// Per-attempt request timeout (seconds)
    pub request_timeout_secs: u64,
}

impl Default for UsdaApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: BASE_URL.to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
            data_types: DEFAULT_DATA_TYPES.iter().map(|&t| t.to_owned()).collect(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// api_key stays out of logs
impl fmt::Debug for UsdaApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsdaApiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("data_types", &self.data_types)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl UsdaApiConfig {
    /// Build a configuration with the given key and defaults elsewhere
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Load from `USDA_API_KEY`, `USDA_BASE_URL`, `USDA_PAGE_SIZE`, `USDA_TIMEOUT_SECS`
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` when the key is unset or blank, `ConfigInvalid`
    /// when a numeric variable does not parse
    pub fn from_env() -> AppResult<Self> {
        let api_key = env_var_or("USDA_API_KEY", "");
        if api_key.trim().is_empty() {
            return Err(AppError::config_missing(
                "USDA_API_KEY is not set; a FoodData Central API key is required",
            ));
        }

        let mut config = Self {
            api_key: api_key.trim().to_owned(),
            base_url: env_var_or("USDA_BASE_URL", BASE_URL),
            ..Self::default()
        };
        if let Some(page_size) = env_parse("USDA_PAGE_SIZE")? {
            config.page_size = page_size;
        }
        if let Some(timeout) = env_parse("USDA_TIMEOUT_SECS")? {
            config.request_timeout_secs = timeout;
        }
        Ok(config)
    }

    /// Per-attempt timeout
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` for a blank key and `ConfigInvalid` for out-of-range values
    pub fn validate(&self) -> AppResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::config_missing("USDA API key is empty"));
        }
        if !(1..=200).contains(&self.page_size) {
            return Err(AppError::config_invalid(format!(
                "USDA_PAGE_SIZE must be between 1 and 200 (got {})",
                self.page_size
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::config_invalid("USDA_TIMEOUT_SECS must be positive"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(AppError::config_invalid(format!(
                "USDA_BASE_URL must be an http(s) URL (got {})",
                self.base_url
            )));
        }
        Ok(())
    }
}
