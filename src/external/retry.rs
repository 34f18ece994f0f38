// ABOUTME: Retry policy for remote food lookups with exponential backoff
// ABOUTME: Rate-limit responses back off from a longer base delay than network errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::env_parse;
use crate::constants::retry::{
    DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS, DEFAULT_MULTIPLIER,
    DEFAULT_RATE_LIMIT_DELAY_MS,
};
use crate::errors::{AppError, AppResult, LookupError};

/// Backoff policy injected into the database client
///
/// Delays are deterministic (no jitter) so tests on paused time can assert
/// exact schedules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Attempts per lookup, including the first
    pub max_attempts: u32,
    /// Delay before the first retry of a network error or timeout
    pub base_delay: Duration,
    /// Growth factor applied per further retry
    pub multiplier: f64,
    /// Delay before the first retry after a rate-limit response
    pub rate_limit_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            multiplier: DEFAULT_MULTIPLIER,
            rate_limit_delay: Duration::from_millis(DEFAULT_RATE_LIMIT_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Load from `LOOKUP_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if a variable does not parse
    pub fn from_env() -> AppResult<Self> {
        let mut policy = Self::default();
        if let Some(attempts) = env_parse("LOOKUP_MAX_ATTEMPTS")? {
            policy.max_attempts = attempts;
        }
        if let Some(ms) = env_parse("LOOKUP_BASE_DELAY_MS")? {
            policy.base_delay = Duration::from_millis(ms);
        }
        if let Some(multiplier) = env_parse("LOOKUP_BACKOFF_MULTIPLIER")? {
            policy.multiplier = multiplier;
        }
        if let Some(ms) = env_parse("LOOKUP_RATE_LIMIT_DELAY_MS")? {
            policy.rate_limit_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = env_parse("LOOKUP_MAX_DELAY_MS")? {
            policy.max_delay = Duration::from_millis(ms);
        }
        Ok(policy)
    }

    /// Validate the policy
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` for zero attempts or a multiplier below 1
    pub fn validate(&self) -> AppResult<()> {
        if self.max_attempts == 0 {
            return Err(AppError::config_invalid(
                "LOOKUP_MAX_ATTEMPTS must be at least 1",
            ));
        }
        if !(self.multiplier.is_finite() && self.multiplier >= 1.0) {
            return Err(AppError::config_invalid(format!(
                "LOOKUP_BACKOFF_MULTIPLIER must be at least 1 (got {})",
                self.multiplier
            )));
        }
        Ok(())
    }

    /// Whether another attempt is allowed after `attempt` (1-based) failed with `error`
    #[must_use]
    pub const fn should_retry(&self, attempt: u32, error: &LookupError) -> bool {
        error.is_retryable() && attempt < self.max_attempts
    }

    /// Delay before the attempt following failed attempt `attempt` (1-based)
    ///
    /// Grows as `base * multiplier^(attempt - 1)`, using the rate-limit base
    /// for 429 responses. A server `Retry-After` longer than the computed
    /// delay wins. The result never exceeds `max_delay`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, error: &LookupError) -> Duration {
        let (base, retry_after) = match error {
            LookupError::RateLimited { retry_after } => (self.rate_limit_delay, *retry_after),
            _ => (self.base_delay, None),
        };

        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let scaled = base.as_secs_f64() * self.multiplier.powi(exponent);
        let max = self.max_delay.as_secs_f64();
        let computed = Duration::from_secs_f64(if scaled.is_finite() { scaled.min(max) } else { max });

        retry_after
            .map_or(computed, |hint| computed.max(hint))
            .min(self.max_delay)
    }
}
