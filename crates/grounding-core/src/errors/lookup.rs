// ABOUTME: Error taxonomy for remote food database lookups
// ABOUTME: Separates retriable (transient, timeout, rate limit) from permanent failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Lookup Error Types
//!
//! Errors surfaced at the remote lookup boundary. The database client retries
//! the retriable variants under its retry policy and surfaces the last error
//! once the attempt cap is reached.

use std::time::Duration;

use super::{AppError, ErrorCode};

/// Failure of a single remote lookup attempt
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// Network failure or 5xx response; retriable
    #[error("transient lookup failure: {0}")]
    Transient(String),
    /// Attempt exceeded the per-lookup timeout; retriable
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),
    /// Remote signalled rate limiting (HTTP 429); retriable with a longer backoff
    #[error("lookup rate limited{}", retry_after.map(|d| format!(" (retry after {}s)", d.as_secs())).unwrap_or_default())]
    RateLimited {
        /// Server-suggested wait before the next attempt
        retry_after: Option<Duration>,
    },
    /// Permanent failure (bad credential, malformed request or response); not retriable
    #[error("remote lookup failed{}: {reason}", status.map(|s| format!(" with status {s}")).unwrap_or_default())]
    Remote {
        /// HTTP status if one was received
        status: Option<u16>,
        /// Failure detail
        reason: String,
    },
}

impl LookupError {
    /// Whether another attempt may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transient(_) | Self::Timeout(_) | Self::RateLimited { .. }
        )
    }

    /// Whether this is a rate-limit response
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Short machine-friendly label used in logs and warnings
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transient(_) => "transient",
            Self::Timeout(_) => "timeout",
            Self::RateLimited { .. } => "rate_limited",
            Self::Remote { .. } => "remote",
        }
    }
}

impl From<LookupError> for AppError {
    fn from(error: LookupError) -> Self {
        let code = match &error {
            LookupError::Transient(_) | LookupError::Timeout(_) => {
                ErrorCode::ExternalServiceUnavailable
            }
            LookupError::RateLimited { .. } => ErrorCode::ExternalRateLimited,
            LookupError::Remote {
                status: Some(401 | 403),
                ..
            } => ErrorCode::ExternalAuthFailed,
            LookupError::Remote { .. } => ErrorCode::ExternalServiceError,
        };
        Self::new(code, error.to_string()).with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(LookupError::Transient("reset".into()).is_retryable());
        assert!(LookupError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(LookupError::RateLimited { retry_after: None }.is_retryable());
        assert!(!LookupError::Remote {
            status: Some(400),
            reason: "bad query".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_auth_failure_maps_to_auth_code() {
        let error: AppError = LookupError::Remote {
            status: Some(403),
            reason: "API_KEY_INVALID".into(),
        }
        .into();
        assert_eq!(error.code, ErrorCode::ExternalAuthFailed);
    }

    #[test]
    fn test_rate_limited_display_includes_retry_after() {
        let error = LookupError::RateLimited {
            retry_after: Some(Duration::from_secs(30)),
        };
        assert_eq!(error.to_string(), "lookup rate limited (retry after 30s)");
    }
}
