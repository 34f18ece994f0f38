// ABOUTME: Error types for the grounding engine, re-exported from grounding-core
// ABOUTME: AppError, ErrorCode, ErrorContext, AppResult, and the LookupError taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use grounding_core::errors::{AppError, AppResult, ErrorCode, ErrorContext, LookupError};
