// ABOUTME: Configuration error types for metrics configuration validation
// ABOUTME: Defines error variants for invalid ranges, weights, and out-of-range values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration error types for metrics configuration validation.

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Bounds are inverted or otherwise inconsistent
    #[error("Invalid range: {0}")]
    InvalidRange(&'static str),

    /// Multipliers are not strictly increasing where they must be
    #[error("Invalid weights: {0}")]
    InvalidWeights(&'static str),

    /// Numeric value outside valid range for parameter
    #[error("Value out of range: {0}")]
    ValueOutOfRange(&'static str),
}
