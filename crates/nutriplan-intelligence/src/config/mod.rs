// ABOUTME: Metrics configuration tables for the health metrics calculator
// ABOUTME: Bundles BMR coefficients, activity factors, goal multipliers, and fallbacks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Metrics configuration.
//!
//! Every coefficient used by [`crate::metrics::HealthMetricsCalculator`] lives
//! in an explicit, documented table here rather than as a literal in the
//! calculation code.

/// Configuration error types
pub mod error;
/// Nutrition coefficient tables
pub mod nutrition;

pub use error::ConfigError;
pub use nutrition::{
    ActivityFactorsConfig, BmrConfig, CalorieBounds, FallbackAnthropometrics,
    FallbackMeasurements, GoalAdjustmentConfig,
};

use serde::{Deserialize, Serialize};

/// Complete configuration for metric derivation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Mifflin-St Jeor coefficients
    pub bmr: BmrConfig,
    /// TDEE activity multipliers
    pub activity_factors: ActivityFactorsConfig,
    /// Goal calorie multipliers
    pub goal_adjustments: GoalAdjustmentConfig,
    /// Defaults substituted for missing weight/height
    pub fallbacks: FallbackAnthropometrics,
    /// Allowed range of the calorie target
    pub calorie_bounds: CalorieBounds,
}

impl MetricsConfig {
    /// Validate every table
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bmr.validate()?;
        self.activity_factors.validate()?;
        self.goal_adjustments.validate()?;
        self.fallbacks.validate()?;
        self.calorie_bounds.validate()
    }
}
