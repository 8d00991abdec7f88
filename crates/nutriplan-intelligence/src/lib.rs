// ABOUTME: Pure calculation engine for the nutriplan workspace
// ABOUTME: Health metric derivation (BMI/BMR/TDEE/targets) and macro split resolution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Nutriplan Intelligence
//!
//! Deterministic, side-effect free calculations that turn a member's health
//! profile into the numeric targets a generated plan must honour.
//!
//! - [`metrics::HealthMetricsCalculator`] derives BMI, BMR, TDEE and the daily
//!   calorie target from a [`nutriplan_core::models::HealthProfile`].
//! - [`macro_ratios::MacroRatioResolver`] maps a protein qualifier or goal to a
//!   [`nutriplan_core::models::MacroSplit`].

/// Coefficient tables and their validation
pub mod config;
/// Protein qualifier lookup table
pub mod macro_ratios;
/// BMI, BMR, TDEE and calorie target derivation
pub mod metrics;

pub use config::{ConfigError, MetricsConfig};
pub use macro_ratios::{MacroRatioResolver, ProteinTarget};
pub use metrics::HealthMetricsCalculator;
