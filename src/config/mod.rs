// ABOUTME: Configuration management for the plan engine
// ABOUTME: Bundles generation parameters and metric coefficient tables loaded from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! - **types**: log level, environment, and generation backend selection
//! - **generation**: model parameters, timeout, and response tolerances
//!
//! Metric coefficients live in [`nutriplan_intelligence::config`] and are
//! re-exported here.

/// Generation call parameters
pub mod generation;
/// Core configuration enums
pub mod types;

pub use generation::GenerationConfig;
pub use nutriplan_intelligence::config::MetricsConfig;
pub use types::{Environment, LlmProviderType, LogLevel};

use crate::errors::AppError;
use tracing::info;

/// Complete engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Generation parameters
    pub generation: GenerationConfig,
    /// Metric coefficient tables
    pub metrics: MetricsConfig,
}

impl EngineConfig {
    /// Load generation settings from the environment with default metric tables
    ///
    /// # Errors
    ///
    /// Returns a config error if an environment value is invalid.
    pub fn from_env() -> Result<Self, AppError> {
        let config = Self {
            generation: GenerationConfig::from_env()?,
            metrics: MetricsConfig::default(),
        };
        config.validate()?;

        info!(
            model = config.generation.model.as_deref().unwrap_or("<provider default>"),
            timeout_secs = config.generation.timeout.as_secs(),
            strict_retry = config.generation.strict_retry,
            "Engine configuration loaded"
        );
        Ok(config)
    }

    /// Validate every section
    ///
    /// # Errors
    ///
    /// Returns a config error naming the first invalid value.
    pub fn validate(&self) -> Result<(), AppError> {
        self.generation.validate()?;
        self.metrics
            .validate()
            .map_err(|e| AppError::config(format!("Invalid metrics configuration: {e}")))
    }
}
