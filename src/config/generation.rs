// ABOUTME: Generation call parameters and response validation tolerances
// ABOUTME: Loaded from NUTRIPLAN_* environment variables with documented defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AppError;
use nutriplan_core::constants::validation::{DEFAULT_CALORIE_TOLERANCE, DEFAULT_MACRO_TOLERANCE};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable for the model identifier
pub const MODEL_ENV: &str = "NUTRIPLAN_LLM_MODEL";
/// Environment variable for sampling temperature
pub const TEMPERATURE_ENV: &str = "NUTRIPLAN_LLM_TEMPERATURE";
/// Environment variable for maximum output tokens
pub const MAX_TOKENS_ENV: &str = "NUTRIPLAN_LLM_MAX_TOKENS";
/// Environment variable for the overall generation timeout in seconds
pub const TIMEOUT_ENV: &str = "NUTRIPLAN_GENERATION_TIMEOUT_SECS";
/// Environment variable for the meal calorie tolerance
pub const CALORIE_TOLERANCE_ENV: &str = "NUTRIPLAN_CALORIE_TOLERANCE";
/// Environment variable for the macro ratio sum tolerance
pub const MACRO_TOLERANCE_ENV: &str = "NUTRIPLAN_MACRO_TOLERANCE";
/// Environment variable toggling the strict JSON retry
pub const STRICT_RETRY_ENV: &str = "NUTRIPLAN_STRICT_RETRY";

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 4096;
const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Longest accepted generation timeout
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Parameters for every generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Model identifier; `None` uses the provider default
    pub model: Option<String>,
    /// Sampling temperature for the first attempt
    pub temperature: f32,
    /// Maximum output tokens
    pub max_tokens: u32,
    /// Deadline for one generate or regenerate call, retry included
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Allowed relative drift of summed meal calories from the target
    pub calorie_tolerance: f64,
    /// Allowed drift of the macro ratio sum from 1.0
    pub macro_tolerance: f64,
    /// Retry once with a stricter JSON-only instruction after a parse failure
    pub strict_retry: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            calorie_tolerance: DEFAULT_CALORIE_TOLERANCE,
            macro_tolerance: DEFAULT_MACRO_TOLERANCE,
            strict_retry: true,
        }
    }
}

impl GenerationConfig {
    /// Load from environment variables, falling back to defaults for unset ones
    ///
    /// # Errors
    ///
    /// Returns a config error if a variable is set but cannot be parsed, or
    /// the resulting configuration fails [`Self::validate`].
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();
        let config = Self {
            model: env::var(MODEL_ENV).ok().filter(|m| !m.trim().is_empty()),
            temperature: parse_env(TEMPERATURE_ENV)?.unwrap_or(defaults.temperature),
            max_tokens: parse_env(MAX_TOKENS_ENV)?.unwrap_or(defaults.max_tokens),
            timeout: parse_env::<u64>(TIMEOUT_ENV)?
                .map_or(defaults.timeout, Duration::from_secs),
            calorie_tolerance: parse_env(CALORIE_TOLERANCE_ENV)?
                .unwrap_or(defaults.calorie_tolerance),
            macro_tolerance: parse_env(MACRO_TOLERANCE_ENV)?.unwrap_or(defaults.macro_tolerance),
            strict_retry: env::var(STRICT_RETRY_ENV)
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.strict_retry),
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the overall timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the model identifier
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns a config error for a temperature outside 0..=2, zero tokens,
    /// a timeout of zero or above [`MAX_TIMEOUT_SECS`], or a tolerance outside (0, 1).
    pub fn validate(&self) -> Result<(), AppError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::config(format!(
                "{TEMPERATURE_ENV} must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(AppError::config(format!("{MAX_TOKENS_ENV} must be positive")));
        }
        if self.timeout.is_zero() {
            return Err(AppError::config(format!("{TIMEOUT_ENV} must be positive")));
        }
        if self.timeout > Duration::from_secs(MAX_TIMEOUT_SECS) {
            return Err(AppError::config(format!(
                "{TIMEOUT_ENV} must be at most {MAX_TIMEOUT_SECS}, got {}",
                self.timeout.as_secs()
            )));
        }
        for (name, value) in [
            (CALORIE_TOLERANCE_ENV, self.calorie_tolerance),
            (MACRO_TOLERANCE_ENV, self.macro_tolerance),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(AppError::config(format!(
                    "{name} must be between 0 and 1, got {value}"
                )));
            }
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>, AppError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::config(format!("{name} has invalid value '{raw}'"))),
        _ => Ok(None),
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
