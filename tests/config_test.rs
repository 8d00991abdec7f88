// ABOUTME: Tests for engine configuration loading and validation
// ABOUTME: Covers NUTRIPLAN_* environment parsing, defaults, and range checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use nutriplan::config::generation::{
    CALORIE_TOLERANCE_ENV, MACRO_TOLERANCE_ENV, MAX_TIMEOUT_SECS, MAX_TOKENS_ENV, MODEL_ENV,
    STRICT_RETRY_ENV, TEMPERATURE_ENV, TIMEOUT_ENV,
};
use nutriplan::config::{EngineConfig, Environment, GenerationConfig, LogLevel, MetricsConfig};
use nutriplan::errors::ErrorCode;
use serial_test::serial;
use std::env;
use std::time::Duration;

const GENERATION_VARS: [&str; 7] = [
    MODEL_ENV,
    TEMPERATURE_ENV,
    MAX_TOKENS_ENV,
    TIMEOUT_ENV,
    CALORIE_TOLERANCE_ENV,
    MACRO_TOLERANCE_ENV,
    STRICT_RETRY_ENV,
];

fn clear_generation_env() {
    for name in GENERATION_VARS {
        env::remove_var(name);
    }
}

#[test]
fn test_generation_defaults() {
    let config = GenerationConfig::default();

    assert!(config.model.is_none());
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert!((config.calorie_tolerance - 0.10).abs() < f64::EPSILON);
    assert!((config.macro_tolerance - 0.01).abs() < f64::EPSILON);
    assert!(config.strict_retry);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_generation_from_env_overrides() {
    clear_generation_env();
    env::set_var(MODEL_ENV, "gpt-4o");
    env::set_var(TEMPERATURE_ENV, "0.3");
    env::set_var(TIMEOUT_ENV, "15");
    env::set_var(CALORIE_TOLERANCE_ENV, "0.05");
    env::set_var(STRICT_RETRY_ENV, "false");

    let config = GenerationConfig::from_env().unwrap();

    assert_eq!(config.model.as_deref(), Some("gpt-4o"));
    assert!((config.temperature - 0.3).abs() < f32::EPSILON);
    assert_eq!(config.timeout, Duration::from_secs(15));
    assert!((config.calorie_tolerance - 0.05).abs() < f64::EPSILON);
    assert!(!config.strict_retry);

    clear_generation_env();
}

#[test]
#[serial]
fn test_generation_from_env_blank_values_use_defaults() {
    clear_generation_env();
    env::set_var(MODEL_ENV, "   ");
    env::set_var(MAX_TOKENS_ENV, "");

    let config = GenerationConfig::from_env().unwrap();

    assert!(config.model.is_none());
    assert_eq!(config.max_tokens, GenerationConfig::default().max_tokens);

    clear_generation_env();
}

#[test]
#[serial]
fn test_generation_from_env_rejects_unparseable_value() {
    clear_generation_env();
    env::set_var(TIMEOUT_ENV, "soon");

    let error = GenerationConfig::from_env().unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigError);
    assert!(error.message.contains(TIMEOUT_ENV));

    clear_generation_env();
}

#[test]
#[serial]
fn test_generation_from_env_rejects_out_of_range_value() {
    clear_generation_env();
    env::set_var(MACRO_TOLERANCE_ENV, "1.5");

    let error = GenerationConfig::from_env().unwrap_err();
    assert!(error.message.contains(MACRO_TOLERANCE_ENV));

    clear_generation_env();
}

#[test]
#[serial]
fn test_generation_from_env_rejects_unbounded_timeout() {
    clear_generation_env();
    env::set_var(TIMEOUT_ENV, u64::MAX.to_string());

    let error = GenerationConfig::from_env().unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigError);
    assert!(error.message.contains(TIMEOUT_ENV));

    env::set_var(TIMEOUT_ENV, MAX_TIMEOUT_SECS.to_string());
    let config = GenerationConfig::from_env().unwrap();
    assert_eq!(config.timeout, Duration::from_secs(MAX_TIMEOUT_SECS));

    clear_generation_env();
}

#[test]
fn test_generation_validate_ranges() {
    let hot = GenerationConfig {
        temperature: 2.5,
        ..GenerationConfig::default()
    };
    let zero_timeout = GenerationConfig::default().with_timeout(Duration::ZERO);
    let no_tokens = GenerationConfig {
        max_tokens: 0,
        ..GenerationConfig::default()
    };

    assert!(hot.validate().is_err());
    assert!(zero_timeout.validate().is_err());
    assert!(no_tokens.validate().is_err());
}

#[test]
fn test_engine_config_rejects_bad_metric_tables() {
    let mut metrics = MetricsConfig::default();
    metrics.activity_factors.active = metrics.activity_factors.moderate;
    let config = EngineConfig {
        metrics,
        ..EngineConfig::default()
    };

    let error = config.validate().unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigError);
    assert!(error.message.contains("metrics"));
}

#[test]
#[serial]
fn test_engine_config_from_env() {
    clear_generation_env();
    env::set_var(TIMEOUT_ENV, "30");

    let config = EngineConfig::from_env().unwrap();

    assert_eq!(config.generation.timeout, Duration::from_secs(30));
    assert_eq!(config.metrics, MetricsConfig::default());

    clear_generation_env();
}

#[test]
fn test_core_enums_parse_with_fallback() {
    assert_eq!(LogLevel::from_str_or_default("DEBUG"), LogLevel::Debug);
    assert_eq!(LogLevel::from_str_or_default("verbose"), LogLevel::Info);
    assert_eq!(
        Environment::from_str_or_default("prod"),
        Environment::Production
    );
    assert!(Environment::from_str_or_default("test").is_testing());
    assert_eq!(Environment::from_str_or_default("staging").to_string(), "development");
}
