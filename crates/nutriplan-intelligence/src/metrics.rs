// ABOUTME: Health metric derivation from a member profile
// ABOUTME: BMI, Mifflin-St Jeor BMR, activity-scaled TDEE, and goal-adjusted calorie target
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Health Metrics Calculator
//!
//! Derives [`DerivedMetrics`] from a [`HealthProfile`]. Every coefficient comes
//! from [`MetricsConfig`]; nothing here is an inline literal.
//!
//! # Scientific References
//!
//! - Mifflin, M.D., et al. (1990). A new predictive equation for resting energy expenditure.
//!   *American Journal of Clinical Nutrition*, 51(2), 241-247.
//!   <https://doi.org/10.1093/ajcn/51.2.241>
//! - `McArdle`, W.D., Katch, F.I., & Katch, V.L. (2010). *Exercise Physiology*.

use crate::config::{ActivityFactorsConfig, BmrConfig, CalorieBounds, MetricsConfig};
use nutriplan_core::errors::PlanError;
use nutriplan_core::models::{
    ActivityLevel, DerivedMetrics, Gender, HealthProfile, MeasurementSource,
};
use tracing::debug;

/// Calculate Body Mass Index (kg/m^2)
///
/// # Errors
///
/// Returns `PlanError::InvalidProfile` if weight or height is not a positive finite number
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> Result<f64, PlanError> {
    validate_measurements(weight_kg, height_cm)?;
    let height_m = height_cm / 100.0;
    Ok(weight_kg / (height_m * height_m))
}

/// Calculate Basal Metabolic Rate using the Mifflin-St Jeor equation (1990)
///
/// Formula: BMR = (10 x `weight_kg`) + (6.25 x `height_cm`) - (5 x age) + `sex_constant`
/// - Men: +5
/// - Women: -161
///
/// The result is floored at `config.min_bmr_kcal`, which defaults to 0.
///
/// # Errors
///
/// Returns `PlanError::InvalidProfile` if age is zero or weight/height is not positive
pub fn calculate_mifflin_st_jeor(
    weight_kg: f64,
    height_cm: f64,
    age: u32,
    gender: Gender,
    config: &BmrConfig,
) -> Result<f64, PlanError> {
    validate_measurements(weight_kg, height_cm)?;
    if age == 0 {
        return Err(PlanError::invalid_profile("age", "must be greater than 0"));
    }

    let weight_component = config.msj_weight_coef * weight_kg;
    let height_component = config.msj_height_coef * height_cm;
    let age_component = config.msj_age_coef * f64::from(age);

    let bmr = weight_component + height_component + age_component + config.constant_for(gender);
    Ok(bmr.max(config.min_bmr_kcal))
}

/// Calculate Total Daily Energy Expenditure
///
/// Formula: TDEE = BMR x activity factor
///
/// # Errors
///
/// Returns `PlanError::InvalidProfile` if BMR is not a positive finite number
pub fn calculate_tdee(
    bmr: f64,
    activity_level: ActivityLevel,
    config: &ActivityFactorsConfig,
) -> Result<f64, PlanError> {
    if !bmr.is_finite() || bmr <= 0.0 {
        return Err(PlanError::invalid_profile("bmr", "must be positive"));
    }
    Ok(bmr * config.factor_for(activity_level))
}

/// Round an adjusted TDEE to whole kcal, clamped into `bounds`
///
/// # Errors
///
/// Returns `PlanError::InvalidProfile` if the adjusted value is not finite
pub fn target_calories(
    tdee: f64,
    goal_multiplier: f64,
    bounds: &CalorieBounds,
) -> Result<u32, PlanError> {
    let adjusted = (tdee * goal_multiplier).round();
    if !adjusted.is_finite() {
        return Err(PlanError::invalid_profile(
            "target_calories",
            "calculation produced a non-finite value",
        ));
    }
    let clamped = adjusted.clamp(f64::from(bounds.min), f64::from(bounds.max));
    Ok(clamped as u32)
}

fn validate_measurements(weight_kg: f64, height_cm: f64) -> Result<(), PlanError> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(PlanError::invalid_profile("weight", "must be greater than 0"));
    }
    if !height_cm.is_finite() || height_cm <= 0.0 {
        return Err(PlanError::invalid_profile("height", "must be greater than 0"));
    }
    Ok(())
}

/// Derives metrics from profiles using a fixed coefficient configuration
#[derive(Debug, Clone, Default)]
pub struct HealthMetricsCalculator {
    config: MetricsConfig,
}

impl HealthMetricsCalculator {
    /// Create a calculator with a custom configuration
    #[must_use]
    pub const fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Derive BMI, BMR, TDEE and the calorie target for a profile
    ///
    /// Missing weight or height is replaced by the sex-specific default from
    /// [`crate::config::FallbackAnthropometrics`] and tagged
    /// [`MeasurementSource::Default`]. A reported value that is zero or
    /// negative is rejected, never defaulted.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::InvalidProfile` if age is missing or zero, or a
    /// reported weight/height is not positive.
    pub fn derive(&self, profile: &HealthProfile) -> Result<DerivedMetrics, PlanError> {
        let age = profile
            .age
            .ok_or_else(|| PlanError::invalid_profile("age", "is required"))?;
        let fallback = self.config.fallbacks.for_gender(profile.gender);

        let (weight_kg, weight_source) = profile.weight.map_or(
            (fallback.weight_kg, MeasurementSource::Default),
            |weight| (weight.to_kg(), MeasurementSource::Reported),
        );
        let (height_cm, height_source) = profile.height.map_or(
            (fallback.height_cm, MeasurementSource::Default),
            |height| (height.to_cm(), MeasurementSource::Reported),
        );

        let bmi = calculate_bmi(weight_kg, height_cm)?;
        let bmr =
            calculate_mifflin_st_jeor(weight_kg, height_cm, age, profile.gender, &self.config.bmr)?;
        let tdee = calculate_tdee(bmr, profile.activity_level, &self.config.activity_factors)?;
        let target = target_calories(
            tdee,
            self.config.goal_adjustments.multiplier_for(profile.goal),
            &self.config.calorie_bounds,
        )?;

        debug!(
            bmi,
            bmr,
            tdee,
            target_calories = target,
            goal = profile.goal.as_str(),
            activity = profile.activity_level.as_str(),
            defaulted = weight_source == MeasurementSource::Default
                || height_source == MeasurementSource::Default,
            "Derived health metrics"
        );

        Ok(DerivedMetrics {
            bmi,
            bmr,
            tdee,
            target_calories: target,
            weight_kg,
            height_cm,
            weight_source,
            height_source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi() {
        let bmi = calculate_bmi(70.0, 175.0).unwrap();
        assert!((bmi - 22.857).abs() < 0.001);
    }

    #[test]
    fn test_bmr_male() {
        let bmr = calculate_mifflin_st_jeor(80.0, 180.0, 30, Gender::Male, &BmrConfig::default())
            .unwrap();
        // 800 + 1125 - 150 + 5
        assert!((bmr - 1780.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_profile_keeps_equation_result() {
        let bmr = calculate_mifflin_st_jeor(30.0, 120.0, 90, Gender::Female, &BmrConfig::default())
            .unwrap();
        // 300 + 750 - 450 - 161
        assert!((bmr - 439.0).abs() < 1e-9);
    }

    #[test]
    fn test_configured_bmr_floor() {
        let config = BmrConfig {
            min_bmr_kcal: 1000.0,
            ..BmrConfig::default()
        };
        let bmr = calculate_mifflin_st_jeor(30.0, 120.0, 90, Gender::Female, &config).unwrap();
        assert!((bmr - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_bmr_never_negative() {
        let bmr = calculate_mifflin_st_jeor(2.0, 20.0, 120, Gender::Female, &BmrConfig::default())
            .unwrap();
        assert!(bmr.abs() < 1e-9);
    }

    #[test]
    fn test_zero_age_rejected() {
        let result = calculate_mifflin_st_jeor(70.0, 170.0, 0, Gender::Male, &BmrConfig::default());
        assert!(matches!(
            result,
            Err(PlanError::InvalidProfile { field: "age", .. })
        ));
    }

    #[test]
    fn test_target_clamped_to_bounds() {
        let bounds = CalorieBounds::default();
        assert_eq!(target_calories(50_000.0, 1.1, &bounds).unwrap(), 10_000);
        assert_eq!(target_calories(50.0, 0.8, &bounds).unwrap(), 100);
        assert!(target_calories(f64::NAN, 1.0, &bounds).is_err());
    }
}
