// ABOUTME: Nutrition coefficient tables for BMR, TDEE, goal adjustment, and fallbacks
// ABOUTME: Each table documents its source values and validates its own ranges
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Nutrition coefficient tables
//!
//! # Scientific References
//!
//! - BMR: Mifflin et al. (1990) DOI: 10.1093/ajcn/51.2.241
//! - Activity factors: `McArdle`, Katch & Katch (2010), Exercise Physiology

use super::error::ConfigError;
use nutriplan_core::constants::nutrition::{MAX_TARGET_CALORIES, MIN_TARGET_CALORIES};
use nutriplan_core::models::{ActivityLevel, Gender, Goal};
use serde::{Deserialize, Serialize};

/// BMR (Basal Metabolic Rate) calculation configuration
///
/// Reference: Mifflin, M.D., et al. (1990). A new predictive equation for resting energy expenditure.
/// American Journal of Clinical Nutrition, 51(2), 241-247. DOI: 10.1093/ajcn/51.2.241
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmrConfig {
    /// Mifflin-St Jeor weight coefficient (10.0)
    pub msj_weight_coef: f64,
    /// Mifflin-St Jeor height coefficient (6.25)
    pub msj_height_coef: f64,
    /// Mifflin-St Jeor age coefficient (-5.0)
    pub msj_age_coef: f64,
    /// Mifflin-St Jeor male constant (+5)
    pub msj_male_constant: f64,
    /// Mifflin-St Jeor female constant (-161)
    pub msj_female_constant: f64,
    /// Constant for unspecified sex: midpoint of male and female (-78)
    pub msj_unspecified_constant: f64,
    /// Lower bound applied to the BMR result; 0 keeps the plain equation
    /// result and only stops it going negative
    pub min_bmr_kcal: f64,
}

impl Default for BmrConfig {
    fn default() -> Self {
        Self {
            msj_weight_coef: 10.0,
            msj_height_coef: 6.25,
            msj_age_coef: -5.0,
            msj_male_constant: 5.0,
            msj_female_constant: -161.0,
            msj_unspecified_constant: -78.0,
            min_bmr_kcal: 0.0,
        }
    }
}

impl BmrConfig {
    /// Sex-specific constant of the equation
    #[must_use]
    pub const fn constant_for(&self, gender: Gender) -> f64 {
        match gender {
            Gender::Male => self.msj_male_constant,
            Gender::Female => self.msj_female_constant,
            Gender::Unspecified => self.msj_unspecified_constant,
        }
    }

    /// Validate coefficient signs
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValueOutOfRange` for non-positive weight/height
    /// coefficients, a positive age coefficient, or a negative BMR floor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.msj_weight_coef <= 0.0 || self.msj_height_coef <= 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "BMR weight and height coefficients must be positive",
            ));
        }
        if self.msj_age_coef > 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "BMR age coefficient must not be positive",
            ));
        }
        if self.min_bmr_kcal < 0.0 {
            return Err(ConfigError::ValueOutOfRange("BMR floor must not be negative"));
        }
        Ok(())
    }
}

/// Activity factor multipliers for TDEE calculation
///
/// | Level       | Factor | Description                    |
/// |-------------|--------|--------------------------------|
/// | sedentary   | 1.2    | little or no exercise          |
/// | light       | 1.375  | light exercise 1-3 days/week   |
/// | moderate    | 1.55   | moderate exercise 3-5 days/week|
/// | active      | 1.725  | hard exercise 6-7 days/week    |
/// | very active | 1.9    | very hard exercise or labor    |
///
/// Reference: `McArdle`, W.D., Katch, F.I., & Katch, V.L. (2010). Exercise Physiology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityFactorsConfig {
    /// Sedentary: 1.2
    pub sedentary: f64,
    /// Light: 1.375
    pub light: f64,
    /// Moderate: 1.55
    pub moderate: f64,
    /// Active: 1.725
    pub active: f64,
    /// Very active: 1.9
    pub very_active: f64,
}

impl Default for ActivityFactorsConfig {
    fn default() -> Self {
        Self {
            sedentary: 1.2,
            light: 1.375,
            moderate: 1.55,
            active: 1.725,
            very_active: 1.9,
        }
    }
}

impl ActivityFactorsConfig {
    /// Multiplier for an activity level
    #[must_use]
    pub const fn factor_for(&self, level: ActivityLevel) -> f64 {
        match level {
            ActivityLevel::Sedentary => self.sedentary,
            ActivityLevel::Light => self.light,
            ActivityLevel::Moderate => self.moderate,
            ActivityLevel::Active => self.active,
            ActivityLevel::VeryActive => self.very_active,
        }
    }

    /// Validate that factors are at least 1.0 and strictly increasing
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValueOutOfRange` or `ConfigError::InvalidWeights`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = [
            self.sedentary,
            self.light,
            self.moderate,
            self.active,
            self.very_active,
        ];
        if ordered.iter().any(|factor| *factor < 1.0 || *factor > 3.0) {
            return Err(ConfigError::ValueOutOfRange(
                "activity factors must be between 1.0 and 3.0",
            ));
        }
        if ordered.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(ConfigError::InvalidWeights(
                "activity factors must increase with activity level",
            ));
        }
        Ok(())
    }
}

/// Calorie multipliers applied to TDEE per goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalAdjustmentConfig {
    /// Weight loss: 0.8 (20% deficit)
    pub weight_loss: f64,
    /// Maintenance: 1.0
    pub maintenance: f64,
    /// Muscle gain: 1.1 (10% surplus)
    pub muscle_gain: f64,
}

impl Default for GoalAdjustmentConfig {
    fn default() -> Self {
        Self {
            weight_loss: 0.8,
            maintenance: 1.0,
            muscle_gain: 1.1,
        }
    }
}

impl GoalAdjustmentConfig {
    /// Multiplier for a goal
    #[must_use]
    pub const fn multiplier_for(&self, goal: Goal) -> f64 {
        match goal {
            Goal::WeightLoss => self.weight_loss,
            Goal::Maintenance => self.maintenance,
            Goal::MuscleGain => self.muscle_gain,
        }
    }

    /// Validate multiplier ordering
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidWeights` unless loss < maintenance < gain
    /// and all are positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.weight_loss <= 0.0
            || self.weight_loss >= self.maintenance
            || self.maintenance >= self.muscle_gain
        {
            return Err(ConfigError::InvalidWeights(
                "goal multipliers must satisfy 0 < weight_loss < maintenance < muscle_gain",
            ));
        }
        Ok(())
    }
}

/// Default weight and height for one sex
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackMeasurements {
    /// Weight in kilograms
    pub weight_kg: f64,
    /// Height in centimeters
    pub height_cm: f64,
}

/// Defaults substituted when the profile lacks weight or height
///
/// | Sex         | Weight | Height |
/// |-------------|--------|--------|
/// | male        | 70 kg  | 170 cm |
/// | female      | 60 kg  | 160 cm |
/// | unspecified | 65 kg  | 165 cm |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackAnthropometrics {
    /// Male defaults
    pub male: FallbackMeasurements,
    /// Female defaults
    pub female: FallbackMeasurements,
    /// Defaults when sex is not reported
    pub unspecified: FallbackMeasurements,
}

impl Default for FallbackAnthropometrics {
    fn default() -> Self {
        Self {
            male: FallbackMeasurements {
                weight_kg: 70.0,
                height_cm: 170.0,
            },
            female: FallbackMeasurements {
                weight_kg: 60.0,
                height_cm: 160.0,
            },
            unspecified: FallbackMeasurements {
                weight_kg: 65.0,
                height_cm: 165.0,
            },
        }
    }
}

impl FallbackAnthropometrics {
    /// Defaults for a sex
    #[must_use]
    pub const fn for_gender(&self, gender: Gender) -> FallbackMeasurements {
        match gender {
            Gender::Male => self.male,
            Gender::Female => self.female,
            Gender::Unspecified => self.unspecified,
        }
    }

    /// Validate that every default is positive
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValueOutOfRange` for a non-positive default.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let all = [self.male, self.female, self.unspecified];
        if all
            .iter()
            .any(|m| m.weight_kg <= 0.0 || m.height_cm <= 0.0)
        {
            return Err(ConfigError::ValueOutOfRange(
                "fallback weight and height must be positive",
            ));
        }
        Ok(())
    }
}

/// Allowed range of the daily calorie target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalorieBounds {
    /// Minimum kcal/day (100)
    pub min: u32,
    /// Maximum kcal/day (10000)
    pub max: u32,
}

impl Default for CalorieBounds {
    fn default() -> Self {
        Self {
            min: MIN_TARGET_CALORIES,
            max: MAX_TARGET_CALORIES,
        }
    }
}

impl CalorieBounds {
    /// Validate bounds lie within the engine's hard limits
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRange` if `min > max` or either bound
    /// leaves the 100..=10000 window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvalidRange("calorie min exceeds max"));
        }
        if self.min < MIN_TARGET_CALORIES || self.max > MAX_TARGET_CALORIES {
            return Err(ConfigError::InvalidRange(
                "calorie bounds must stay within 100..=10000",
            ));
        }
        Ok(())
    }
}
