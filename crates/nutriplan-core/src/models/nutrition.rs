// ABOUTME: Derived health metrics and macronutrient split value types
// ABOUTME: DerivedMetrics (BMI/BMR/TDEE/target calories) and the sum-to-one MacroSplit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::nutrition::{
    CARBS_KCAL_PER_GRAM, FAT_KCAL_PER_GRAM, MACRO_SUM_EPSILON, PROTEIN_KCAL_PER_GRAM,
};
use crate::errors::PlanError;
use serde::{Deserialize, Serialize};

/// Where a measurement used in the calculation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementSource {
    /// Taken from the member's profile
    Reported,
    /// Profile value absent; documented default substituted
    Default,
}

/// Metrics derived from a health profile; recomputed per generation request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Body Mass Index (kg/m^2)
    pub bmi: f64,
    /// Basal Metabolic Rate (kcal/day)
    pub bmr: f64,
    /// Total Daily Energy Expenditure (kcal/day)
    pub tdee: f64,
    /// Daily calorie target, always within the configured bounds
    pub target_calories: u32,
    /// Weight used, in kilograms
    pub weight_kg: f64,
    /// Height used, in centimeters
    pub height_cm: f64,
    /// Whether weight was reported or defaulted
    pub weight_source: MeasurementSource,
    /// Whether height was reported or defaulted
    pub height_source: MeasurementSource,
}

impl DerivedMetrics {
    /// Whether any default was substituted for a missing measurement
    #[must_use]
    pub fn used_defaults(&self) -> bool {
        self.weight_source == MeasurementSource::Default
            || self.height_source == MeasurementSource::Default
    }
}

/// Daily macronutrient gram targets for a calorie budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroGrams {
    /// Protein grams
    pub protein_g: f64,
    /// Carbohydrate grams
    pub carbs_g: f64,
    /// Fat grams
    pub fats_g: f64,
}

/// Share of daily calories from protein, carbohydrates, and fats
///
/// Ratios are each in `[0, 1]` and sum to 1. Deserialization goes through
/// [`MacroSplit::new`], so a serialized split is checked like a constructed one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMacroSplit")]
pub struct MacroSplit {
    protein_ratio: f64,
    carbs_ratio: f64,
    fats_ratio: f64,
}

impl MacroSplit {
    /// Build from basis points (1/10000), failing compilation in const context
    /// unless the parts sum to exactly 10000
    #[must_use]
    pub const fn from_basis_points(protein: u16, carbs: u16, fats: u16) -> Self {
        assert!(
            protein as u32 + carbs as u32 + fats as u32 == 10_000,
            "macro split basis points must sum to 10000"
        );
        Self {
            protein_ratio: protein as f64 / 10_000.0,
            carbs_ratio: carbs as f64 / 10_000.0,
            fats_ratio: fats as f64 / 10_000.0,
        }
    }

    /// Build from ratios, validating range and sum within `tolerance`
    ///
    /// Accepted ratios are rescaled to sum to exactly 1.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::InvalidInput` if any ratio is outside `[0, 1]`, not
    /// finite, or the sum differs from 1 by more than `tolerance`.
    pub fn with_tolerance(
        protein_ratio: f64,
        carbs_ratio: f64,
        fats_ratio: f64,
        tolerance: f64,
    ) -> Result<Self, PlanError> {
        for (name, value) in [
            ("protein", protein_ratio),
            ("carbs", carbs_ratio),
            ("fats", fats_ratio),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(PlanError::invalid_input(format!(
                    "{name} ratio {value} must be between 0 and 1"
                )));
            }
        }

        let sum = protein_ratio + carbs_ratio + fats_ratio;
        if (sum - 1.0).abs() > tolerance {
            return Err(PlanError::invalid_input(format!(
                "macro ratios must sum to 1.0, got {sum:.4}"
            )));
        }

        Ok(Self {
            protein_ratio: protein_ratio / sum,
            carbs_ratio: carbs_ratio / sum,
            fats_ratio: fats_ratio / sum,
        })
    }

    /// Build from ratios that must sum to 1 within rounding error
    ///
    /// # Errors
    ///
    /// Returns `PlanError::InvalidInput` if the ratios are invalid.
    pub fn new(protein_ratio: f64, carbs_ratio: f64, fats_ratio: f64) -> Result<Self, PlanError> {
        Self::with_tolerance(protein_ratio, carbs_ratio, fats_ratio, MACRO_SUM_EPSILON)
    }

    /// Protein share of calories
    #[must_use]
    pub const fn protein_ratio(&self) -> f64 {
        self.protein_ratio
    }

    /// Carbohydrate share of calories
    #[must_use]
    pub const fn carbs_ratio(&self) -> f64 {
        self.carbs_ratio
    }

    /// Fat share of calories
    #[must_use]
    pub const fn fats_ratio(&self) -> f64 {
        self.fats_ratio
    }

    /// Sum of the three ratios
    #[must_use]
    pub fn total(&self) -> f64 {
        self.protein_ratio + self.carbs_ratio + self.fats_ratio
    }

    /// Percentages rounded to whole numbers, for display
    #[must_use]
    pub fn as_percentages(&self) -> (u8, u8, u8) {
        (
            (self.protein_ratio * 100.0).round() as u8,
            (self.carbs_ratio * 100.0).round() as u8,
            (self.fats_ratio * 100.0).round() as u8,
        )
    }

    /// Gram targets for a daily calorie budget
    ///
    /// Protein and carbohydrates yield 4 kcal/g, fat 9 kcal/g.
    #[must_use]
    pub fn grams_for(&self, calories: u32) -> MacroGrams {
        let kcal = f64::from(calories);
        MacroGrams {
            protein_g: kcal * self.protein_ratio / PROTEIN_KCAL_PER_GRAM,
            carbs_g: kcal * self.carbs_ratio / CARBS_KCAL_PER_GRAM,
            fats_g: kcal * self.fats_ratio / FAT_KCAL_PER_GRAM,
        }
    }
}

/// Unchecked wire shape of [`MacroSplit`]
#[derive(Deserialize)]
struct RawMacroSplit {
    protein_ratio: f64,
    carbs_ratio: f64,
    fats_ratio: f64,
}

impl TryFrom<RawMacroSplit> for MacroSplit {
    type Error = PlanError;

    fn try_from(raw: RawMacroSplit) -> Result<Self, Self::Error> {
        Self::new(raw.protein_ratio, raw.carbs_ratio, raw.fats_ratio)
    }
}
