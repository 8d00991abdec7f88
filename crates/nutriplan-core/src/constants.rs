// ABOUTME: Engine-wide constants organized by domain
// ABOUTME: Energy densities, validation tolerances, and calorie bounds

//! Constants module
//!
//! Values shared between the calculation crate and the generation layer.

/// Nutrition constants
pub mod nutrition {
    /// kcal per gram of protein
    pub const PROTEIN_KCAL_PER_GRAM: f64 = 4.0;
    /// kcal per gram of carbohydrate
    pub const CARBS_KCAL_PER_GRAM: f64 = 4.0;
    /// kcal per gram of fat
    pub const FAT_KCAL_PER_GRAM: f64 = 9.0;
    /// Rounding tolerance for ratios built from exact values
    pub const MACRO_SUM_EPSILON: f64 = 1e-6;
    /// Lowest daily calorie target the engine will produce
    pub const MIN_TARGET_CALORIES: u32 = 100;
    /// Highest daily calorie target the engine will produce
    pub const MAX_TARGET_CALORIES: u32 = 10_000;
}

/// Generated plan validation defaults
pub mod validation {
    /// Allowed relative drift of summed meal calories from the target
    pub const DEFAULT_CALORIE_TOLERANCE: f64 = 0.10;
    /// Allowed absolute drift of the macro ratio sum from 1.0
    pub const DEFAULT_MACRO_TOLERANCE: f64 = 0.01;
    /// Maximum meals accepted in one generated plan
    pub const MAX_MEALS_PER_PLAN: usize = 12;
}

/// Meal scheduling defaults
pub mod meals {
    /// Meal count when the profile has no preference
    pub const DEFAULT_MEALS_PER_DAY: u8 = 3;
    /// Time shown for snack slots past the five-meal template
    pub const EXTRA_MEAL_DEFAULT_TIME: &str = "flexible";
}

/// Service identity
pub mod service_names {
    /// Service name used in structured logs
    pub const NUTRIPLAN_ENGINE: &str = "nutriplan-engine";
}
