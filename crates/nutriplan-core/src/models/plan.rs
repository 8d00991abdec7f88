// ABOUTME: Generated diet plan model: ordered meals of itemized foods with macros
// ABOUTME: Immutable once produced; refinement always yields a new GeneratedPlan
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::nutrition::{MacroGrams, MacroSplit};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single food item within a meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    /// Food name
    pub name: String,
    /// Portion description (e.g. "1 cup", "150 g")
    pub portion: String,
    /// Energy in kcal
    pub calories: f64,
    /// Protein grams
    pub protein_g: f64,
    /// Carbohydrate grams
    pub carbs_g: f64,
    /// Fat grams
    pub fats_g: f64,
    /// Optional preparation note
    pub preparation: Option<String>,
}

/// A meal in the daily plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    /// Meal name (e.g. "Breakfast")
    pub name: String,
    /// Time of day (e.g. "08:00")
    pub time_of_day: String,
    /// 1-based position in the day
    pub ordinal: u8,
    /// Items in display order
    pub items: Vec<MealItem>,
}

impl Meal {
    /// Summed calories of all items
    #[must_use]
    pub fn total_calories(&self) -> f64 {
        self.items.iter().map(|item| item.calories).sum()
    }

    /// Summed macro grams of all items
    #[must_use]
    pub fn total_macros(&self) -> MacroGrams {
        self.items.iter().fold(
            MacroGrams {
                protein_g: 0.0,
                carbs_g: 0.0,
                fats_g: 0.0,
            },
            |acc, item| MacroGrams {
                protein_g: acc.protein_g + item.protein_g,
                carbs_g: acc.carbs_g + item.carbs_g,
                fats_g: acc.fats_g + item.fats_g,
            },
        )
    }
}

/// A machine-generated daily diet plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPlan {
    /// Unique id of this generation result (not the persisted plan id)
    pub generation_id: Uuid,
    /// Plan name
    pub name: String,
    /// Plan description
    pub description: String,
    /// Daily calorie target the plan was generated for
    pub target_calories: u32,
    /// Macro ratios the plan follows
    pub macro_ratios: MacroSplit,
    /// Meals in order
    pub meals: Vec<Meal>,
    /// When the plan was produced
    pub generated_at: DateTime<Utc>,
    /// Model that produced the plan
    pub model: String,
}

impl GeneratedPlan {
    /// Summed calories across all meals
    #[must_use]
    pub fn total_calories(&self) -> f64 {
        self.meals.iter().map(Meal::total_calories).sum()
    }

    /// Summed macro grams across all meals
    #[must_use]
    pub fn total_macros(&self) -> MacroGrams {
        self.meals.iter().map(Meal::total_macros).fold(
            MacroGrams {
                protein_g: 0.0,
                carbs_g: 0.0,
                fats_g: 0.0,
            },
            |acc, meal| MacroGrams {
                protein_g: acc.protein_g + meal.protein_g,
                carbs_g: acc.carbs_g + meal.carbs_g,
                fats_g: acc.fats_g + meal.fats_g,
            },
        )
    }

    /// Relative deviation of summed meal calories from the target
    ///
    /// `0.05` means the meals total 5% more or less than `target_calories`.
    #[must_use]
    pub fn calorie_deviation(&self) -> f64 {
        let target = f64::from(self.target_calories);
        if target <= 0.0 {
            return f64::INFINITY;
        }
        (self.total_calories() - target).abs() / target
    }
}
