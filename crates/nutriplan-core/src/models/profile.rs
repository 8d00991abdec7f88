// ABOUTME: Member health profile model consumed read-only by the plan engine
// ABOUTME: Anthropometrics with units, activity level, goal, and dietary/medical constraints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Kilograms per pound
const KG_PER_LB: f64 = 0.453_592_37;
/// Centimeters per inch
const CM_PER_INCH: f64 = 2.54;
/// Centimeters per foot
const CM_PER_FOOT: f64 = 30.48;

/// Biological sex used by the BMR equation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male (+5 kcal BMR constant)
    Male,
    /// Female (-161 kcal BMR constant)
    Female,
    /// Not reported or non-binary
    #[default]
    #[serde(alias = "other")]
    Unspecified,
}

/// Weight unit as entered in the profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    /// Kilograms
    #[default]
    Kg,
    /// Pounds
    #[serde(alias = "lbs")]
    Lb,
}

/// Height unit as entered in the profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    /// Centimeters
    #[default]
    Cm,
    /// Meters
    M,
    /// Inches
    #[serde(alias = "inch")]
    In,
    /// Feet (fractional)
    Ft,
}

/// Body weight measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    /// Numeric value in `unit`
    pub value: f64,
    /// Unit of `value`
    pub unit: WeightUnit,
}

impl Weight {
    /// Weight in kilograms
    #[must_use]
    pub const fn kg(value: f64) -> Self {
        Self {
            value,
            unit: WeightUnit::Kg,
        }
    }

    /// Weight in pounds
    #[must_use]
    pub const fn lb(value: f64) -> Self {
        Self {
            value,
            unit: WeightUnit::Lb,
        }
    }

    /// Convert to kilograms
    #[must_use]
    pub fn to_kg(&self) -> f64 {
        match self.unit {
            WeightUnit::Kg => self.value,
            WeightUnit::Lb => self.value * KG_PER_LB,
        }
    }
}

/// Body height measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Height {
    /// Numeric value in `unit`
    pub value: f64,
    /// Unit of `value`
    pub unit: HeightUnit,
}

impl Height {
    /// Height in centimeters
    #[must_use]
    pub const fn cm(value: f64) -> Self {
        Self {
            value,
            unit: HeightUnit::Cm,
        }
    }

    /// Height in inches
    #[must_use]
    pub const fn inches(value: f64) -> Self {
        Self {
            value,
            unit: HeightUnit::In,
        }
    }

    /// Convert to centimeters
    #[must_use]
    pub fn to_cm(&self) -> f64 {
        match self.unit {
            HeightUnit::Cm => self.value,
            HeightUnit::M => self.value * 100.0,
            HeightUnit::In => self.value * CM_PER_INCH,
            HeightUnit::Ft => self.value * CM_PER_FOOT,
        }
    }
}

/// Activity level for TDEE calculation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    #[default]
    Sedentary,
    /// Light exercise 1-3 days/week
    #[serde(alias = "lightly_active")]
    Light,
    /// Moderate exercise 3-5 days/week
    #[serde(alias = "moderately_active")]
    Moderate,
    /// Hard exercise 6-7 days/week
    Active,
    /// Very hard exercise or physical job
    #[serde(alias = "very-active", alias = "extra_active")]
    VeryActive,
}

impl ActivityLevel {
    /// Stable label used in prompts and logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sedentary => "sedentary",
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Active => "active",
            Self::VeryActive => "very_active",
        }
    }
}

/// Body composition goal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    /// Caloric deficit
    WeightLoss,
    /// Caloric balance
    #[default]
    Maintenance,
    /// Caloric surplus
    MuscleGain,
}

impl Goal {
    /// Stable label used in prompts and logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WeightLoss => "weight_loss",
            Self::Maintenance => "maintenance",
            Self::MuscleGain => "muscle_gain",
        }
    }
}

/// Dietary pattern of the member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietaryPreference {
    /// No meat, fish, or eggs
    #[serde(alias = "veg")]
    Vegetarian,
    /// No animal products
    Vegan,
    /// Vegetarian plus eggs
    Eggetarian,
    /// Vegetarian plus fish
    Pescatarian,
    /// Eats meat
    #[serde(alias = "non-vegetarian", alias = "non_veg")]
    NonVegetarian,
    /// No stated preference
    #[default]
    NoPreference,
}

impl DietaryPreference {
    /// Whether no day may include non-vegetarian dishes
    ///
    /// Eggetarian members eat eggs but never meat or fish, so they count as
    /// strictly vegetarian here. Pescatarian members follow their selected days.
    #[must_use]
    pub const fn is_strictly_vegetarian(&self) -> bool {
        matches!(self, Self::Vegetarian | Self::Vegan | Self::Eggetarian)
    }

    /// Stable label used in prompts
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vegetarian => "vegetarian",
            Self::Vegan => "vegan",
            Self::Eggetarian => "eggetarian",
            Self::Pescatarian => "pescatarian",
            Self::NonVegetarian => "non_vegetarian",
            Self::NoPreference => "no_preference",
        }
    }
}

/// Day of the week, ordered Monday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    /// Monday
    Monday,
    /// Tuesday
    Tuesday,
    /// Wednesday
    Wednesday,
    /// Thursday
    Thursday,
    /// Friday
    Friday,
    /// Saturday
    Saturday,
    /// Sunday
    Sunday,
}

impl Weekday {
    /// All weekdays in calendar order
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Capitalized English name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of named entries plus an optional free-text "other" entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSet {
    /// Named entries picked from a list
    #[serde(default)]
    pub named: BTreeSet<String>,
    /// Free-text entry
    #[serde(default)]
    pub other: Option<String>,
}

impl ConditionSet {
    /// Build from named entries
    #[must_use]
    pub fn from_named<I, S>(named: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            named: named.into_iter().map(Into::into).collect(),
            other: None,
        }
    }

    /// Set the free-text entry
    #[must_use]
    pub fn with_other(mut self, other: impl Into<String>) -> Self {
        self.other = Some(other.into());
        self
    }

    /// All non-blank entries, trimmed, named first then the free-text entry
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.named
            .iter()
            .map(String::as_str)
            .chain(self.other.as_deref())
            .map(str::trim)
            .filter(|entry| !entry.is_empty() && !entry.eq_ignore_ascii_case("none"))
            .map(ToOwned::to_owned)
            .collect()
    }
}

/// Member health profile, fetched from the member-profile service
///
/// Absent measurements are `None`, never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthProfile {
    /// Biological sex
    #[serde(default)]
    pub gender: Gender,
    /// Age in years
    pub age: Option<u32>,
    /// Body weight
    pub weight: Option<Weight>,
    /// Body height
    pub height: Option<Height>,
    /// Activity level
    #[serde(default)]
    pub activity_level: ActivityLevel,
    /// Body composition goal
    #[serde(default)]
    pub goal: Goal,
    /// Dietary pattern
    #[serde(default)]
    pub dietary_preference: DietaryPreference,
    /// Religious dietary practice (e.g. "halal", "jain")
    #[serde(default)]
    pub religious_preference: Option<String>,
    /// Medical conditions
    #[serde(default)]
    pub medical_conditions: ConditionSet,
    /// Food allergies
    #[serde(default)]
    pub allergies: ConditionSet,
    /// Dietary restrictions (e.g. "gluten-free", "low sodium")
    #[serde(default)]
    pub dietary_restrictions: BTreeSet<String>,
    /// Preferred number of meals per day
    #[serde(default)]
    pub meal_count: Option<u8>,
    /// Preferred meal times, in meal order (e.g. "07:30")
    #[serde(default)]
    pub meal_timings: Vec<String>,
    /// Weekdays on which non-vegetarian dishes are allowed
    #[serde(default)]
    pub non_veg_days: BTreeSet<Weekday>,
}

impl HealthProfile {
    /// Create a profile with the fields the metrics calculation needs
    #[must_use]
    pub fn new(gender: Gender, age: u32, activity_level: ActivityLevel, goal: Goal) -> Self {
        Self {
            gender,
            age: Some(age),
            activity_level,
            goal,
            ..Self::default()
        }
    }

    /// Set body weight
    #[must_use]
    pub const fn with_weight(mut self, weight: Weight) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Set body height
    #[must_use]
    pub const fn with_height(mut self, height: Height) -> Self {
        self.height = Some(height);
        self
    }

    /// Set dietary preference
    #[must_use]
    pub const fn with_dietary_preference(mut self, preference: DietaryPreference) -> Self {
        self.dietary_preference = preference;
        self
    }

    /// Set the weekdays on which non-vegetarian dishes are allowed
    #[must_use]
    pub fn with_non_veg_days<I: IntoIterator<Item = Weekday>>(mut self, days: I) -> Self {
        self.non_veg_days = days.into_iter().collect();
        self
    }

    /// Set preferred meal count and timings
    #[must_use]
    pub fn with_meals(mut self, count: Option<u8>, timings: Vec<String>) -> Self {
        self.meal_count = count;
        self.meal_timings = timings;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversion() {
        assert!((Weight::lb(154.0).to_kg() - 69.853).abs() < 0.01);
        assert!((Height::inches(70.0).to_cm() - 177.8).abs() < 1e-9);
        let meters = Height {
            value: 1.72,
            unit: HeightUnit::M,
        };
        assert!((meters.to_cm() - 172.0).abs() < 1e-9);
    }

    #[test]
    fn test_condition_entries_skip_blank_and_none() {
        let set = ConditionSet::from_named(["diabetes", " "]).with_other("None");
        assert_eq!(set.entries(), vec!["diabetes".to_owned()]);
    }

    #[test]
    fn test_profile_deserializes_with_defaults() {
        let json = r#"{"gender":"female","age":30,"weight":{"value":60,"unit":"kg"},"height":null,"activity_level":"very-active"}"#;
        let profile: HealthProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.gender, Gender::Female);
        assert_eq!(profile.activity_level, ActivityLevel::VeryActive);
        assert_eq!(profile.goal, Goal::Maintenance);
        assert!(profile.height.is_none());
        assert!(profile.non_veg_days.is_empty());
    }
}
