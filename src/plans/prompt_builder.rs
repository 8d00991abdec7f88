// ABOUTME: Pure construction of a typed plan request from profile, metrics, and macro split
// ABOUTME: Resolves constraints, non-vegetarian days, and the meal schedule before any rendering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Plan Request Builder
//!
//! [`PlanPromptBuilder::build`] is a pure function: the same profile, metrics,
//! split, locale and instructions always produce an equal [`PlanRequest`].
//! No clock, randomness, or I/O is involved, so a request can be rebuilt and
//! compared when a generation needs to be reproduced.

use nutriplan_core::constants::meals::{DEFAULT_MEALS_PER_DAY, EXTRA_MEAL_DEFAULT_TIME};
use nutriplan_core::constants::validation::MAX_MEALS_PER_PLAN;
use nutriplan_core::models::{
    ActivityLevel, DerivedMetrics, DietaryPreference, Gender, Goal, HealthProfile, MacroGrams,
    MacroSplit, Weekday,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Conventional meal names and times for one to five meals per day
const ONE_MEAL: [(&str, &str); 1] = [("Lunch", "13:00")];
const TWO_MEALS: [(&str, &str); 2] = [("Breakfast", "09:00"), ("Dinner", "19:30")];
const THREE_MEALS: [(&str, &str); 3] = [
    ("Breakfast", "08:00"),
    ("Lunch", "13:00"),
    ("Dinner", "20:00"),
];
const FOUR_MEALS: [(&str, &str); 4] = [
    ("Breakfast", "08:00"),
    ("Lunch", "13:00"),
    ("Evening Snack", "17:00"),
    ("Dinner", "20:30"),
];
const FIVE_MEALS: [(&str, &str); 5] = [
    ("Breakfast", "07:30"),
    ("Mid-Morning Snack", "10:30"),
    ("Lunch", "13:00"),
    ("Evening Snack", "16:30"),
    ("Dinner", "20:00"),
];

/// Where the member lives, used to suggest locally available foods
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    /// Country
    pub country: Option<String>,
    /// State or region
    pub state: Option<String>,
    /// City
    pub city: Option<String>,
}

impl Locale {
    /// Set the country
    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Set the state or region
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Set the city
    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Whether no part of the location is known
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.country.is_none() && self.state.is_none() && self.city.is_none()
    }

    /// "City, State, Country" with unknown parts left out
    #[must_use]
    pub fn describe(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.city, &self.state, &self.country]
            .into_iter()
            .filter_map(Option::as_deref)
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }

    fn normalized(&self) -> Self {
        Self {
            country: clean(self.country.as_deref()),
            state: clean(self.state.as_deref()),
            city: clean(self.city.as_deref()),
        }
    }
}

/// Category of a dietary or medical constraint, in rendering order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Vegetarian, vegan, eggetarian, ...
    DietaryPattern,
    /// Religious practice (halal, jain, ...)
    Religious,
    /// Medical condition the plan must accommodate
    MedicalCondition,
    /// Allergen that must never appear
    Allergy,
    /// Restriction such as gluten-free or low sodium
    DietaryRestriction,
}

impl ConstraintKind {
    /// Human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::DietaryPattern => "Dietary pattern",
            Self::Religious => "Religious practice",
            Self::MedicalCondition => "Medical condition",
            Self::Allergy => "Allergy",
            Self::DietaryRestriction => "Dietary restriction",
        }
    }
}

/// A single constraint the generated plan must honour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// Category
    pub kind: ConstraintKind,
    /// Constraint value as entered (trimmed)
    pub value: String,
}

/// Which days may include non-vegetarian dishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", content = "days", rename_all = "snake_case")]
pub enum NonVegPolicy {
    /// Strictly vegetarian member: never
    Never,
    /// Only the listed days; an empty set allows none
    Days(BTreeSet<Weekday>),
}

impl NonVegPolicy {
    /// Whether non-vegetarian dishes are allowed on `day`
    #[must_use]
    pub fn allows(&self, day: Weekday) -> bool {
        match self {
            Self::Never => false,
            Self::Days(days) => days.contains(&day),
        }
    }

    /// Whether at least one day allows non-vegetarian dishes
    #[must_use]
    pub fn allows_any(&self) -> bool {
        matches!(self, Self::Days(days) if !days.is_empty())
    }
}

/// One slot of the daily meal schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMeal {
    /// 1-based position in the day
    pub ordinal: u8,
    /// Meal name
    pub name: String,
    /// Time of day
    pub time: String,
}

/// Profile attributes carried into the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Biological sex
    pub gender: Gender,
    /// Age in years
    pub age: Option<u32>,
    /// Activity level
    pub activity_level: ActivityLevel,
    /// Goal
    pub goal: Goal,
    /// Dietary pattern
    pub dietary_preference: DietaryPreference,
}

/// Immutable, serializable input to plan generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Profile attributes
    pub profile: ProfileSummary,
    /// Metrics derived from the profile
    pub metrics: DerivedMetrics,
    /// Daily calorie target
    pub target_calories: u32,
    /// Macro ratios to follow
    pub macro_split: MacroSplit,
    /// Gram targets for `target_calories`
    pub macro_grams: MacroGrams,
    /// Deduplicated constraints, sorted by kind then value
    pub constraints: Vec<Constraint>,
    /// Non-vegetarian day rule
    pub non_veg: NonVegPolicy,
    /// Meals in order
    pub meal_schedule: Vec<ScheduledMeal>,
    /// Member location
    pub locale: Locale,
    /// Free-text trainer instructions
    pub special_instructions: Option<String>,
}

impl PlanRequest {
    /// Constraints of one kind
    pub fn constraints_of(&self, kind: ConstraintKind) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(move |c| c.kind == kind)
    }
}

/// Builds [`PlanRequest`] values
pub struct PlanPromptBuilder;

impl PlanPromptBuilder {
    /// Assemble the request for one generation
    #[must_use]
    pub fn build(
        profile: &HealthProfile,
        metrics: &DerivedMetrics,
        macro_split: MacroSplit,
        locale: &Locale,
        special_instructions: Option<&str>,
    ) -> PlanRequest {
        PlanRequest {
            profile: ProfileSummary {
                gender: profile.gender,
                age: profile.age,
                activity_level: profile.activity_level,
                goal: profile.goal,
                dietary_preference: profile.dietary_preference,
            },
            metrics: *metrics,
            target_calories: metrics.target_calories,
            macro_split,
            macro_grams: macro_split.grams_for(metrics.target_calories),
            constraints: Self::resolve_constraints(profile),
            non_veg: Self::resolve_non_veg(profile),
            meal_schedule: Self::resolve_meal_schedule(profile),
            locale: locale.normalized(),
            special_instructions: clean(special_instructions),
        }
    }

    /// Merge every dietary and medical input into one list
    ///
    /// Entries are trimmed, blank or "none" entries dropped, and duplicates
    /// within a kind removed ignoring case (the first spelling wins).
    #[must_use]
    pub fn resolve_constraints(profile: &HealthProfile) -> Vec<Constraint> {
        let pattern = (profile.dietary_preference != DietaryPreference::NoPreference)
            .then(|| profile.dietary_preference.as_str().replace('_', "-"));

        let candidates = pattern
            .into_iter()
            .map(|value| (ConstraintKind::DietaryPattern, value))
            .chain(
                clean(profile.religious_preference.as_deref())
                    .map(|value| (ConstraintKind::Religious, value)),
            )
            .chain(
                profile
                    .medical_conditions
                    .entries()
                    .into_iter()
                    .map(|value| (ConstraintKind::MedicalCondition, value)),
            )
            .chain(
                profile
                    .allergies
                    .entries()
                    .into_iter()
                    .map(|value| (ConstraintKind::Allergy, value)),
            )
            .chain(
                profile
                    .dietary_restrictions
                    .iter()
                    .filter_map(|value| clean(Some(value)))
                    .map(|value| (ConstraintKind::DietaryRestriction, value)),
            );

        let mut unique: BTreeMap<(ConstraintKind, String), Constraint> = BTreeMap::new();
        for (kind, value) in candidates {
            unique
                .entry((kind, value.to_lowercase()))
                .or_insert(Constraint { kind, value });
        }
        unique.into_values().collect()
    }

    /// Strictly vegetarian members never get non-vegetarian dishes; everyone
    /// else only on the weekdays they selected
    #[must_use]
    pub fn resolve_non_veg(profile: &HealthProfile) -> NonVegPolicy {
        if profile.dietary_preference.is_strictly_vegetarian() {
            NonVegPolicy::Never
        } else {
            NonVegPolicy::Days(profile.non_veg_days.clone())
        }
    }

    /// Meal names and times from the profile, or conventional defaults
    ///
    /// The count comes from the profile preference, then the number of
    /// timings given, then the default of 3. Counts past the five-meal
    /// template add "Snack N" slots, up to the plan limit. Non-blank timings
    /// replace the default times position by position.
    #[must_use]
    pub fn resolve_meal_schedule(profile: &HealthProfile) -> Vec<ScheduledMeal> {
        let timings: Vec<&str> = profile
            .meal_timings
            .iter()
            .map(String::as_str)
            .map(str::trim)
            .collect();

        let requested = profile.meal_count.map_or_else(
            || {
                if timings.is_empty() {
                    usize::from(DEFAULT_MEALS_PER_DAY)
                } else {
                    timings.len()
                }
            },
            usize::from,
        );
        let count = match requested {
            0 => usize::from(DEFAULT_MEALS_PER_DAY),
            n => n.min(MAX_MEALS_PER_PLAN),
        };
        if count != requested {
            warn!(requested, used = count, "Meal count not schedulable, adjusted");
        }

        let template: &[(&str, &str)] = match count {
            1 => &ONE_MEAL,
            2 => &TWO_MEALS,
            3 => &THREE_MEALS,
            4 => &FOUR_MEALS,
            _ => &FIVE_MEALS,
        };
        let extras = (1..=count.saturating_sub(template.len()))
            .map(|n| (format!("Snack {n}"), EXTRA_MEAL_DEFAULT_TIME));

        template
            .iter()
            .map(|&(name, time)| (name.to_owned(), time))
            .chain(extras)
            .zip(1_u8..)
            .map(|((name, default_time), ordinal)| {
                let time = timings
                    .get(usize::from(ordinal - 1))
                    .copied()
                    .filter(|t| !t.is_empty())
                    .unwrap_or(default_time);
                ScheduledMeal {
                    ordinal,
                    name,
                    time: time.to_owned(),
                }
            })
            .collect()
    }
}

/// Trimmed value, or `None` when blank or "none"
fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("none"))
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutriplan_core::models::ConditionSet;

    #[test]
    fn test_constraints_dedup_ignoring_case() {
        let profile = HealthProfile {
            allergies: ConditionSet::from_named(["Peanuts", "peanuts "]).with_other("PEANUTS"),
            religious_preference: Some("  ".to_owned()),
            ..HealthProfile::default()
        };

        let constraints = PlanPromptBuilder::resolve_constraints(&profile);
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].kind, ConstraintKind::Allergy);
    }

    #[test]
    fn test_timings_override_defaults_positionally() {
        let profile = HealthProfile::default().with_meals(
            Some(4),
            vec!["07:00".to_owned(), String::new(), "16:00".to_owned()],
        );
        let schedule = PlanPromptBuilder::resolve_meal_schedule(&profile);

        let times: Vec<&str> = schedule.iter().map(|m| m.time.as_str()).collect();
        assert_eq!(times, vec!["07:00", "13:00", "16:00", "20:30"]);
    }

    #[test]
    fn test_meal_count_limits() {
        let many = HealthProfile::default().with_meals(Some(40), Vec::new());
        let none = HealthProfile::default().with_meals(Some(0), Vec::new());
        let one = HealthProfile::default().with_meals(Some(1), Vec::new());
        assert_eq!(
            PlanPromptBuilder::resolve_meal_schedule(&many).len(),
            MAX_MEALS_PER_PLAN
        );
        assert_eq!(PlanPromptBuilder::resolve_meal_schedule(&none).len(), 3);

        let single = PlanPromptBuilder::resolve_meal_schedule(&one);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].name, "Lunch");
    }

    #[test]
    fn test_locale_description() {
        let locale = Locale::default().with_country("India").with_city(" Pune ");
        assert_eq!(locale.normalized().describe().as_deref(), Some("Pune, India"));
        assert!(Locale::default().describe().is_none());
    }
}
