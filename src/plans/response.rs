// ABOUTME: Parses and validates generation service replies into GeneratedPlan values
// ABOUTME: Tolerates markdown fences and percentage macros; rejects calorie or macro drift
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Reply Parsing
//!
//! The generation service answers with free text that should contain one JSON
//! object. [`parse_plan`] locates the object, deserializes it into lenient wire
//! structs, then checks it against the request:
//!
//! - at least one meal, each with at least one item
//! - macro ratios sum to 1 within the macro tolerance (percentages summing
//!   to 100 are accepted and scaled)
//! - the declared target matches the requested target within the calorie
//!   tolerance
//! - summed item calories are within the calorie tolerance of the target
//!
//! Every failure is a [`PlanError::GenerationParse`] carrying an excerpt of
//! the raw reply.

use chrono::Utc;
use nutriplan_core::constants::validation::MAX_MEALS_PER_PLAN;
use nutriplan_core::errors::PlanError;
use nutriplan_core::models::{GeneratedPlan, MacroSplit, Meal, MealItem};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct WirePlan {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(alias = "targetCalories", alias = "total_calories")]
    target_calories: f64,
    #[serde(alias = "macroRatios", alias = "macros")]
    macro_ratios: WireMacros,
    meals: Vec<WireMeal>,
}

#[derive(Debug, Deserialize)]
struct WireMacros {
    #[serde(alias = "protein", alias = "proteinRatio")]
    protein_ratio: f64,
    #[serde(alias = "carbs", alias = "carbohydrates", alias = "carbsRatio")]
    carbs_ratio: f64,
    #[serde(alias = "fats", alias = "fat", alias = "fatsRatio")]
    fats_ratio: f64,
}

#[derive(Debug, Deserialize)]
struct WireMeal {
    #[serde(default)]
    ordinal: Option<u32>,
    name: String,
    #[serde(default, alias = "time", alias = "timeOfDay")]
    time_of_day: String,
    #[serde(default, alias = "foods")]
    items: Vec<WireItem>,
}

#[derive(Debug, Deserialize)]
struct WireItem {
    name: String,
    #[serde(default, alias = "quantity", alias = "serving")]
    portion: String,
    calories: f64,
    #[serde(default, alias = "protein")]
    protein_g: f64,
    #[serde(default, alias = "carbs")]
    carbs_g: f64,
    #[serde(default, alias = "fats", alias = "fat")]
    fats_g: f64,
    #[serde(default)]
    preparation: Option<String>,
}

/// Locate the JSON object in a reply
///
/// Prefers the body of a fenced code block; otherwise takes the span from the
/// first `{` to the last `}`.
#[must_use]
pub fn extract_json(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(trimmed);
    }

    if let Some(fence_start) = trimmed.find("```") {
        let after_fence = &trimmed[fence_start + 3..];
        let body_start = after_fence.find('\n').map_or(0, |i| i + 1);
        let body = &after_fence[body_start..];
        if let Some(fence_end) = body.find("```") {
            let inner = body[..fence_end].trim();
            if inner.starts_with('{') {
                return Some(inner);
            }
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (end > start).then(|| &trimmed[start..=end])
}

/// Parse and validate a reply against the requested calorie target
///
/// # Errors
///
/// Returns `PlanError::GenerationParse` if the reply has no JSON object, does
/// not match the plan shape, or fails a numeric check.
pub fn parse_plan(
    raw: &str,
    expected_target: u32,
    calorie_tolerance: f64,
    macro_tolerance: f64,
    model: &str,
) -> Result<GeneratedPlan, PlanError> {
    let reject = |reason: String| PlanError::generation_parse(reason, raw);

    let json = extract_json(raw).ok_or_else(|| reject("no JSON object in reply".to_owned()))?;
    let wire: WirePlan = serde_json::from_str(json)
        .map_err(|e| reject(format!("reply does not match plan shape: {e}")))?;

    if wire.name.trim().is_empty() {
        return Err(reject("plan name is empty".to_owned()));
    }
    if wire.meals.is_empty() {
        return Err(reject("plan has no meals".to_owned()));
    }
    if wire.meals.len() > MAX_MEALS_PER_PLAN {
        return Err(reject(format!(
            "plan has {} meals, at most {MAX_MEALS_PER_PLAN} allowed",
            wire.meals.len()
        )));
    }

    let macro_ratios = validate_macros(&wire.macro_ratios, macro_tolerance).map_err(reject)?;
    validate_declared_target(wire.target_calories, expected_target, calorie_tolerance)
        .map_err(reject)?;
    let meals = convert_meals(wire.meals).map_err(reject)?;

    let plan = GeneratedPlan {
        generation_id: Uuid::new_v4(),
        name: wire.name.trim().to_owned(),
        description: wire.description.trim().to_owned(),
        target_calories: expected_target,
        macro_ratios,
        meals,
        generated_at: Utc::now(),
        model: model.to_owned(),
    };

    let deviation = plan.calorie_deviation();
    if deviation > calorie_tolerance {
        return Err(reject(format!(
            "meal calories total {:.0} kcal, {:.1}% away from the {expected_target} kcal target",
            plan.total_calories(),
            deviation * 100.0
        )));
    }

    Ok(plan)
}

fn validate_macros(macros: &WireMacros, tolerance: f64) -> Result<MacroSplit, String> {
    let (mut protein, mut carbs, mut fats) =
        (macros.protein_ratio, macros.carbs_ratio, macros.fats_ratio);

    let sum = protein + carbs + fats;
    if (sum - 100.0).abs() <= tolerance * 100.0 {
        protein /= 100.0;
        carbs /= 100.0;
        fats /= 100.0;
    }

    MacroSplit::with_tolerance(protein, carbs, fats, tolerance).map_err(|e| match e {
        PlanError::InvalidInput(message) => message,
        other => other.to_string(),
    })
}

fn validate_declared_target(declared: f64, expected: u32, tolerance: f64) -> Result<(), String> {
    if !declared.is_finite() || declared <= 0.0 {
        return Err(format!("declared target_calories {declared} is not positive"));
    }
    let expected = f64::from(expected);
    let drift = (declared - expected).abs() / expected;
    if drift > tolerance {
        return Err(format!(
            "declared target_calories {declared:.0} differs from requested {expected:.0}"
        ));
    }
    Ok(())
}

fn convert_meals(mut wire_meals: Vec<WireMeal>) -> Result<Vec<Meal>, String> {
    // Meals without an ordinal keep reply order after the numbered ones
    wire_meals.sort_by_key(|meal| meal.ordinal.unwrap_or(u32::MAX));

    wire_meals
        .into_iter()
        .zip(1_u8..)
        .map(|(meal, ordinal)| {
            let name = meal.name.trim().to_owned();
            if meal.items.is_empty() {
                return Err(format!("meal '{name}' has no items"));
            }
            let items = meal
                .items
                .into_iter()
                .map(|item| convert_item(item, &name))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Meal {
                name,
                time_of_day: meal.time_of_day.trim().to_owned(),
                ordinal,
                items,
            })
        })
        .collect()
}

fn convert_item(item: WireItem, meal_name: &str) -> Result<MealItem, String> {
    for (field, value) in [
        ("calories", item.calories),
        ("protein_g", item.protein_g),
        ("carbs_g", item.carbs_g),
        ("fats_g", item.fats_g),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!(
                "item '{}' in '{meal_name}' has invalid {field} {value}",
                item.name
            ));
        }
    }

    Ok(MealItem {
        name: item.name.trim().to_owned(),
        portion: item.portion.trim().to_owned(),
        calories: item.calories,
        protein_g: item.protein_g,
        carbs_g: item.carbs_g,
        fats_g: item.fats_g,
        preparation: item
            .preparation
            .map(|p| p.trim().to_owned())
            .filter(|p| !p.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"{
        "name": "Lean Day",
        "description": "Vegetarian cut",
        "target_calories": 1600,
        "macro_ratios": {"protein_ratio": 0.4, "carbs_ratio": 0.3, "fats_ratio": 0.3},
        "meals": [
            {"ordinal": 2, "name": "Dinner", "time_of_day": "20:00",
             "items": [{"name": "Dal", "portion": "1 bowl", "calories": 800, "protein_g": 40, "carbs_g": 60, "fats_g": 20}]},
            {"ordinal": 1, "name": "Breakfast", "time_of_day": "08:00",
             "items": [{"name": "Paneer bhurji", "portion": "150 g", "calories": 800, "protein_g": 50, "carbs_g": 20, "fats_g": 30}]}
        ]
    }"#;

    #[test]
    fn test_extract_json_from_fenced_reply() {
        let raw = format!("Here is your plan:\n```json\n{PLAN}\n```\nEnjoy!");
        let json = extract_json(&raw).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
    }

    #[test]
    fn test_meals_sorted_by_ordinal() {
        let plan = parse_plan(PLAN, 1600, 0.10, 0.01, "test-model").unwrap();
        assert_eq!(plan.meals[0].name, "Breakfast");
        assert_eq!(plan.meals[1].ordinal, 2);
        assert_eq!(plan.model, "test-model");
    }

    #[test]
    fn test_percentage_macros_are_scaled() {
        let raw = PLAN.replace(
            r#""protein_ratio": 0.4, "carbs_ratio": 0.3, "fats_ratio": 0.3"#,
            r#""protein": 40, "carbs": 30, "fats": 30"#,
        );
        let plan = parse_plan(&raw, 1600, 0.10, 0.01, "m").unwrap();
        assert!((plan.macro_ratios.protein_ratio() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_no_json_is_parse_error() {
        let err = parse_plan("Sorry, I cannot help", 1600, 0.10, 0.01, "m").unwrap_err();
        assert!(matches!(err, PlanError::GenerationParse { .. }));
    }
}
