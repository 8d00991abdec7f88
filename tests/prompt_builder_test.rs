// ABOUTME: Integration tests for plan request building and rendering
// ABOUTME: Covers purity, constraint merging, non-veg day rules, meal schedules, and message layout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{female_profile, male_profile, request_for};
use nutriplan::intelligence::{HealthMetricsCalculator, MacroRatioResolver};
use nutriplan::llm::{LlmCapabilities, MessageRole};
use nutriplan::models::{
    ConditionSet, ConversationRole, ConversationTranscript, DietaryPreference, Weekday,
};
use nutriplan::plans::{
    render_messages, render_request, ConstraintKind, Locale, NonVegPolicy, PlanPromptBuilder,
};
use std::collections::BTreeSet;

#[test]
fn test_build_is_pure() {
    let profile = female_profile();
    let first = request_for(&profile);
    let second = request_for(&profile);

    assert_eq!(first, second);
    assert_eq!(render_request(&first), render_request(&second));
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[test]
fn test_request_carries_targets() {
    let request = request_for(&female_profile());

    assert_eq!(request.target_calories, 1598);
    assert_eq!(request.metrics.target_calories, 1598);
    assert!((request.macro_split.protein_ratio() - 0.40).abs() < 1e-9);
    assert!((request.macro_grams.protein_g - 159.8).abs() < 1e-9);
    assert_eq!(request.locale.describe().as_deref(), Some("Pune, India"));
}

#[test]
fn test_strict_vegetarian_never_allows_non_veg() {
    let profile = female_profile().with_non_veg_days([Weekday::Sunday]);
    let request = request_for(&profile);

    assert_eq!(request.non_veg, NonVegPolicy::Never);
    assert!(!request.non_veg.allows(Weekday::Sunday));
    assert!(render_request(&request).contains("strictly vegetarian"));
}

#[test]
fn test_eggetarian_never_allows_non_veg() {
    let profile = male_profile()
        .with_dietary_preference(DietaryPreference::Eggetarian)
        .with_non_veg_days([Weekday::Saturday, Weekday::Sunday]);
    let request = request_for(&profile);

    assert_eq!(request.non_veg, NonVegPolicy::Never);
    assert!(!request.non_veg.allows(Weekday::Saturday));
    assert!(render_request(&request).contains("Not allowed on any day"));
}

#[test]
fn test_pescatarian_follows_selected_days() {
    let profile = male_profile()
        .with_dietary_preference(DietaryPreference::Pescatarian)
        .with_non_veg_days([Weekday::Thursday]);
    let request = request_for(&profile);

    assert_eq!(
        request.non_veg,
        NonVegPolicy::Days(BTreeSet::from([Weekday::Thursday]))
    );
    assert!(request.non_veg.allows(Weekday::Thursday));
    assert!(!request.non_veg.allows(Weekday::Friday));
    assert!(render_request(&request).contains("Allowed only on: Thursday"));
}

#[test]
fn test_non_vegetarian_only_on_selected_days() {
    let profile = male_profile()
        .with_dietary_preference(DietaryPreference::NonVegetarian)
        .with_non_veg_days([Weekday::Friday, Weekday::Monday]);
    let request = request_for(&profile);

    assert!(request.non_veg.allows(Weekday::Monday));
    assert!(request.non_veg.allows(Weekday::Friday));
    assert!(!request.non_veg.allows(Weekday::Tuesday));
    assert!(render_request(&request).contains("Allowed only on: Monday, Friday"));
}

#[test]
fn test_no_selected_days_means_none() {
    let profile = male_profile().with_dietary_preference(DietaryPreference::NonVegetarian);
    let request = request_for(&profile);

    assert_eq!(request.non_veg, NonVegPolicy::Days(BTreeSet::new()));
    assert!(!request.non_veg.allows_any());
}

#[test]
fn test_constraints_merged_and_sorted() {
    let mut profile = female_profile();
    profile.religious_preference = Some("Jain".to_owned());
    profile.medical_conditions = ConditionSet::from_named(["PCOS"]).with_other("thyroid");
    profile.allergies = ConditionSet::from_named(["peanuts"]);
    profile.dietary_restrictions = ["gluten-free".to_owned(), "Gluten-Free".to_owned()].into();

    let request = request_for(&profile);
    let kinds: Vec<ConstraintKind> = request.constraints.iter().map(|c| c.kind).collect();

    assert_eq!(
        kinds,
        vec![
            ConstraintKind::DietaryPattern,
            ConstraintKind::Religious,
            ConstraintKind::MedicalCondition,
            ConstraintKind::MedicalCondition,
            ConstraintKind::Allergy,
            ConstraintKind::DietaryRestriction,
        ]
    );
    assert_eq!(
        request
            .constraints_of(ConstraintKind::MedicalCondition)
            .map(|c| c.value.as_str())
            .collect::<Vec<_>>(),
        vec!["PCOS", "thyroid"]
    );

    let text = render_request(&request);
    assert!(text.contains("- Allergy: peanuts"));
    assert!(text.contains("- Religious practice: Jain"));
}

#[test]
fn test_default_meal_schedule() {
    let request = request_for(&male_profile());
    let names: Vec<&str> = request
        .meal_schedule
        .iter()
        .map(|m| m.name.as_str())
        .collect();

    assert_eq!(names, vec!["Breakfast", "Lunch", "Dinner"]);
    assert_eq!(request.meal_schedule[0].ordinal, 1);
}

#[test]
fn test_meal_count_from_timings() {
    let profile = male_profile().with_meals(
        None,
        vec![
            "06:30".to_owned(),
            "10:00".to_owned(),
            "13:30".to_owned(),
            "17:00".to_owned(),
            "21:00".to_owned(),
        ],
    );
    let schedule = PlanPromptBuilder::resolve_meal_schedule(&profile);

    assert_eq!(schedule.len(), 5);
    assert_eq!(schedule[4].time, "21:00");
    assert_eq!(schedule[1].name, "Mid-Morning Snack");
}

#[test]
fn test_explicit_six_meal_preference_is_honoured() {
    let timings = ["06:00", "09:00", "12:00", "15:00", "18:00", "21:00"];
    let profile = male_profile().with_meals(
        Some(6),
        timings.iter().map(|t| (*t).to_owned()).collect(),
    );
    let schedule = PlanPromptBuilder::resolve_meal_schedule(&profile);

    assert_eq!(schedule.len(), 6);
    assert_eq!(schedule[5].ordinal, 6);
    assert_eq!(schedule[5].name, "Snack 1");
    let times: Vec<&str> = schedule.iter().map(|m| m.time.as_str()).collect();
    assert_eq!(times, timings);
}

#[test]
fn test_extra_meals_without_timings_get_snack_slots() {
    let profile = male_profile().with_meals(Some(7), Vec::new());
    let schedule = PlanPromptBuilder::resolve_meal_schedule(&profile);

    let names: Vec<&str> = schedule.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(&names[..5], ["Breakfast", "Mid-Morning Snack", "Lunch", "Evening Snack", "Dinner"]);
    assert_eq!(&names[5..], ["Snack 1", "Snack 2"]);
    assert!(schedule[5..].iter().all(|m| m.time == "flexible"));
}

#[test]
fn test_special_instructions_trimmed() {
    let profile = male_profile();
    let metrics = HealthMetricsCalculator::default().derive(&profile).unwrap();
    let split = MacroRatioResolver::resolve(None, None);

    let blank = PlanPromptBuilder::build(&profile, &metrics, split, &Locale::default(), Some("  "));
    let given = PlanPromptBuilder::build(
        &profile,
        &metrics,
        split,
        &Locale::default(),
        Some(" Prefers South Indian food "),
    );

    assert!(blank.special_instructions.is_none());
    assert_eq!(
        given.special_instructions.as_deref(),
        Some("Prefers South Indian food")
    );
    assert!(!render_request(&blank).contains("## Location"));
}

#[test]
fn test_messages_replay_transcript_in_order() {
    let request = request_for(&female_profile());
    let transcript = ConversationTranscript::new()
        .with_turn_now(ConversationRole::Ai, "{\"plan\":1}")
        .with_turn_now(ConversationRole::User, "less rice please");

    let messages = render_messages(
        &request,
        Some(&transcript),
        false,
        LlmCapabilities::structured(),
    );
    let roles: Vec<MessageRole> = messages.iter().map(|m| m.role).collect();

    assert_eq!(
        roles,
        vec![
            MessageRole::System,
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::User,
        ]
    );
    assert_eq!(messages[3].content, "less rice please");
}

#[test]
fn test_messages_without_system_support_and_strict() {
    let request = request_for(&female_profile());
    let capabilities = LlmCapabilities::text_only().difference(LlmCapabilities::SYSTEM_MESSAGES);

    let messages = render_messages(&request, None, true, capabilities);

    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m.role == MessageRole::User));
    assert!(messages[0].content.contains("Response format"));
    assert!(messages[1].content.contains("ONLY"));
}
