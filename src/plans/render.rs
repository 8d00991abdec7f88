// ABOUTME: Renders a typed plan request and refinement transcript into chat messages
// ABOUTME: Pure text formatting; all constraint resolution happens in the request builder
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::Write;

use nutriplan_core::models::{
    ConversationRole, ConversationTranscript, Gender, MeasurementSource, Weekday,
};

use super::prompt_builder::{NonVegPolicy, PlanRequest};
use crate::llm::prompts::{get_plan_system_prompt, STRICT_JSON_REMINDER};
use crate::llm::{ChatMessage, LlmCapabilities};

/// Render the request as the natural-language user message
#[must_use]
pub fn render_request(request: &PlanRequest) -> String {
    let mut out = String::with_capacity(1024);
    let profile = &request.profile;
    let metrics = &request.metrics;

    out.push_str("Create a one-day diet plan for a gym member.\n\n## Member\n");
    let gender = match profile.gender {
        Gender::Male => "male",
        Gender::Female => "female",
        Gender::Unspecified => "not specified",
    };
    let _ = writeln!(out, "- Gender: {gender}");
    if let Some(age) = profile.age {
        let _ = writeln!(out, "- Age: {age}");
    }
    let _ = writeln!(out, "- Activity level: {}", profile.activity_level.as_str());
    let _ = writeln!(out, "- Goal: {}", profile.goal.as_str().replace('_', " "));
    let _ = writeln!(
        out,
        "- BMI: {:.1} (weight {:.1} kg, height {:.1} cm)",
        metrics.bmi, metrics.weight_kg, metrics.height_cm
    );
    if metrics.weight_source == MeasurementSource::Default {
        out.push_str("- Weight was not reported; a typical value was assumed\n");
    }
    if metrics.height_source == MeasurementSource::Default {
        out.push_str("- Height was not reported; a typical value was assumed\n");
    }

    let (protein_pct, carbs_pct, fats_pct) = request.macro_split.as_percentages();
    let grams = &request.macro_grams;
    out.push_str("\n## Targets\n");
    let _ = writeln!(out, "- Daily calories: {} kcal", request.target_calories);
    let _ = writeln!(
        out,
        "- BMR: {:.0} kcal, TDEE: {:.0} kcal",
        metrics.bmr, metrics.tdee
    );
    let _ = writeln!(
        out,
        "- Macro split: protein {protein_pct}%, carbs {carbs_pct}%, fats {fats_pct}%"
    );
    let _ = writeln!(
        out,
        "- Macro grams: protein {:.0} g, carbs {:.0} g, fats {:.0} g",
        grams.protein_g, grams.carbs_g, grams.fats_g
    );

    out.push_str("\n## Constraints\n");
    if request.constraints.is_empty() {
        out.push_str("- None\n");
    }
    for constraint in &request.constraints {
        let _ = writeln!(out, "- {}: {}", constraint.kind.label(), constraint.value);
    }

    out.push_str("\n## Non-vegetarian dishes\n");
    match &request.non_veg {
        NonVegPolicy::Never => {
            out.push_str("- Not allowed on any day (strictly vegetarian)\n");
        }
        NonVegPolicy::Days(days) if days.is_empty() => {
            out.push_str("- Not allowed on any day (no days selected)\n");
        }
        NonVegPolicy::Days(days) => {
            let names: Vec<&str> = days.iter().map(Weekday::name).collect();
            let _ = writeln!(out, "- Allowed only on: {}", names.join(", "));
        }
    }

    out.push_str("\n## Meal schedule\n");
    for meal in &request.meal_schedule {
        let _ = writeln!(out, "{}. {} at {}", meal.ordinal, meal.name, meal.time);
    }

    if let Some(location) = request.locale.describe() {
        out.push_str("\n## Location\n");
        let _ = writeln!(out, "{location}");
    }

    if let Some(instructions) = &request.special_instructions {
        out.push_str("\n## Special instructions\n");
        let _ = writeln!(out, "{instructions}");
    }

    out.push_str("\nRespond with the complete plan as a single JSON object.");
    out
}

/// Build the full message list for one generation call
///
/// The transcript is replayed after the request, AI turns as assistant
/// messages and feedback as user messages. Providers without system message
/// support get the system prompt folded into the first user message.
#[must_use]
pub fn render_messages(
    request: &PlanRequest,
    transcript: Option<&ConversationTranscript>,
    strict: bool,
    capabilities: LlmCapabilities,
) -> Vec<ChatMessage> {
    let system = get_plan_system_prompt();
    let body = render_request(request);
    let turns = transcript.map_or(0, ConversationTranscript::len);
    let mut messages = Vec::with_capacity(turns + 3);

    if capabilities.supports_system_messages() {
        messages.push(ChatMessage::system(system));
        messages.push(ChatMessage::user(body));
    } else {
        messages.push(ChatMessage::user(format!("{system}\n\n{body}")));
    }

    for turn in transcript.map(ConversationTranscript::turns).unwrap_or_default() {
        messages.push(match turn.role {
            ConversationRole::Ai => ChatMessage::assistant(turn.message.clone()),
            ConversationRole::User => ChatMessage::user(turn.message.clone()),
        });
    }

    if strict {
        messages.push(ChatMessage::user(STRICT_JSON_REMINDER));
    }
    messages
}
