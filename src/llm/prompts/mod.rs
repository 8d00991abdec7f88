// ABOUTME: System prompts for plan generation loaded at compile time
// ABOUTME: Provides the diet planner instructions and the JSON-only retry reminder
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # System Prompts
//!
//! Prompts are loaded at compile time from markdown files for easy maintenance.

/// Diet planner system prompt
///
/// Contains the planner role, the response schema, and the numeric rules a
/// reply must satisfy to be accepted.
pub const PLAN_SYSTEM_PROMPT: &str = include_str!("plan_system.md");

/// Reminder appended when retrying after an unparseable reply
pub const STRICT_JSON_REMINDER: &str = "Your previous reply could not be used. Respond ONLY \
with a single JSON object that matches the schema. Do not use markdown fences, comments, or \
any text before or after the object. Meal item calories must add up to within 10% of \
target_calories and macro_ratios must sum to 1.0.";

/// Get the diet planner system prompt
#[must_use]
pub const fn get_plan_system_prompt() -> &'static str {
    PLAN_SYSTEM_PROMPT
}
