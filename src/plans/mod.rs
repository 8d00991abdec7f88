// ABOUTME: Plan pipeline from typed request to generated, refined, and assigned plans
// ABOUTME: Request building, rendering, reply parsing, generation, refinement, and assignment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Plans
//!
//! Leaf first:
//!
//! - [`prompt_builder`]: pure profile + metrics + split to [`PlanRequest`]
//! - [`render`]: [`PlanRequest`] and transcript to chat messages
//! - [`response`]: reply text to a validated `GeneratedPlan`
//! - [`generation`]: [`PlanGenerationClient`] with deadline and strict retry
//! - [`refinement`]: feedback rounds and [`RefinementSessions`]
//! - [`assignment`]: [`PlanAssignmentManager`] state machine

/// Plan assignment lifecycle
pub mod assignment;
/// Generation service client
pub mod generation;
/// Typed request construction
pub mod prompt_builder;
/// Conversational refinement
pub mod refinement;
/// Request rendering
pub mod render;
/// Reply parsing and validation
pub mod response;

pub use assignment::{AssignMode, DetachOutcome, PlanAssignmentManager, ReplaceOutcome};
pub use generation::{GenerationOutput, PlanGenerationClient};
pub use prompt_builder::{
    Constraint, ConstraintKind, Locale, NonVegPolicy, PlanPromptBuilder, PlanRequest,
    ProfileSummary, ScheduledMeal,
};
pub use refinement::{initial_transcript, submit_feedback, RefinementOutcome, RefinementSessions};
pub use render::{render_messages, render_request};
pub use response::{extract_json, parse_plan};
