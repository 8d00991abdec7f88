// ABOUTME: Core data models for the plan engine
// ABOUTME: Re-exports identifiers, profile, metrics, plan, transcript, and assignment types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Plan assignment records
pub mod assignment;
/// Refinement transcript
pub mod conversation;
/// Identifier newtypes
pub mod ids;
/// Derived metrics and macro split
pub mod nutrition;
/// Generated plan, meals, and items
pub mod plan;
/// Member health profile
pub mod profile;

pub use assignment::{AssignmentStatus, PlanAssignment};
pub use conversation::{ConversationRole, ConversationTranscript, ConversationTurn};
pub use ids::{AssignmentId, MemberId, PlanId, SessionId, SessionKey};
pub use nutrition::{DerivedMetrics, MacroGrams, MacroSplit, MeasurementSource};
pub use plan::{GeneratedPlan, Meal, MealItem};
pub use profile::{
    ActivityLevel, ConditionSet, DietaryPreference, Gender, Goal, HealthProfile, Height,
    HeightUnit, Weekday, Weight, WeightUnit,
};
