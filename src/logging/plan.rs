// ABOUTME: Structured logging helpers for plan generation, refinement, and assignment
// ABOUTME: Emits consistently named fields so plan lifecycles can be traced per member
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use nutriplan_core::errors::PlanError;
use nutriplan_core::models::{MemberId, PlanAssignment, SessionKey};
use tracing::{info, warn};

/// Plan lifecycle logging utilities
pub struct PlanLogger;

impl PlanLogger {
    /// Log the outcome of a generate or regenerate call
    pub fn log_generation(
        model: &str,
        attempts: u8,
        duration_ms: u64,
        result: Result<usize, &PlanError>,
    ) {
        match result {
            Ok(meal_count) => info!(
                model = %model,
                attempts,
                duration_ms,
                meal_count,
                event_type = "plan_generation",
                "Plan generated"
            ),
            Err(error) => warn!(
                model = %model,
                attempts,
                duration_ms,
                error = %error,
                retryable = error.is_retryable(),
                event_type = "plan_generation",
                "Plan generation failed"
            ),
        }
    }

    /// Log a completed refinement round
    pub fn log_refinement(key: &SessionKey, turns: usize, feedback_rounds: usize) {
        info!(
            member_id = %key.member_id,
            session_id = %key.session_id,
            turns,
            feedback_rounds,
            event_type = "plan_refinement",
            "Refinement round completed"
        );
    }

    /// Log an assignment state transition
    pub fn log_assignment(action: &str, member_id: &MemberId, assignment: Option<&PlanAssignment>) {
        info!(
            member_id = %member_id,
            action = %action,
            assignment_id = ?assignment.map(|a| a.id),
            plan_id = ?assignment.map(|a| a.plan_id),
            status = assignment.map_or("none", |a| a.status.as_str()),
            event_type = "plan_assignment",
            "Assignment transition"
        );
    }

    /// Log a rejected assignment operation
    pub fn log_assignment_rejected(action: &str, member_id: &MemberId, error: &PlanError) {
        warn!(
            member_id = %member_id,
            action = %action,
            error = %error,
            event_type = "plan_assignment",
            "Assignment operation rejected"
        );
    }
}
