// ABOUTME: Persistence contract for generated plans and member plan assignments
// ABOUTME: Storage itself is external; implementations must make each mutation all-or-nothing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Plan Persistence
//!
//! The engine never stores data itself. It talks to the backend through
//! [`PlanRepository`], whose operations are treated as black-box calls that
//! either fully succeed or change nothing.
//!
//! [`InMemoryPlanRepository`] is the reference implementation used by tests
//! and local runs.

mod memory;

pub use memory::InMemoryPlanRepository;

use async_trait::async_trait;
use nutriplan_core::errors::PlanError;
use nutriplan_core::models::{AssignmentId, GeneratedPlan, MemberId, PlanAssignment, PlanId};
use serde::{Deserialize, Serialize};

/// Records written by a successful replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supersession {
    /// The previous assignment, now `Superseded`
    pub superseded: PlanAssignment,
    /// The new active assignment
    pub active: PlanAssignment,
}

/// Backend persistence operations used by the engine
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Store a generated plan and return its id
    async fn save_plan(&self, plan: &GeneratedPlan) -> Result<PlanId, PlanError>;

    /// Fetch a stored plan
    async fn get_plan(&self, plan_id: PlanId) -> Result<Option<GeneratedPlan>, PlanError>;

    /// Create the member's first active assignment
    ///
    /// Fails with `AlreadyAssigned` if the member already has one.
    async fn attach_plan(
        &self,
        member_id: &MemberId,
        plan_id: PlanId,
    ) -> Result<PlanAssignment, PlanError>;

    /// Supersede `old_assignment_id` with a new active assignment in one step
    ///
    /// Fails with `AssignmentConflict` if `old_assignment_id` is no longer
    /// the member's active assignment.
    async fn replace_plan(
        &self,
        member_id: &MemberId,
        old_assignment_id: AssignmentId,
        new_plan_id: PlanId,
    ) -> Result<Supersession, PlanError>;

    /// Mark the active assignment detached; `None` if there was none
    async fn detach_plan(&self, member_id: &MemberId) -> Result<Option<PlanAssignment>, PlanError>;

    /// The member's active assignment
    async fn active_assignment(
        &self,
        member_id: &MemberId,
    ) -> Result<Option<PlanAssignment>, PlanError>;

    /// All assignments of a member, oldest first
    async fn assignment_history(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<PlanAssignment>, PlanError>;
}
