// ABOUTME: Plan assignment records binding a persisted plan to a member
// ABOUTME: Status lifecycle Active -> Superseded | Detached with audit links
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::ids::{AssignmentId, MemberId, PlanId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an assignment record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// The member's current plan
    Active,
    /// Ended by a replacement
    Superseded,
    /// Ended by an explicit detach
    Detached,
}

impl AssignmentStatus {
    /// Stable label
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Superseded => "superseded",
            Self::Detached => "detached",
        }
    }
}

/// Binding of a plan to a member
///
/// At most one record per member has status `Active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanAssignment {
    /// Record id
    pub id: AssignmentId,
    /// Member holding the plan
    pub member_id: MemberId,
    /// Assigned plan
    pub plan_id: PlanId,
    /// Lifecycle status
    pub status: AssignmentStatus,
    /// When the plan became active
    pub assigned_at: DateTime<Utc>,
    /// When the assignment stopped being active
    pub ended_at: Option<DateTime<Utc>>,
    /// Plan this assignment replaced, if created by a replacement
    pub replaced_plan_id: Option<PlanId>,
    /// Assignment that superseded this one
    pub superseded_by: Option<AssignmentId>,
}

impl PlanAssignment {
    /// Create a new active assignment
    #[must_use]
    pub fn activate(member_id: MemberId, plan_id: PlanId, replaced_plan_id: Option<PlanId>) -> Self {
        Self {
            id: AssignmentId::new(),
            member_id,
            plan_id,
            status: AssignmentStatus::Active,
            assigned_at: Utc::now(),
            ended_at: None,
            replaced_plan_id,
            superseded_by: None,
        }
    }

    /// Whether this is the member's current plan
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AssignmentStatus::Active
    }

    /// Copy of this record marked superseded by `successor`
    #[must_use]
    pub fn superseded(&self, successor: AssignmentId, at: DateTime<Utc>) -> Self {
        Self {
            status: AssignmentStatus::Superseded,
            ended_at: Some(at),
            superseded_by: Some(successor),
            ..self.clone()
        }
    }

    /// Copy of this record marked detached
    #[must_use]
    pub fn detached(&self, at: DateTime<Utc>) -> Self {
        Self {
            status: AssignmentStatus::Detached,
            ended_at: Some(at),
            ..self.clone()
        }
    }
}
