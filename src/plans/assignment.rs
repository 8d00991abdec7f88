// ABOUTME: Plan assignment state machine enforcing at most one active plan per member
// ABOUTME: Serializes attach, replace, and detach per member and reports explicit outcomes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Plan Assignment
//!
//! Per member the state is `Unassigned` or `Assigned(plan)`:
//!
//! - `attach`: `Unassigned -> Assigned`, rejected with `AlreadyAssigned` otherwise
//! - `replace`: `Assigned -> Assigned` recorded as a supersession, or a plain
//!   attach when the member is unassigned
//! - `detach`: `Assigned -> Unassigned`, a no-op when already unassigned
//!
//! Operations for the same member run one at a time. The repository's
//! `replace_plan` additionally checks that the assignment being superseded is
//! still the active one, so writers outside this process cannot cause a
//! partial supersession either.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use nutriplan_core::errors::PlanError;
use nutriplan_core::models::{MemberId, PlanAssignment, PlanId};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::instrument;

use crate::database::{PlanRepository, Supersession};
use crate::logging::PlanLogger;

/// How a plan should be bound to a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignMode {
    /// Only if the member has no active plan
    Attach,
    /// Supersede the active plan if there is one
    Replace,
}

/// What a replace (or attach-or-replace) did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// The previous assignment was superseded
    Replaced(Supersession),
    /// The member had no active plan; a first assignment was created
    Attached(PlanAssignment),
    /// The plan was already the active one; nothing changed
    Unchanged(PlanAssignment),
}

impl ReplaceOutcome {
    /// The member's active assignment after the operation
    #[must_use]
    pub const fn active(&self) -> &PlanAssignment {
        match self {
            Self::Replaced(supersession) => &supersession.active,
            Self::Attached(assignment) | Self::Unchanged(assignment) => assignment,
        }
    }

    /// Whether any record was written
    #[must_use]
    pub const fn changed(&self) -> bool {
        !matches!(self, Self::Unchanged(_))
    }
}

/// What a detach did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetachOutcome {
    /// The active assignment was detached
    Detached(PlanAssignment),
    /// The member had no active plan; nothing changed
    AlreadyUnassigned,
}

/// Owns the assignment lifecycle on top of a [`PlanRepository`]
pub struct PlanAssignmentManager {
    repository: Arc<dyn PlanRepository>,
    locks: DashMap<MemberId, Arc<Mutex<()>>>,
}

impl PlanAssignmentManager {
    /// Create a manager over `repository`
    #[must_use]
    pub fn new(repository: Arc<dyn PlanRepository>) -> Self {
        Self {
            repository,
            locks: DashMap::new(),
        }
    }

    /// Bind a plan to a member who has none
    ///
    /// # Errors
    ///
    /// Returns `AlreadyAssigned` if the member has an active plan,
    /// `InvalidInput` for an unknown plan, or `Persistence` on store failure.
    #[instrument(skip(self), fields(member_id = %member_id, plan_id = %plan_id))]
    pub async fn attach(
        &self,
        member_id: &MemberId,
        plan_id: PlanId,
    ) -> Result<PlanAssignment, PlanError> {
        let result = self
            .with_member_lock(member_id, || self.attach_locked(member_id, plan_id))
            .await;
        Self::log("attach", member_id, result.as_ref().map(Some));
        result
    }

    /// Make `new_plan_id` the member's active plan
    ///
    /// # Errors
    ///
    /// Returns `AssignmentConflict` if the active assignment changed
    /// underneath, `InvalidInput` for an unknown plan, or `Persistence` on
    /// store failure. On error the prior assignment is still active.
    #[instrument(skip(self), fields(member_id = %member_id, plan_id = %new_plan_id))]
    pub async fn replace(
        &self,
        member_id: &MemberId,
        new_plan_id: PlanId,
    ) -> Result<ReplaceOutcome, PlanError> {
        let result = self
            .with_member_lock(member_id, || self.replace_locked(member_id, new_plan_id))
            .await;
        Self::log(
            "replace",
            member_id,
            result.as_ref().map(|outcome| Some(outcome.active())),
        );
        result
    }

    /// Attach or replace depending on `mode`
    ///
    /// # Errors
    ///
    /// Same as [`Self::attach`] or [`Self::replace`].
    pub async fn assign(
        &self,
        member_id: &MemberId,
        plan_id: PlanId,
        mode: AssignMode,
    ) -> Result<ReplaceOutcome, PlanError> {
        match mode {
            AssignMode::Attach => self
                .attach(member_id, plan_id)
                .await
                .map(ReplaceOutcome::Attached),
            AssignMode::Replace => self.replace(member_id, plan_id).await,
        }
    }

    /// End the member's active assignment, if any
    ///
    /// # Errors
    ///
    /// Returns `Persistence` on store failure.
    #[instrument(skip(self), fields(member_id = %member_id))]
    pub async fn detach(&self, member_id: &MemberId) -> Result<DetachOutcome, PlanError> {
        let result = self
            .with_member_lock(member_id, || self.repository.detach_plan(member_id))
            .await;
        Self::log("detach", member_id, result.as_ref().map(Option::as_ref));
        Ok(result?.map_or(DetachOutcome::AlreadyUnassigned, DetachOutcome::Detached))
    }

    /// The member's active assignment
    ///
    /// # Errors
    ///
    /// Returns `Persistence` on store failure.
    pub async fn active(&self, member_id: &MemberId) -> Result<Option<PlanAssignment>, PlanError> {
        self.repository.active_assignment(member_id).await
    }

    /// Every assignment of the member, oldest first
    ///
    /// # Errors
    ///
    /// Returns `Persistence` on store failure.
    pub async fn history(&self, member_id: &MemberId) -> Result<Vec<PlanAssignment>, PlanError> {
        self.repository.assignment_history(member_id).await
    }

    async fn attach_locked(
        &self,
        member_id: &MemberId,
        plan_id: PlanId,
    ) -> Result<PlanAssignment, PlanError> {
        self.require_plan(plan_id).await?;
        if let Some(current) = self.repository.active_assignment(member_id).await? {
            return Err(PlanError::AlreadyAssigned {
                member_id: member_id.clone(),
                assignment_id: current.id,
            });
        }
        self.repository.attach_plan(member_id, plan_id).await
    }

    async fn replace_locked(
        &self,
        member_id: &MemberId,
        new_plan_id: PlanId,
    ) -> Result<ReplaceOutcome, PlanError> {
        self.require_plan(new_plan_id).await?;
        match self.repository.active_assignment(member_id).await? {
            None => self
                .repository
                .attach_plan(member_id, new_plan_id)
                .await
                .map(ReplaceOutcome::Attached),
            Some(current) if current.plan_id == new_plan_id => {
                Ok(ReplaceOutcome::Unchanged(current))
            }
            Some(current) => self
                .repository
                .replace_plan(member_id, current.id, new_plan_id)
                .await
                .map(ReplaceOutcome::Replaced),
        }
    }

    async fn require_plan(&self, plan_id: PlanId) -> Result<(), PlanError> {
        match self.repository.get_plan(plan_id).await? {
            Some(_) => Ok(()),
            None => Err(PlanError::invalid_input(format!(
                "plan {plan_id} does not exist"
            ))),
        }
    }

    /// Members with an assignment operation in flight
    #[must_use]
    pub fn tracked_members(&self) -> usize {
        self.locks.len()
    }

    /// Run `operation` as the only writer for `member_id`
    ///
    /// The member's lock entry is dropped once no other caller holds or waits
    /// on it, so the map only grows with concurrent members.
    async fn with_member_lock<T, F, Fut>(&self, member_id: &MemberId, operation: F) -> T
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = T> + Send,
        T: Send,
    {
        let lock = Arc::clone(
            self.locks
                .entry(member_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );

        let result = {
            let _guard = lock.lock().await;
            operation().await
        };

        // One reference in the map plus ours means nobody else is queued
        self.locks
            .remove_if(member_id, |_, held| Arc::strong_count(held) == 2);
        result
    }

    fn log(
        action: &str,
        member_id: &MemberId,
        result: Result<Option<&PlanAssignment>, &PlanError>,
    ) {
        match result {
            Ok(assignment) => PlanLogger::log_assignment(action, member_id, assignment),
            Err(error) => PlanLogger::log_assignment_rejected(action, member_id, error),
        }
    }
}
