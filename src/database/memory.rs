// ABOUTME: In-memory plan repository for tests and local runs
// ABOUTME: Validates every precondition before mutating, under a single write lock
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{PlanRepository, Supersession};
use async_trait::async_trait;
use chrono::Utc;
use nutriplan_core::errors::PlanError;
use nutriplan_core::models::{AssignmentId, GeneratedPlan, MemberId, PlanAssignment, PlanId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct State {
    plans: HashMap<PlanId, GeneratedPlan>,
    /// Assignment records per member in creation order
    assignments: HashMap<MemberId, Vec<PlanAssignment>>,
}

impl State {
    fn require_plan(&self, operation: &'static str, plan_id: PlanId) -> Result<(), PlanError> {
        if self.plans.contains_key(&plan_id) {
            Ok(())
        } else {
            Err(PlanError::persistence(
                operation,
                format!("plan {plan_id} does not exist"),
            ))
        }
    }

    fn active(&self, member_id: &MemberId) -> Option<&PlanAssignment> {
        self.assignments
            .get(member_id)?
            .iter()
            .find(|assignment| assignment.is_active())
    }

    fn active_mut(&mut self, member_id: &MemberId) -> Option<&mut PlanAssignment> {
        self.assignments
            .get_mut(member_id)?
            .iter_mut()
            .find(|assignment| assignment.is_active())
    }
}

/// Plan repository backed by process memory
///
/// Cloning shares the same store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPlanRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryPlanRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored plans
    pub async fn plan_count(&self) -> usize {
        self.state.read().await.plans.len()
    }
}

#[async_trait]
impl PlanRepository for InMemoryPlanRepository {
    async fn save_plan(&self, plan: &GeneratedPlan) -> Result<PlanId, PlanError> {
        let plan_id = PlanId::new();
        self.state.write().await.plans.insert(plan_id, plan.clone());
        Ok(plan_id)
    }

    async fn get_plan(&self, plan_id: PlanId) -> Result<Option<GeneratedPlan>, PlanError> {
        Ok(self.state.read().await.plans.get(&plan_id).cloned())
    }

    async fn attach_plan(
        &self,
        member_id: &MemberId,
        plan_id: PlanId,
    ) -> Result<PlanAssignment, PlanError> {
        let mut state = self.state.write().await;
        state.require_plan("attach_plan", plan_id)?;

        if let Some(current) = state.active(member_id) {
            return Err(PlanError::AlreadyAssigned {
                member_id: member_id.clone(),
                assignment_id: current.id,
            });
        }

        let assignment = PlanAssignment::activate(member_id.clone(), plan_id, None);
        state
            .assignments
            .entry(member_id.clone())
            .or_default()
            .push(assignment.clone());
        Ok(assignment)
    }

    async fn replace_plan(
        &self,
        member_id: &MemberId,
        old_assignment_id: AssignmentId,
        new_plan_id: PlanId,
    ) -> Result<Supersession, PlanError> {
        let mut state = self.state.write().await;
        state.require_plan("replace_plan", new_plan_id)?;

        let conflict = || PlanError::AssignmentConflict {
            member_id: member_id.clone(),
            expected: Some(old_assignment_id),
        };
        let records = state.assignments.get_mut(member_id).ok_or_else(conflict)?;
        let current = records
            .iter_mut()
            .find(|assignment| assignment.is_active())
            .ok_or_else(conflict)?;
        if current.id != old_assignment_id {
            return Err(conflict());
        }

        let active =
            PlanAssignment::activate(member_id.clone(), new_plan_id, Some(current.plan_id));
        let superseded = current.superseded(active.id, active.assigned_at);
        *current = superseded.clone();
        records.push(active.clone());

        Ok(Supersession { superseded, active })
    }

    async fn detach_plan(&self, member_id: &MemberId) -> Result<Option<PlanAssignment>, PlanError> {
        let mut state = self.state.write().await;
        let Some(current) = state.active_mut(member_id) else {
            return Ok(None);
        };

        let detached = current.detached(Utc::now());
        *current = detached.clone();
        Ok(Some(detached))
    }

    async fn active_assignment(
        &self,
        member_id: &MemberId,
    ) -> Result<Option<PlanAssignment>, PlanError> {
        Ok(self.state.read().await.active(member_id).cloned())
    }

    async fn assignment_history(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<PlanAssignment>, PlanError> {
        Ok(self
            .state
            .read()
            .await
            .assignments
            .get(member_id)
            .cloned()
            .unwrap_or_default())
    }
}
