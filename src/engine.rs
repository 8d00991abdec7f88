// ABOUTME: PlanEngine facade wiring metrics, macros, request building, generation, and assignment
// ABOUTME: One entry point per member workflow step, with all state scoped per member or session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use nutriplan_core::errors::PlanError;
use nutriplan_core::models::{GeneratedPlan, HealthProfile, MemberId, PlanId, SessionKey};
use nutriplan_intelligence::{HealthMetricsCalculator, MacroRatioResolver};
use tracing::{info, instrument};

use crate::config::EngineConfig;
use crate::database::PlanRepository;
use crate::llm::LlmProvider;
use crate::plans::{
    AssignMode, DetachOutcome, Locale, PlanAssignmentManager, PlanGenerationClient,
    PlanPromptBuilder, PlanRequest, RefinementOutcome, RefinementSessions, ReplaceOutcome,
};

/// Assignment made from a refinement session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAssignment {
    /// Id under which the session's latest plan was saved
    pub plan_id: PlanId,
    /// Assignment outcome
    pub outcome: ReplaceOutcome,
}

/// End-to-end plan engine
///
/// ```text
/// profile -> metrics -> macro split -> PlanRequest -> generate -> (refine)* -> save + assign
/// ```
pub struct PlanEngine {
    config: EngineConfig,
    calculator: HealthMetricsCalculator,
    client: PlanGenerationClient,
    sessions: RefinementSessions,
    assignments: PlanAssignmentManager,
    repository: Arc<dyn PlanRepository>,
}

impl PlanEngine {
    /// Wire an engine from its collaborators
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        repository: Arc<dyn PlanRepository>,
        config: EngineConfig,
    ) -> Self {
        let client = PlanGenerationClient::new(provider, config.generation.clone());
        Self {
            calculator: HealthMetricsCalculator::new(config.metrics.clone()),
            sessions: RefinementSessions::new(client.clone()),
            assignments: PlanAssignmentManager::new(Arc::clone(&repository)),
            client,
            repository,
            config,
        }
    }

    /// Derive metrics and the macro split, then build the request
    ///
    /// `protein_target` is a free-form qualifier such as "high protein"; when
    /// absent the member's goal decides.
    ///
    /// # Errors
    ///
    /// Returns `InvalidProfile` when the profile cannot be used, or
    /// `InvalidInput` for an unknown protein qualifier.
    pub fn prepare_request(
        &self,
        profile: &HealthProfile,
        protein_target: Option<&str>,
        locale: &Locale,
        special_instructions: Option<&str>,
    ) -> Result<PlanRequest, PlanError> {
        let metrics = self.calculator.derive(profile)?;
        let split = MacroRatioResolver::resolve_str(protein_target, Some(profile.goal))?;
        Ok(PlanPromptBuilder::build(
            profile,
            &metrics,
            split,
            locale,
            special_instructions,
        ))
    }

    /// One-shot generation without a refinement session
    ///
    /// # Errors
    ///
    /// Returns any generation error.
    pub async fn generate(&self, request: &PlanRequest) -> Result<GeneratedPlan, PlanError> {
        self.client.generate(request).await.map(|output| output.plan)
    }

    /// Generate the initial plan and open a refinement session
    ///
    /// # Errors
    ///
    /// Returns any generation error.
    pub async fn start_session(
        &self,
        member_id: MemberId,
        request: PlanRequest,
    ) -> Result<(SessionKey, GeneratedPlan), PlanError> {
        self.sessions.start(member_id, request).await
    }

    /// Apply one round of feedback to a session
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound`, `InvalidInput` for blank feedback, or any
    /// generation error.
    pub async fn refine(
        &self,
        key: &SessionKey,
        feedback: &str,
    ) -> Result<RefinementOutcome, PlanError> {
        self.sessions.submit_feedback(key, feedback).await
    }

    /// Save the session's latest plan and bind it to the session's member
    ///
    /// The plan is saved before assignment; if assignment is rejected the
    /// saved plan stays unassigned and no assignment record changes.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound`, any assignment error, or `Persistence`.
    #[instrument(skip(self), fields(session = %key, mode = ?mode))]
    pub async fn assign_latest(
        &self,
        key: &SessionKey,
        mode: AssignMode,
    ) -> Result<SessionAssignment, PlanError> {
        let plan = self.sessions.latest_plan(key).await?;
        let plan_id = self.repository.save_plan(&plan).await?;
        info!(plan_id = %plan_id, generation_id = %plan.generation_id, "Plan saved");

        let outcome = self
            .assignments
            .assign(&key.member_id, plan_id, mode)
            .await?;
        Ok(SessionAssignment { plan_id, outcome })
    }

    /// End the member's active assignment
    ///
    /// # Errors
    ///
    /// Returns `Persistence` on store failure.
    pub async fn detach(&self, member_id: &MemberId) -> Result<DetachOutcome, PlanError> {
        self.assignments.detach(member_id).await
    }

    /// Engine configuration
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Metrics calculator
    #[must_use]
    pub const fn calculator(&self) -> &HealthMetricsCalculator {
        &self.calculator
    }

    /// Generation client
    #[must_use]
    pub const fn client(&self) -> &PlanGenerationClient {
        &self.client
    }

    /// Refinement session registry
    #[must_use]
    pub const fn sessions(&self) -> &RefinementSessions {
        &self.sessions
    }

    /// Assignment manager
    #[must_use]
    pub const fn assignments(&self) -> &PlanAssignmentManager {
        &self.assignments
    }
}
