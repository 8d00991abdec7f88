// ABOUTME: Shared test utilities and fixtures for integration tests
// ABOUTME: Provides quiet logging, profile fixtures, a scripted LLM provider, and a failing repository
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `nutriplan`

use async_trait::async_trait;
use nutriplan::config::{EngineConfig, GenerationConfig};
use nutriplan::database::{InMemoryPlanRepository, PlanRepository, Supersession};
use nutriplan::errors::{AppError, ErrorCode, PlanError};
use nutriplan::intelligence::{HealthMetricsCalculator, MacroRatioResolver};
use nutriplan::llm::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider};
use nutriplan::models::{
    ActivityLevel, AssignmentId, DietaryPreference, Gender, GeneratedPlan, Goal, HealthProfile,
    Height, MemberId, PlanAssignment, PlanId, Weight,
};
use nutriplan::plans::{parse_plan, Locale, PlanGenerationClient, PlanPromptBuilder, PlanRequest};
use serde_json::json;
use std::collections::VecDeque;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tokio::time::sleep;
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

// ============================================================================
// Profile fixtures
// ============================================================================

/// Female 60 kg / 160 cm / 30 y, moderate activity, weight loss
pub fn female_profile() -> HealthProfile {
    HealthProfile::new(Gender::Female, 30, ActivityLevel::Moderate, Goal::WeightLoss)
        .with_weight(Weight::kg(60.0))
        .with_height(Height::cm(160.0))
        .with_dietary_preference(DietaryPreference::Vegetarian)
}

/// Male 80 kg / 180 cm / 25 y, active, muscle gain
pub fn male_profile() -> HealthProfile {
    HealthProfile::new(Gender::Male, 25, ActivityLevel::Active, Goal::MuscleGain)
        .with_weight(Weight::kg(80.0))
        .with_height(Height::cm(180.0))
}

/// Build a request the way the engine does
pub fn request_for(profile: &HealthProfile) -> PlanRequest {
    let metrics = HealthMetricsCalculator::default().derive(profile).unwrap();
    let split = MacroRatioResolver::resolve(None, Some(profile.goal));
    PlanPromptBuilder::build(
        profile,
        &metrics,
        split,
        &Locale::default().with_country("India").with_city("Pune"),
        None,
    )
}

// ============================================================================
// Reply fixtures
// ============================================================================

/// A valid plan reply whose three meals sum to `total` kcal
pub fn plan_reply_with_total(name: &str, declared_target: u32, total: f64) -> String {
    let third = total / 3.0;
    json!({
        "name": name,
        "description": "Three balanced vegetarian meals",
        "target_calories": declared_target,
        "macro_ratios": {"protein_ratio": 0.4, "carbs_ratio": 0.3, "fats_ratio": 0.3},
        "meals": [
            {"ordinal": 1, "name": "Breakfast", "time_of_day": "08:00", "items": [
                {"name": "Moong dal chilla", "portion": "2 pieces", "calories": third,
                 "protein_g": 20, "carbs_g": 30, "fats_g": 8}
            ]},
            {"ordinal": 2, "name": "Lunch", "time_of_day": "13:00", "items": [
                {"name": "Paneer tikka", "portion": "150 g", "calories": third / 2.0,
                 "protein_g": 25, "carbs_g": 10, "fats_g": 15},
                {"name": "Jowar roti", "portion": "2 pieces", "calories": third / 2.0,
                 "protein_g": 6, "carbs_g": 40, "fats_g": 3}
            ]},
            {"ordinal": 3, "name": "Dinner", "time_of_day": "20:00", "items": [
                {"name": "Tofu stir fry", "portion": "1 bowl", "calories": third,
                 "protein_g": 28, "carbs_g": 20, "fats_g": 12,
                 "preparation": "Use 1 tsp oil"}
            ]}
        ]
    })
    .to_string()
}

/// A valid plan reply for `target` kcal
pub fn plan_reply(name: &str, target: u32) -> String {
    plan_reply_with_total(name, target, f64::from(target))
}

// ============================================================================
// Scripted LLM provider
// ============================================================================

/// One scripted provider response
#[derive(Debug, Clone)]
pub enum Step {
    /// Reply with this text
    Reply(String),
    /// Reply after a delay
    Delayed(Duration, String),
    /// Fail with a service error of this code
    Fail(ErrorCode),
}

/// LLM provider that plays back a script and records every request
pub struct MockLlmProvider {
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<ChatRequest>>,
    capabilities: LlmCapabilities,
}

impl MockLlmProvider {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
            capabilities: LlmCapabilities::structured(),
        }
    }

    /// Provider that answers with the given replies in order
    pub fn replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            replies
                .into_iter()
                .map(|reply| Step::Reply(reply.into()))
                .collect(),
        )
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: LlmCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Append further steps to the script
    pub fn push(&self, step: Step) {
        self.script.lock().unwrap().push_back(step);
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn display_name(&self) -> &'static str {
        "Scripted Mock"
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.capabilities
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        let step = self.script.lock().unwrap().pop_front();

        let content = match step {
            Some(Step::Reply(content)) => content,
            Some(Step::Delayed(delay, content)) => {
                sleep(delay).await;
                content
            }
            Some(Step::Fail(code)) => {
                return Err(AppError::new(code, "scripted failure"));
            }
            None => {
                return Err(AppError::external_unavailable(
                    "GenerationService",
                    "script exhausted",
                ))
            }
        };

        Ok(ChatResponse {
            content,
            model: request.model.clone().unwrap_or_default(),
            usage: None,
            finish_reason: Some("stop".to_owned()),
        })
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}

/// Generation client over a scripted provider
pub fn client_with(provider: Arc<MockLlmProvider>) -> PlanGenerationClient {
    PlanGenerationClient::new(provider, GenerationConfig::default())
}

/// Engine configuration with a short timeout
pub fn test_engine_config() -> EngineConfig {
    EngineConfig {
        generation: GenerationConfig::default().with_timeout(Duration::from_secs(5)),
        ..EngineConfig::default()
    }
}

// ============================================================================
// Repository that can be told to fail
// ============================================================================

/// In-memory repository whose mutations can be switched to fail
#[derive(Default)]
pub struct FailingRepository {
    inner: InMemoryPlanRepository,
    fail_replace: AtomicBool,
    fail_detach: AtomicBool,
}

impl FailingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_replace(&self, fail: bool) {
        self.fail_replace.store(fail, Ordering::SeqCst);
    }

    pub fn fail_detach(&self, fail: bool) {
        self.fail_detach.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PlanRepository for FailingRepository {
    async fn save_plan(&self, plan: &GeneratedPlan) -> Result<PlanId, PlanError> {
        self.inner.save_plan(plan).await
    }

    async fn get_plan(&self, plan_id: PlanId) -> Result<Option<GeneratedPlan>, PlanError> {
        self.inner.get_plan(plan_id).await
    }

    async fn attach_plan(
        &self,
        member_id: &MemberId,
        plan_id: PlanId,
    ) -> Result<PlanAssignment, PlanError> {
        self.inner.attach_plan(member_id, plan_id).await
    }

    async fn replace_plan(
        &self,
        member_id: &MemberId,
        old_assignment_id: AssignmentId,
        new_plan_id: PlanId,
    ) -> Result<Supersession, PlanError> {
        if self.fail_replace.load(Ordering::SeqCst) {
            return Err(PlanError::persistence("replace_plan", "backend unavailable"));
        }
        self.inner
            .replace_plan(member_id, old_assignment_id, new_plan_id)
            .await
    }

    async fn detach_plan(&self, member_id: &MemberId) -> Result<Option<PlanAssignment>, PlanError> {
        if self.fail_detach.load(Ordering::SeqCst) {
            return Err(PlanError::persistence("detach_plan", "backend unavailable"));
        }
        self.inner.detach_plan(member_id).await
    }

    async fn active_assignment(
        &self,
        member_id: &MemberId,
    ) -> Result<Option<PlanAssignment>, PlanError> {
        self.inner.active_assignment(member_id).await
    }

    async fn assignment_history(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<PlanAssignment>, PlanError> {
        self.inner.assignment_history(member_id).await
    }
}

/// A minimal plan for assignment tests
pub fn sample_plan(name: &str) -> GeneratedPlan {
    parse_plan(&plan_reply(name, 1600), 1600, 0.10, 0.01, "mock-model").unwrap()
}
