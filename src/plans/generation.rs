// ABOUTME: Plan generation client calling the external generation service with a deadline
// ABOUTME: Retries once with a strict JSON instruction after a rejected reply, never on transport errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Plan Generation Client
//!
//! [`PlanGenerationClient`] renders a [`PlanRequest`] (plus, when refining, the
//! conversation so far) into a chat request, sends it to the configured
//! [`LlmProvider`], and parses the reply with [`parse_plan`].
//!
//! - A reply that fails parsing or validation is retried once with a stricter
//!   instruction when `strict_retry` is enabled, then surfaced.
//! - Transport failures, provider errors and the deadline surface
//!   immediately as `GenerationUnavailable`.
//! - The configured timeout is a single deadline covering both attempts.

use std::sync::Arc;

use nutriplan_core::errors::PlanError;
use nutriplan_core::models::{ConversationTranscript, GeneratedPlan};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, instrument, warn};

use super::prompt_builder::PlanRequest;
use super::render::render_messages;
use super::response::parse_plan;
use crate::config::GenerationConfig;
use crate::llm::{ChatRequest, LlmProvider};
use crate::logging::PlanLogger;

/// Upper bound on sampling temperature for the strict retry
const STRICT_RETRY_TEMPERATURE: f32 = 0.2;

/// Result of a successful generation call
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    /// Validated plan
    pub plan: GeneratedPlan,
    /// Reply text the plan was parsed from
    pub raw_reply: String,
    /// Number of service calls made (1 or 2)
    pub attempts: u8,
}

/// Client for the external plan generation service
#[derive(Clone)]
pub struct PlanGenerationClient {
    provider: Arc<dyn LlmProvider>,
    config: GenerationConfig,
}

impl PlanGenerationClient {
    /// Create a client for `provider`
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: GenerationConfig) -> Self {
        Self { provider, config }
    }

    /// Generation parameters
    #[must_use]
    pub const fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Model used for requests: the configured one or the provider default
    #[must_use]
    pub fn model(&self) -> &str {
        self.config
            .model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Generate the initial plan for a request
    ///
    /// # Errors
    ///
    /// Returns `GenerationParse` if the reply (and the strict retry) fail
    /// validation, or `GenerationUnavailable` on transport failure or timeout.
    #[instrument(skip_all, fields(target_calories = request.target_calories))]
    pub async fn generate(&self, request: &PlanRequest) -> Result<GenerationOutput, PlanError> {
        self.run(request, None).await
    }

    /// Generate a revised plan from the request and the conversation so far
    ///
    /// # Errors
    ///
    /// Same as [`Self::generate`].
    #[instrument(skip_all, fields(target_calories = request.target_calories, turns = transcript.len()))]
    pub async fn regenerate(
        &self,
        request: &PlanRequest,
        transcript: &ConversationTranscript,
    ) -> Result<GenerationOutput, PlanError> {
        self.run(request, Some(transcript)).await
    }

    async fn run(
        &self,
        request: &PlanRequest,
        transcript: Option<&ConversationTranscript>,
    ) -> Result<GenerationOutput, PlanError> {
        let started = Instant::now();
        let model = self.model().to_owned();

        let Some(deadline) = started.checked_add(self.config.timeout) else {
            warn!(timeout_secs = self.config.timeout.as_secs(), "generation timeout out of range");
            return Err(PlanError::generation_unavailable(format!(
                "generation timeout of {}s cannot be scheduled",
                self.config.timeout.as_secs()
            )));
        };

        let (attempts, result) = self.attempt_with_retry(request, transcript, deadline).await;

        let duration_ms = started.elapsed().as_millis() as u64;
        PlanLogger::log_generation(
            &model,
            attempts,
            duration_ms,
            result.as_ref().map(|output| output.plan.meals.len()),
        );
        result
    }

    async fn attempt_with_retry(
        &self,
        request: &PlanRequest,
        transcript: Option<&ConversationTranscript>,
        deadline: Instant,
    ) -> (u8, Result<GenerationOutput, PlanError>) {
        let max_attempts: u8 = if self.config.strict_retry { 2 } else { 1 };
        let mut attempt: u8 = 0;

        loop {
            attempt += 1;
            let strict = attempt > 1;
            match self.attempt(request, transcript, strict, deadline).await {
                Ok((plan, raw_reply)) => {
                    return (
                        attempt,
                        Ok(GenerationOutput {
                            plan,
                            raw_reply,
                            attempts: attempt,
                        }),
                    );
                }
                Err(error @ PlanError::GenerationParse { .. }) if attempt < max_attempts => {
                    warn!(
                        attempt,
                        error = %error,
                        "Generation reply rejected, retrying with strict JSON instruction"
                    );
                }
                Err(error) => return (attempt, Err(error)),
            }
        }
    }

    async fn attempt(
        &self,
        request: &PlanRequest,
        transcript: Option<&ConversationTranscript>,
        strict: bool,
        deadline: Instant,
    ) -> Result<(GeneratedPlan, String), PlanError> {
        let messages = render_messages(request, transcript, strict, self.provider.capabilities());
        let temperature = if strict {
            self.config.temperature.min(STRICT_RETRY_TEMPERATURE)
        } else {
            self.config.temperature
        };
        let chat = ChatRequest::new(messages)
            .with_model(self.model())
            .with_temperature(temperature)
            .with_max_tokens(self.config.max_tokens)
            .with_json_mode();

        debug!(
            provider = self.provider.name(),
            messages = chat.messages.len(),
            strict,
            "Sending generation request"
        );

        let response = match timeout_at(deadline, self.provider.complete(&chat)).await {
            Err(_) => {
                return Err(PlanError::generation_unavailable(format!(
                    "no reply within {:.1}s",
                    self.config.timeout.as_secs_f64()
                )));
            }
            Ok(Err(error)) => return Err(PlanError::generation_unavailable(error.to_string())),
            Ok(Ok(response)) => response,
        };

        let model = if response.model.is_empty() {
            self.model()
        } else {
            response.model.as_str()
        };
        let plan = parse_plan(
            &response.content,
            request.target_calories,
            self.config.calorie_tolerance,
            self.config.macro_tolerance,
            model,
        )?;
        Ok((plan, response.content))
    }
}
