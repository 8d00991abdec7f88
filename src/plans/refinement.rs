// ABOUTME: Conversational refinement of generated plans over an append-only transcript
// ABOUTME: Sessions are keyed per member and serialized so concurrent feedback never forks a transcript
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Refinement Loop
//!
//! [`submit_feedback`] is the stateless core: it takes a transcript and
//! feedback and returns a new transcript and a new plan, leaving its inputs
//! untouched. [`RefinementSessions`] keeps one transcript per
//! `(member_id, session_id)` and runs feedback for the same session one at a
//! time.

use std::sync::Arc;

use dashmap::DashMap;
use nutriplan_core::errors::PlanError;
use nutriplan_core::models::{
    ConversationRole, ConversationTranscript, GeneratedPlan, MemberId, SessionId, SessionKey,
};
use tokio::sync::Mutex;
use tracing::{info, instrument};

use super::generation::{GenerationOutput, PlanGenerationClient};
use super::prompt_builder::PlanRequest;
use crate::logging::PlanLogger;

/// New transcript and plan produced by one feedback round
#[derive(Debug, Clone)]
pub struct RefinementOutcome {
    /// Transcript extended by the feedback and the AI reply
    pub transcript: ConversationTranscript,
    /// Freshly generated plan
    pub plan: GeneratedPlan,
}

/// Transcript holding the initial AI turn of a generation
#[must_use]
pub fn initial_transcript(output: &GenerationOutput) -> ConversationTranscript {
    ConversationTranscript::new().with_turn_now(ConversationRole::Ai, output.raw_reply.clone())
}

/// Apply one round of feedback
///
/// Appends the feedback as a user turn, regenerates from the original request
/// plus the whole transcript, and appends the reply as an AI turn. On failure
/// nothing is returned and `transcript` is unchanged.
///
/// # Errors
///
/// Returns `InvalidInput` for blank feedback or a transcript without the
/// initial plan turn, or any generation error.
pub async fn submit_feedback(
    client: &PlanGenerationClient,
    request: &PlanRequest,
    transcript: &ConversationTranscript,
    feedback: &str,
) -> Result<RefinementOutcome, PlanError> {
    let feedback = feedback.trim();
    if feedback.is_empty() {
        return Err(PlanError::invalid_input("feedback must not be empty"));
    }
    if transcript.is_empty() {
        return Err(PlanError::invalid_input(
            "transcript must start with the generated plan",
        ));
    }

    let with_feedback = transcript.with_turn_now(ConversationRole::User, feedback);
    let output = client.regenerate(request, &with_feedback).await?;
    let transcript = with_feedback.with_turn_now(ConversationRole::Ai, output.raw_reply);

    Ok(RefinementOutcome {
        transcript,
        plan: output.plan,
    })
}

struct SessionState {
    request: PlanRequest,
    transcript: ConversationTranscript,
    latest_plan: GeneratedPlan,
}

/// Registry of in-progress refinement sessions
pub struct RefinementSessions {
    client: PlanGenerationClient,
    sessions: DashMap<SessionKey, Arc<Mutex<SessionState>>>,
}

impl RefinementSessions {
    /// Create an empty registry
    #[must_use]
    pub fn new(client: PlanGenerationClient) -> Self {
        Self {
            client,
            sessions: DashMap::new(),
        }
    }

    /// Generate the initial plan and open a session for it
    ///
    /// # Errors
    ///
    /// Returns any generation error; no session is created in that case.
    #[instrument(skip(self, request), fields(member_id = %member_id))]
    pub async fn start(
        &self,
        member_id: MemberId,
        request: PlanRequest,
    ) -> Result<(SessionKey, GeneratedPlan), PlanError> {
        let output = self.client.generate(&request).await?;
        let key = SessionKey::new(member_id, SessionId::new());
        let transcript = initial_transcript(&output);
        PlanLogger::log_refinement(&key, transcript.len(), 0);

        let plan = output.plan;
        self.sessions.insert(
            key.clone(),
            Arc::new(Mutex::new(SessionState {
                request,
                transcript,
                latest_plan: plan.clone(),
            })),
        );
        Ok((key, plan))
    }

    /// Apply feedback to a session, waiting for any round already running on it
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` for an unknown key, or any error of
    /// [`submit_feedback`]; the stored transcript is unchanged on error.
    #[instrument(skip(self, feedback), fields(session = %key))]
    pub async fn submit_feedback(
        &self,
        key: &SessionKey,
        feedback: &str,
    ) -> Result<RefinementOutcome, PlanError> {
        let session = self.session(key)?;
        let mut state = session.lock().await;

        let outcome = submit_feedback(&self.client, &state.request, &state.transcript, feedback)
            .await?;
        state.transcript = outcome.transcript.clone();
        state.latest_plan = outcome.plan.clone();

        PlanLogger::log_refinement(key, state.transcript.len(), state.transcript.feedback_count());
        Ok(outcome)
    }

    /// Snapshot of a session transcript
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` for an unknown key.
    pub async fn transcript(&self, key: &SessionKey) -> Result<ConversationTranscript, PlanError> {
        let session = self.session(key)?;
        let state = session.lock().await;
        Ok(state.transcript.clone())
    }

    /// Most recent plan of a session
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` for an unknown key.
    pub async fn latest_plan(&self, key: &SessionKey) -> Result<GeneratedPlan, PlanError> {
        let session = self.session(key)?;
        let state = session.lock().await;
        Ok(state.latest_plan.clone())
    }

    /// Drop a session; returns whether it existed
    pub fn close(&self, key: &SessionKey) -> bool {
        let existed = self.sessions.remove(key).is_some();
        if existed {
            info!(session = %key, "Refinement session closed");
        }
        existed
    }

    /// Number of open sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is open
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn session(&self, key: &SessionKey) -> Result<Arc<Mutex<SessionState>>, PlanError> {
        self.sessions
            .get(key)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| PlanError::SessionNotFound(key.clone()))
    }
}
