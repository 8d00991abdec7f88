// ABOUTME: Domain error taxonomy for plan generation, refinement, and assignment
// ABOUTME: Separates diagnostic detail from the message shown to end users
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Plan Engine Errors
//!
//! Every fallible engine operation returns [`PlanError`]. `Display` keeps the
//! raw failure reason for logs; [`PlanError::user_message`] gives the text a
//! member or trainer should see.

use super::{AppError, ErrorCode};
use crate::models::{AssignmentId, MemberId, SessionKey};
use serde_json::json;
use thiserror::Error;

/// Generic message shown to end users for any generation failure
pub const GENERATION_USER_MESSAGE: &str = "Could not generate plan, please retry.";

/// Errors raised by the plan engine
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanError {
    /// Health profile data is missing or out of range
    #[error("Invalid profile field '{field}': {reason}")]
    InvalidProfile {
        /// Offending profile field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Caller supplied an invalid argument (empty feedback, bad ratio, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generation service answered but the payload failed validation
    #[error("Generation response rejected: {reason}")]
    GenerationParse {
        /// Structural or numeric validation failure
        reason: String,
        /// Leading part of the raw payload, kept for diagnostics
        excerpt: String,
    },

    /// Generation service unreachable, failed, or timed out
    #[error("Generation service unavailable: {reason}")]
    GenerationUnavailable {
        /// Transport-level failure reason
        reason: String,
    },

    /// Attach attempted while the member already has an active plan
    #[error("Member {member_id} already has active assignment {assignment_id}")]
    AlreadyAssigned {
        /// Member holding the assignment
        member_id: MemberId,
        /// Currently active assignment
        assignment_id: AssignmentId,
    },

    /// The active assignment changed between read and write
    #[error("Assignment for member {member_id} changed concurrently (expected {expected:?})")]
    AssignmentConflict {
        /// Member whose assignment changed
        member_id: MemberId,
        /// Assignment the caller expected to be active
        expected: Option<AssignmentId>,
    },

    /// Persistence collaborator failed; no state was changed
    #[error("Persistence operation '{operation}' failed: {reason}")]
    Persistence {
        /// Name of the failed operation
        operation: &'static str,
        /// Failure reason reported by the store
        reason: String,
    },

    /// No refinement session exists for the key
    #[error("Refinement session {0} not found")]
    SessionNotFound(SessionKey),
}

impl PlanError {
    /// Create an invalid profile error
    #[must_use]
    pub fn invalid_profile(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidProfile {
            field,
            reason: reason.into(),
        }
    }

    /// Create an invalid input error
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a generation parse error, keeping at most 200 chars of the payload
    #[must_use]
    pub fn generation_parse(reason: impl Into<String>, raw: &str) -> Self {
        Self::GenerationParse {
            reason: reason.into(),
            excerpt: raw.chars().take(200).collect(),
        }
    }

    /// Create a generation unavailable error
    #[must_use]
    pub fn generation_unavailable(reason: impl Into<String>) -> Self {
        Self::GenerationUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a persistence error
    #[must_use]
    pub fn persistence(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Persistence {
            operation,
            reason: reason.into(),
        }
    }

    /// Whether the caller may retry the same operation
    ///
    /// Parse failures get one stricter retry; conflicts need a refetch first.
    /// Unavailability is not retried automatically because generation calls are costly.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::GenerationParse { .. } | Self::AssignmentConflict { .. }
        )
    }

    /// Whether this is a generation failure of either kind
    #[must_use]
    pub const fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            Self::GenerationParse { .. } | Self::GenerationUnavailable { .. }
        )
    }

    /// Message suitable for end users
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidProfile { field, reason } => {
                format!("Please check the '{field}' value in the health profile: {reason}")
            }
            Self::InvalidInput(message) => message.clone(),
            Self::GenerationParse { .. } | Self::GenerationUnavailable { .. } => {
                GENERATION_USER_MESSAGE.to_owned()
            }
            Self::AlreadyAssigned { .. } => {
                "This member already has an active plan. Replace it instead.".to_owned()
            }
            Self::AssignmentConflict { .. } => {
                "The member's plan changed while saving. Reload and try again.".to_owned()
            }
            Self::Persistence { .. } => {
                "The plan assignment could not be saved. No changes were made.".to_owned()
            }
            Self::SessionNotFound(_) => {
                "This refinement session has expired. Generate a new plan.".to_owned()
            }
        }
    }

    /// Error code used when crossing into [`AppError`]
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidProfile { .. } => ErrorCode::InvalidProfile,
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::GenerationParse { .. } => ErrorCode::ExternalResponseInvalid,
            Self::GenerationUnavailable { .. } => ErrorCode::ExternalServiceUnavailable,
            Self::AlreadyAssigned { .. } => ErrorCode::ResourceAlreadyExists,
            Self::AssignmentConflict { .. } => ErrorCode::ResourceConflict,
            Self::Persistence { .. } => ErrorCode::StorageError,
            Self::SessionNotFound(_) => ErrorCode::ResourceNotFound,
        }
    }
}

impl From<PlanError> for AppError {
    fn from(error: PlanError) -> Self {
        let code = error.code();
        let details = match &error {
            PlanError::InvalidProfile { field, .. } => json!({ "field": field }),
            PlanError::GenerationParse { excerpt, .. } => json!({ "excerpt": excerpt }),
            PlanError::Persistence { operation, .. } => json!({ "operation": operation }),
            PlanError::AlreadyAssigned { assignment_id, .. } => {
                json!({ "assignment_id": assignment_id.to_string() })
            }
            _ => serde_json::Value::Null,
        };
        let resource_id = match &error {
            PlanError::AlreadyAssigned { member_id, .. }
            | PlanError::AssignmentConflict { member_id, .. } => Some(member_id.to_string()),
            PlanError::SessionNotFound(key) => Some(key.to_string()),
            _ => None,
        };

        let mut app_error = Self::new(code, error.to_string()).with_details(details);
        if let Some(id) = resource_id {
            app_error = app_error.with_resource_id(id);
        }
        app_error.with_source(error)
    }
}

/// Result alias for engine operations
pub type PlanResult<T> = Result<T, PlanError>;
