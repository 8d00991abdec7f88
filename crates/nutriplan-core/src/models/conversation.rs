// ABOUTME: Append-only refinement transcript of AI and user turns
// ABOUTME: Turns are never reordered or edited; timestamps never decrease
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::PlanError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationRole {
    /// Generation service reply
    Ai,
    /// Member or trainer feedback
    User,
}

impl ConversationRole {
    /// Convert to string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::User => "user",
        }
    }
}

/// A single turn of the refinement conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who produced the turn
    pub role: ConversationRole,
    /// Message text
    pub message: String,
    /// When the turn was recorded
    pub timestamp: DateTime<Utc>,
}

/// Ordered, append-only sequence of conversation turns
///
/// Appending returns a new transcript and leaves the original untouched, so a
/// failed refinement can simply discard the extended copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ConversationTurn>", into = "Vec<ConversationTurn>")]
pub struct ConversationTranscript {
    turns: Vec<ConversationTurn>,
}

impl ConversationTranscript {
    /// Create an empty transcript
    #[must_use]
    pub const fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Return a copy extended by one turn at an explicit timestamp
    ///
    /// # Errors
    ///
    /// Returns `PlanError::InvalidInput` if `timestamp` is earlier than the last turn.
    pub fn with_turn(
        &self,
        role: ConversationRole,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, PlanError> {
        if let Some(last) = self.turns.last() {
            if timestamp < last.timestamp {
                return Err(PlanError::invalid_input(format!(
                    "turn timestamp {timestamp} precedes last turn at {}",
                    last.timestamp
                )));
            }
        }

        let mut turns = self.turns.clone();
        turns.push(ConversationTurn {
            role,
            message: message.into(),
            timestamp,
        });
        Ok(Self { turns })
    }

    /// Return a copy extended by one turn stamped now
    ///
    /// A wall clock that stepped backwards is clamped to the last turn's timestamp.
    #[must_use]
    pub fn with_turn_now(&self, role: ConversationRole, message: impl Into<String>) -> Self {
        let now = Utc::now();
        let timestamp = self
            .turns
            .last()
            .map_or(now, |last| last.timestamp.max(now));

        let mut turns = self.turns.clone();
        turns.push(ConversationTurn {
            role,
            message: message.into(),
            timestamp,
        });
        Self { turns }
    }

    /// Turns in insertion order
    #[must_use]
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Number of turns
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the transcript has no turns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Most recent turn
    #[must_use]
    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    /// Number of user feedback turns
    #[must_use]
    pub fn feedback_count(&self) -> usize {
        self.turns
            .iter()
            .filter(|turn| turn.role == ConversationRole::User)
            .count()
    }
}

impl TryFrom<Vec<ConversationTurn>> for ConversationTranscript {
    type Error = PlanError;

    fn try_from(turns: Vec<ConversationTurn>) -> Result<Self, Self::Error> {
        if turns
            .windows(2)
            .any(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            return Err(PlanError::invalid_input(
                "transcript timestamps must be non-decreasing",
            ));
        }
        Ok(Self { turns })
    }
}

impl From<ConversationTranscript> for Vec<ConversationTurn> {
    fn from(transcript: ConversationTranscript) -> Self {
        transcript.turns
    }
}
