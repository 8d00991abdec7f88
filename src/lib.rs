// ABOUTME: Main library entry point for the nutriplan engine
// ABOUTME: Turns member health profiles into validated meal plans and manages their assignment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Nutriplan
//!
//! Plan generation and assignment engine for gym members.
//!
//! ## Features
//!
//! - **Derived metrics**: BMI, BMR (Mifflin-St Jeor), TDEE and calorie targets
//! - **Macro splits**: qualifier or goal based protein/carbs/fats ratios
//! - **Typed requests**: a pure builder from profile to [`plans::PlanRequest`]
//! - **Validated generation**: replies from an `OpenAI`-compatible service are
//!   parsed and checked before they become a [`models::GeneratedPlan`]
//! - **Refinement**: append-only transcripts with serialized feedback per session
//! - **Assignment**: at most one active plan per member, with an audit trail
//!
//! ## Architecture
//!
//! - **intelligence**: pure calculations (re-exported from `nutriplan-intelligence`)
//! - **plans**: prompt building, rendering, generation, refinement, assignment
//! - **llm**: provider abstraction and the `OpenAI`-compatible client
//! - **database**: persistence contract and the in-memory store
//! - **engine**: [`engine::PlanEngine`] facade wiring the pipeline together
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nutriplan::config::EngineConfig;
//! use nutriplan::database::InMemoryPlanRepository;
//! use nutriplan::engine::PlanEngine;
//! use nutriplan::llm::OpenAiCompatibleProvider;
//! use nutriplan::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     nutriplan::logging::init_from_env()
//!         .map_err(|e| nutriplan::errors::AppError::internal(e.to_string()))?;
//!
//!     let engine = PlanEngine::new(
//!         Arc::new(OpenAiCompatibleProvider::from_env()?),
//!         Arc::new(InMemoryPlanRepository::new()),
//!         EngineConfig::from_env()?,
//!     );
//!     println!("Engine ready with {} sessions", engine.sessions().len());
//!     Ok(())
//! }
//! ```

pub use nutriplan_core::{constants, errors, models};
pub use nutriplan_intelligence as intelligence;

/// Configuration management
pub mod config;

/// Plan persistence contract and in-memory store
pub mod database;

/// End-to-end plan engine facade
pub mod engine;

/// LLM provider abstraction for the generation service
pub mod llm;

/// Production logging with structured output
pub mod logging;

/// Plan request building, generation, refinement, and assignment
pub mod plans;

pub use engine::PlanEngine;
pub use errors::{AppError, AppResult, PlanError, PlanResult};
pub use plans::{
    AssignMode, DetachOutcome, PlanAssignmentManager, PlanGenerationClient, PlanPromptBuilder,
    PlanRequest, RefinementSessions, ReplaceOutcome,
};
