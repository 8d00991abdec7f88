// ABOUTME: Core types and constants for the nutriplan engine
// ABOUTME: Foundation crate with error taxonomy, identifiers, and the plan data model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Nutriplan Core
//!
//! Foundation crate providing shared types and constants for the nutriplan
//! engine. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode`, and the `PlanError` domain taxonomy
//! - **constants**: energy densities, tolerances, and scheduling defaults
//! - **models**: health profile, derived metrics, plans, transcripts, assignments

/// Unified error handling system with standard error codes
pub mod errors;

/// Engine constants organized by domain
pub mod constants;

/// Core data models
pub mod models;
