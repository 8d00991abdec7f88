// ABOUTME: Integration tests for macro split resolution
// ABOUTME: Verifies the lookup table, goal fallback, and the sum-to-one property
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use nutriplan_core::models::Goal;
use nutriplan_intelligence::{MacroRatioResolver, ProteinTarget};

fn ratios(target: Option<ProteinTarget>, goal: Option<Goal>) -> (f64, f64, f64) {
    let split = MacroRatioResolver::resolve(target, goal);
    (split.protein_ratio(), split.carbs_ratio(), split.fats_ratio())
}

#[test]
fn test_table_entries() {
    assert_eq!(ratios(Some(ProteinTarget::High), None), (0.40, 0.30, 0.30));
    assert_eq!(ratios(Some(ProteinTarget::Moderate), None), (0.30, 0.40, 0.30));
    assert_eq!(ratios(Some(ProteinTarget::Low), None), (0.15, 0.60, 0.25));
    assert_eq!(ratios(None, None), (0.30, 0.40, 0.30));
}

#[test]
fn test_goal_fallback() {
    assert_eq!(ratios(None, Some(Goal::WeightLoss)), (0.40, 0.30, 0.30));
    assert_eq!(ratios(None, Some(Goal::MuscleGain)), (0.40, 0.30, 0.30));
    assert_eq!(ratios(None, Some(Goal::Maintenance)), (0.30, 0.40, 0.30));
}

#[test]
fn test_every_resolution_sums_to_one() {
    let targets = [
        None,
        Some(ProteinTarget::High),
        Some(ProteinTarget::Moderate),
        Some(ProteinTarget::Low),
    ];
    let goals = [
        None,
        Some(Goal::WeightLoss),
        Some(Goal::Maintenance),
        Some(Goal::MuscleGain),
    ];

    for target in targets {
        for goal in goals {
            let split = MacroRatioResolver::resolve(target, goal);
            assert!((split.total() - 1.0).abs() < 1e-6, "{target:?}/{goal:?}");
        }
    }
}

#[test]
fn test_free_form_qualifiers() {
    let high = MacroRatioResolver::resolve_str(Some("High Protein"), None).unwrap();
    assert_eq!(high.as_percentages(), (40, 30, 30));

    let low = MacroRatioResolver::resolve_str(Some("low_protein"), Some(Goal::MuscleGain)).unwrap();
    assert_eq!(low.as_percentages(), (15, 60, 25));

    assert!(MacroRatioResolver::resolve_str(Some("keto"), None).is_err());
    assert!(MacroRatioResolver::resolve_str(None, None).is_ok());
}

#[test]
fn test_gram_targets_follow_energy_density() {
    let split = MacroRatioResolver::resolve(Some(ProteinTarget::High), None);
    let grams = split.grams_for(1800);
    assert!((grams.protein_g - 180.0).abs() < 1e-9);
    assert!((grams.carbs_g - 135.0).abs() < 1e-9);
    assert!((grams.fats_g - 60.0).abs() < 1e-9);
}

#[test]
fn test_protein_target_serde_labels() {
    let json = serde_json::to_string(&ProteinTarget::High).unwrap();
    assert_eq!(json, "\"high\"");
    let parsed: ProteinTarget = serde_json::from_str("\"low\"").unwrap();
    assert_eq!(parsed, ProteinTarget::Low);
}
