// ABOUTME: Protein qualifier to macronutrient split lookup
// ABOUTME: Compile-time checked table; falls back to the member's goal when no qualifier is given
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use nutriplan_core::errors::PlanError;
use nutriplan_core::models::{Goal, MacroSplit};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// High protein: 40% protein, 30% carbohydrates, 30% fats
pub const HIGH_PROTEIN_SPLIT: MacroSplit = MacroSplit::from_basis_points(4000, 3000, 3000);
/// Moderate protein (default): 30% protein, 40% carbohydrates, 30% fats
pub const MODERATE_PROTEIN_SPLIT: MacroSplit = MacroSplit::from_basis_points(3000, 4000, 3000);
/// Low protein: 15% protein, 60% carbohydrates, 25% fats
pub const LOW_PROTEIN_SPLIT: MacroSplit = MacroSplit::from_basis_points(1500, 6000, 2500);

/// Qualitative protein target chosen by the trainer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProteinTarget {
    /// Protein-forward split
    High,
    /// Balanced split
    Moderate,
    /// Carbohydrate-forward split
    Low,
}

impl ProteinTarget {
    /// Convert to string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Moderate => "moderate",
            Self::Low => "low",
        }
    }

    /// Lookup table entry for this target
    #[must_use]
    pub const fn split(&self) -> MacroSplit {
        match self {
            Self::High => HIGH_PROTEIN_SPLIT,
            Self::Moderate => MODERATE_PROTEIN_SPLIT,
            Self::Low => LOW_PROTEIN_SPLIT,
        }
    }
}

impl fmt::Display for ProteinTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProteinTarget {
    type Err = PlanError;

    /// Accepts "high", "High Protein", "low-protein", "moderate_protein",
    /// "medium", "balanced" and "default"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        let qualifier = normalized
            .strip_suffix("protein")
            .unwrap_or(&normalized)
            .trim();

        match qualifier {
            "high" => Ok(Self::High),
            "moderate" | "medium" | "balanced" | "default" => Ok(Self::Moderate),
            "low" => Ok(Self::Low),
            _ => Err(PlanError::invalid_input(format!(
                "unknown protein target '{}'",
                s.trim()
            ))),
        }
    }
}

/// Resolves a macro split from an explicit qualifier or the member's goal
#[derive(Debug, Clone, Copy, Default)]
pub struct MacroRatioResolver;

impl MacroRatioResolver {
    /// Resolve a split
    ///
    /// An explicit target always wins. Without one, weight loss and muscle
    /// gain resolve to the high protein split and maintenance to moderate.
    /// With neither, the moderate split applies.
    #[must_use]
    pub const fn resolve(target: Option<ProteinTarget>, goal: Option<Goal>) -> MacroSplit {
        match (target, goal) {
            (Some(target), _) => target.split(),
            (None, Some(goal)) => Self::target_for_goal(goal).split(),
            (None, None) => MODERATE_PROTEIN_SPLIT,
        }
    }

    /// Resolve from a free-form qualifier such as "high protein"
    ///
    /// A blank qualifier is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::InvalidInput` for an unrecognized qualifier
    pub fn resolve_str(qualifier: Option<&str>, goal: Option<Goal>) -> Result<MacroSplit, PlanError> {
        let target = qualifier
            .filter(|q| !q.trim().is_empty())
            .map(str::parse::<ProteinTarget>)
            .transpose()?;
        Ok(Self::resolve(target, goal))
    }

    /// Protein target implied by a goal
    #[must_use]
    pub const fn target_for_goal(goal: Goal) -> ProteinTarget {
        match goal {
            Goal::WeightLoss | Goal::MuscleGain => ProteinTarget::High,
            Goal::Maintenance => ProteinTarget::Moderate,
        }
    }
}
