//! Search configuration consumed by the lattice motion table

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::common::error::{LatticeError, LatticeResult};

/// When the change penalty applies between two consecutive primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangePenaltyPolicy {
    /// Both primitives turn, in opposite directions
    OppositeTurn,
    /// The curvature classes (straight / left / right) differ
    AnyClassChange,
}

impl Default for ChangePenaltyPolicy {
    fn default() -> Self {
        ChangePenaltyPolicy::OppositeTurn
    }
}

/// Planner options recognized by the motion table.
///
/// The minimum turning radius always comes from the primitive file, so it
/// is not a field here and unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Primitive library to load
    pub lattice_filepath: PathBuf,
    /// Penalty for changing curvature class between primitives
    pub change_penalty: f64,
    /// Penalty for any primitive that is not straight
    pub non_straight_penalty: f64,
    /// Penalty for switching into reverse
    pub reverse_penalty: f64,
    /// Weight of the normalized occupancy cost along a primitive
    pub cost_penalty: f64,
    /// Weight handed to the heuristic engine
    pub obstacle_heuristic_cost_weight: f64,
    /// Also expand primitives driven backwards
    pub allow_reverse_expansion: bool,
    pub change_penalty_policy: ChangePenaltyPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            lattice_filepath: PathBuf::new(),
            change_penalty: 0.05,
            non_straight_penalty: 1.05,
            reverse_penalty: 2.0,
            cost_penalty: 2.0,
            obstacle_heuristic_cost_weight: 0.5,
            allow_reverse_expansion: false,
            change_penalty_policy: ChangePenaltyPolicy::default(),
        }
    }
}

impl SearchConfig {
    pub fn with_lattice_filepath<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            lattice_filepath: path.into(),
            ..Default::default()
        }
    }

    /// Reject values that would allow zero or negative edge costs
    pub fn validate(&self) -> LatticeResult<()> {
        if self.lattice_filepath.as_os_str().is_empty() {
            return Err(LatticeError::Configuration(
                "lattice_filepath must name a primitive file".to_string(),
            ));
        }

        let weights = [
            ("change_penalty", self.change_penalty),
            ("non_straight_penalty", self.non_straight_penalty),
            ("reverse_penalty", self.reverse_penalty),
            ("cost_penalty", self.cost_penalty),
            ("obstacle_heuristic_cost_weight", self.obstacle_heuristic_cost_weight),
        ];
        for (name, value) in weights.iter() {
            if !value.is_finite() || *value < 0.0 {
                return Err(LatticeError::Configuration(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}
