//! lattice_planner - state lattice search core for Hybrid-A* planning
//!
//! This crate provides the motion primitive table and the search node used
//! by a state-lattice planner over a 2D costmap with discretized heading,
//! together with reference costmap and collision checker implementations.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod path_planning;

// Re-export common types for convenience
pub use common::{Coordinates, FootprintCheck, LatticeMetadata, Occupancy, TrigValue};
pub use common::{ChangePenaltyPolicy, SearchConfig};
pub use common::{CollisionChecker, Costmap, HeuristicEngine, NodeResolver};
pub use common::{LatticeError, LatticeResult};
pub use path_planning::state_lattice::{LatticeMotionTable, MotionPrimitive, NodeGraph, NodeLattice};
