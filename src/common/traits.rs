//! Collaborator interfaces consumed by the lattice search core

use crate::common::config::SearchConfig;
use crate::common::types::*;
use crate::path_planning::state_lattice::NodeLattice;

/// 2D cost field over the planning grid
pub trait Costmap {
    /// Number of cells along x
    fn size_x(&self) -> u32;

    /// Number of cells along y
    fn size_y(&self) -> u32;

    /// Cost of an in-bounds cell, `UNKNOWN` for cells without information
    fn cost(&self, x: u32, y: u32) -> u8;
}

/// Footprint validity predicate over continuous lattice poses
#[cfg_attr(test, mockall::automock)]
pub trait CollisionChecker {
    /// Grid bounds `(size_x, size_y)` the checker operates on
    fn grid_size(&self) -> (u32, u32);

    /// Check the robot footprint at `pose`
    fn check(&self, pose: &Coordinates) -> FootprintCheck;
}

/// Distance-to-goal and obstacle heuristics shared by the lattice and
/// hybrid planners.
pub trait HeuristicEngine {
    /// Precompute the SE(2) distance lookup table
    fn precompute_distance_heuristic(
        &mut self,
        lookup_table_dim: f64,
        dim_3_size: u32,
        config: &SearchConfig,
        min_turning_radius: f64,
    );

    /// Restart the obstacle heuristic expansion from a new goal cell
    fn reset_obstacle_heuristic(&mut self, costmap: &dyn Costmap, goal_x: u32, goal_y: u32);

    /// `cost_weight` scales the costmap cost folded into the obstacle field
    fn obstacle_heuristic(
        &mut self,
        costmap: &dyn Costmap,
        node_coords: &Coordinates,
        goal_coords: &Coordinates,
        cost_weight: f64,
    ) -> f64;

    /// `obstacle_heuristic` lets implementations skip work once the
    /// obstacle estimate already dominates.
    fn distance_heuristic(
        &self,
        node_coords: &Coordinates,
        goal_coords: &Coordinates,
        obstacle_heuristic: f64,
    ) -> f64;
}

/// Resolves a lattice index to a node in the driver's arena
pub trait NodeResolver {
    /// Look up the node at `index`, creating it if needed.
    ///
    /// Returns `None` when `index` is not a structurally valid lattice index.
    fn resolve(&mut self, index: u32) -> Option<&NodeLattice>;
}
