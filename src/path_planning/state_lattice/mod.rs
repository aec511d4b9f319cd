//! State Lattice search core
//!
//! This module holds the part of a state-lattice Hybrid-A* planner that
//! turns poses into lattice nodes and expands them with precomputed motion
//! primitives. The priority queue driving the search, the costmap, the
//! collision predicate and the heuristics are supplied by the caller.
//!
//! # Components
//!
//! - `motion_primitive`: primitive geometry and the primitive file format
//! - `motion_table`: loading, rotation caching and traversal penalties
//! - `node_lattice`: search node, traversal cost and neighbor expansion
//! - `node_graph`: arena of nodes addressed by lattice index
//!
//! # Example
//!
//! ```no_run
//! use lattice_planner::common::{Coordinates, SearchConfig};
//! use lattice_planner::path_planning::state_lattice::{LatticeMotionTable, NodeGraph};
//! use lattice_planner::utils::{GridCollisionChecker, OccupancyGrid};
//! use lattice_planner::NodeResolver;
//!
//! let config = SearchConfig::with_lattice_filepath("primitives.json");
//! let table = LatticeMotionTable::from_config(100, &config).unwrap();
//! let checker = GridCollisionChecker::point(OccupancyGrid::free(100, 100));
//! let mut graph = NodeGraph::for_table(&table, 100).unwrap();
//!
//! let mut start = *graph.resolve(table.index(10, 10, 0)).unwrap();
//! start.set_pose(Coordinates::new(10.0, 10.0, 0.0));
//!
//! let mut neighbors = Vec::new();
//! start.get_neighbors(&table, &mut graph, &checker, false, &mut neighbors);
//! for neighbor in &neighbors {
//!     let cost = start.get_traversal_cost(&table, neighbor);
//!     println!("{:?} costs {:.2}", neighbor.pose, cost);
//! }
//! ```

pub mod motion_primitive;
pub mod motion_table;
pub mod node_lattice;
pub mod node_graph;

#[cfg(test)]
pub(crate) mod test_fixtures;

// Re-exports
pub use motion_primitive::{
    change_penalty_applies, CurvatureClass, Direction, LatticeFile, LatticeFileMetadata,
    MotionPose, MotionPrimitive, PrimitiveRecord,
};
pub use motion_table::LatticeMotionTable;
pub use node_lattice::NodeLattice;
pub use node_graph::NodeGraph;
