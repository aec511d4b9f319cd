//! Reference collaborators: an occupancy-grid costmap and a footprint
//! collision checker over it

pub mod grid_map;
pub mod collision_checker;

pub use grid_map::*;
pub use collision_checker::*;
