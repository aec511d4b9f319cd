//! State Lattice search node
//!
//! One discretized (x, y, heading bin) cell of the lattice together with the
//! bookkeeping the search driver needs. Nodes are small `Copy` values: the
//! driver hands a snapshot of the node being expanded to `get_neighbors`
//! while the arena stays free for the resolver to borrow mutably.

use crate::common::config::SearchConfig;
use crate::common::error::{LatticeError, LatticeResult};
use crate::common::traits::{CollisionChecker, Costmap, HeuristicEngine, NodeResolver};
use crate::common::types::{Coordinates, FootprintCheck, Occupancy, MAX_NON_OBSTACLE};

use super::motion_primitive::{change_penalty_applies, CurvatureClass, Direction, MotionPrimitive};
use super::motion_table::LatticeMotionTable;

/// Lattice search node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeLattice {
    /// Continuous pose actually reached inside the cell
    pub pose: Coordinates,
    /// Index of the predecessor in the same arena
    pub parent: Option<u32>,
    cell_cost: f64,
    accumulated_cost: f64,
    index: u32,
    was_visited: bool,
    is_queued: bool,
    motion_primitive: Option<u32>,
}

impl NodeLattice {
    pub fn new(index: u32) -> Self {
        Self {
            pose: Coordinates::default(),
            parent: None,
            cell_cost: 0.0,
            accumulated_cost: f64::INFINITY,
            index,
            was_visited: false,
            is_queued: false,
            motion_primitive: None,
        }
    }

    /// Return to the unreached state for a new search
    pub fn reset(&mut self) {
        self.parent = None;
        self.cell_cost = 0.0;
        self.accumulated_cost = f64::INFINITY;
        self.was_visited = false;
        self.is_queued = false;
        self.motion_primitive = None;
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn set_pose(&mut self, pose: Coordinates) {
        self.pose = pose;
    }

    pub fn pose(&self) -> &Coordinates {
        &self.pose
    }

    /// Motion primitive (table id) used to reach this node
    pub fn motion_primitive(&self) -> Option<u32> {
        self.motion_primitive
    }

    pub fn set_motion_primitive(&mut self, id: Option<u32>) {
        self.motion_primitive = id;
    }

    pub fn accumulated_cost(&self) -> f64 {
        self.accumulated_cost
    }

    pub fn set_accumulated_cost(&mut self, cost: f64) {
        self.accumulated_cost = cost;
    }

    /// Costmap cost cached by the last validity check
    pub fn cell_cost(&self) -> f64 {
        self.cell_cost
    }

    pub fn was_visited(&self) -> bool {
        self.was_visited
    }

    pub fn visited(&mut self) {
        self.was_visited = true;
        self.is_queued = false;
    }

    pub fn is_queued(&self) -> bool {
        self.is_queued
    }

    pub fn queued(&mut self) {
        self.is_queued = true;
    }

    pub fn parent(&self) -> Option<u32> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: Option<u32>) {
        self.parent = parent;
    }

    /// Take over the pose, primitive and cell cost of an expansion candidate
    pub fn adopt(&mut self, candidate: &NodeLattice) {
        self.pose = candidate.pose;
        self.motion_primitive = candidate.motion_primitive;
        self.cell_cost = candidate.cell_cost;
    }

    /// Check that this node is in bounds and its footprint is collision free.
    ///
    /// Unknown space is accepted only when `traverse_unknown` is set. The
    /// footprint cost is cached for `get_traversal_cost`.
    pub fn is_node_valid<C: CollisionChecker + ?Sized>(
        &mut self,
        traverse_unknown: bool,
        collision_checker: &C,
    ) -> bool {
        if !in_bounds(&self.pose, collision_checker.grid_size()) {
            return false;
        }

        let check = collision_checker.check(&self.pose);
        self.cell_cost = check.cost;
        footprint_allowed(&check, traverse_unknown)
    }

    /// Cost of the edge from this node to `child`, reached with the
    /// primitive recorded on `child`.
    pub fn get_traversal_cost(&self, motion_table: &LatticeMotionTable, child: &NodeLattice) -> f64 {
        let primitive = match child.motion_primitive.and_then(|id| motion_table.primitive(id)) {
            Some(primitive) => primitive,
            None => return 0.0,
        };
        let incoming = self.motion_primitive.and_then(|id| motion_table.primitive(id));

        let normalized_cost = child.cell_cost / MAX_NON_OBSTACLE as f64;
        let mut cost =
            primitive.trajectory_length * (1.0 + motion_table.cost_penalty() * normalized_cost);

        let class = primitive.curvature_class();
        if let Some(previous) = incoming {
            if change_penalty_applies(
                motion_table.change_penalty_policy(),
                previous.curvature_class(),
                class,
            ) {
                cost += motion_table.change_penalty();
            }
        }

        if class != CurvatureClass::Straight {
            cost += motion_table.non_straight_penalty();
        }

        // Charged once when switching into reverse, not on every reverse edge
        let incoming_direction = incoming.map_or(Direction::Forward, |p| p.direction);
        if primitive.direction == Direction::Reverse && incoming_direction != Direction::Reverse {
            cost += motion_table.reverse_penalty();
        }

        cost
    }

    /// Collect every valid successor of this node into `neighbors`.
    ///
    /// Candidates are snapshots of the resolved arena nodes carrying the
    /// pose and primitive of this expansion; the arena itself is not
    /// modified beyond what `validity_checker` materializes. Neighbors are
    /// appended in primitive order.
    pub fn get_neighbors<R, C>(
        &self,
        motion_table: &LatticeMotionTable,
        validity_checker: &mut R,
        collision_checker: &C,
        traverse_unknown: bool,
        neighbors: &mut Vec<NodeLattice>,
    ) where
        R: NodeResolver + ?Sized,
        C: CollisionChecker + ?Sized,
    {
        let grid_size = collision_checker.grid_size();
        let size_x = motion_table.size_x();
        let num_angle_bins = motion_table.num_angle_bins();

        for primitive in motion_table.get_projections(self) {
            let end = primitive.end_pose();
            let child_pose = Coordinates::new(
                self.pose.x + end.x,
                self.pose.y + end.y,
                primitive.end_angle as f64,
            );

            let (x, y) = match child_pose.cell() {
                Some((x, y)) if x < size_x && in_bounds(&child_pose, grid_size) => (x, y),
                _ => continue,
            };

            if !self.is_path_valid(primitive, traverse_unknown, collision_checker) {
                continue;
            }

            let index = match Self::checked_index(
                x,
                y,
                primitive.end_angle,
                size_x,
                grid_size.1,
                num_angle_bins,
            ) {
                Ok(index) if index != self.index => index,
                _ => continue,
            };

            let mut neighbor = match validity_checker.resolve(index) {
                Some(node) => *node,
                None => continue,
            };
            neighbor.set_pose(child_pose);
            neighbor.set_motion_primitive(Some(primitive.id));

            if neighbor.is_node_valid(traverse_unknown, collision_checker) {
                neighbors.push(neighbor);
            }
        }
    }

    /// Intermediate poses of `primitive` applied from this node
    fn is_path_valid<C: CollisionChecker + ?Sized>(
        &self,
        primitive: &MotionPrimitive,
        traverse_unknown: bool,
        collision_checker: &C,
    ) -> bool {
        let grid_size = collision_checker.grid_size();
        primitive.intermediate_poses().iter().all(|offset| {
            let pose = offset.apply_to(&self.pose);
            in_bounds(&pose, grid_size)
                && footprint_allowed(&collision_checker.check(&pose), traverse_unknown)
        })
    }

    // ========================================================================
    // Index <-> coordinate mapping (shared with the hybrid planner)
    // ========================================================================

    /// Index of cell (x, y) at heading bin `angle`.
    ///
    /// Unchecked: the lattice must fit in `u32`, which `NodeGraph::new`
    /// enforces. Use `checked_index` otherwise.
    pub fn get_index(x: u32, y: u32, angle: u32, width: u32, angle_quantization: u32) -> u32 {
        (y * width + x) * angle_quantization + angle
    }

    /// Index of an arbitrary triple, rejecting values outside the lattice
    pub fn checked_index(
        x: u32,
        y: u32,
        angle: u32,
        width: u32,
        height: u32,
        angle_quantization: u32,
    ) -> LatticeResult<u32> {
        if x >= width || y >= height || angle >= angle_quantization {
            return Err(LatticeError::Index { x, y, angle });
        }
        let index = (y as u64 * width as u64 + x as u64) * angle_quantization as u64 + angle as u64;
        if index > u32::MAX as u64 {
            return Err(LatticeError::Index { x, y, angle });
        }
        Ok(index as u32)
    }

    pub fn get_coords(index: u32, width: u32, angle_quantization: u32) -> Coordinates {
        Coordinates::new(
            ((index / angle_quantization) % width) as f64,
            (index / (angle_quantization * width)) as f64,
            (index % angle_quantization) as f64,
        )
    }

    // ========================================================================
    // Heuristics (delegated to the shared heuristic engine)
    // ========================================================================

    /// The obstacle cost weight comes from the motion table
    pub fn get_heuristic_cost<H: HeuristicEngine + ?Sized>(
        heuristic: &mut H,
        node_coords: &Coordinates,
        goal_coords: &Coordinates,
        costmap: &dyn Costmap,
        motion_table: &LatticeMotionTable,
    ) -> f64 {
        let obstacle_heuristic =
            Self::get_obstacle_heuristic(heuristic, costmap, node_coords, goal_coords, motion_table);
        let distance_heuristic =
            Self::get_distance_heuristic(heuristic, node_coords, goal_coords, obstacle_heuristic);
        obstacle_heuristic.max(distance_heuristic)
    }

    pub fn get_obstacle_heuristic<H: HeuristicEngine + ?Sized>(
        heuristic: &mut H,
        costmap: &dyn Costmap,
        node_coords: &Coordinates,
        goal_coords: &Coordinates,
        motion_table: &LatticeMotionTable,
    ) -> f64 {
        heuristic.obstacle_heuristic(
            costmap,
            node_coords,
            goal_coords,
            motion_table.obstacle_heuristic_cost_weight(),
        )
    }

    pub fn get_distance_heuristic<H: HeuristicEngine + ?Sized>(
        heuristic: &H,
        node_coords: &Coordinates,
        goal_coords: &Coordinates,
        obstacle_heuristic: f64,
    ) -> f64 {
        heuristic.distance_heuristic(node_coords, goal_coords, obstacle_heuristic)
    }

    pub fn reset_obstacle_heuristic<H: HeuristicEngine + ?Sized>(
        heuristic: &mut H,
        costmap: &dyn Costmap,
        goal_x: u32,
        goal_y: u32,
    ) {
        heuristic.reset_obstacle_heuristic(costmap, goal_x, goal_y);
    }

    /// The minimum turning radius comes from the loaded primitive library
    pub fn precompute_distance_heuristic<H: HeuristicEngine + ?Sized>(
        heuristic: &mut H,
        lookup_table_dim: f64,
        dim_3_size: u32,
        config: &SearchConfig,
        motion_table: &LatticeMotionTable,
    ) {
        heuristic.precompute_distance_heuristic(
            lookup_table_dim,
            dim_3_size,
            config,
            motion_table.min_turning_radius(),
        );
    }
}

fn in_bounds(pose: &Coordinates, (size_x, size_y): (u32, u32)) -> bool {
    match pose.cell() {
        Some((x, y)) => x < size_x && y < size_y,
        None => false,
    }
}

fn footprint_allowed(check: &FootprintCheck, traverse_unknown: bool) -> bool {
    match check.occupancy {
        Occupancy::Free => true,
        Occupancy::Occupied => false,
        Occupancy::Unknown => traverse_unknown,
    }
}
