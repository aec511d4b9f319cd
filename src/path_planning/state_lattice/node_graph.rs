//! Arena of lattice nodes for one plan
//!
//! Nodes are materialized lazily on first lookup and addressed by their
//! lattice index; predecessors are stored as indices into the same arena.

use std::collections::HashMap;

use crate::common::error::{LatticeError, LatticeResult};
use crate::common::traits::NodeResolver;
use crate::common::types::Coordinates;

use super::motion_table::LatticeMotionTable;
use super::node_lattice::NodeLattice;

#[derive(Debug, Clone)]
pub struct NodeGraph {
    nodes: HashMap<u32, NodeLattice>,
    size_x: u32,
    size_y: u32,
    num_angle_bins: u32,
}

/// Lattice indices are `u32`, so at most `u32::MAX + 1` cells are addressable
const MAX_CAPACITY: u64 = u32::MAX as u64 + 1;

impl NodeGraph {
    /// Fails when the lattice has more cells than a `u32` index can address
    pub fn new(size_x: u32, size_y: u32, num_angle_bins: u32) -> LatticeResult<Self> {
        let capacity = size_x as u64 * size_y as u64 * num_angle_bins as u64;
        if capacity > MAX_CAPACITY {
            return Err(LatticeError::Configuration(format!(
                "lattice of {}x{} cells with {} headings has {} nodes, more than {} are not indexable",
                size_x, size_y, num_angle_bins, capacity, MAX_CAPACITY
            )));
        }

        Ok(Self {
            nodes: HashMap::new(),
            size_x,
            size_y,
            num_angle_bins,
        })
    }

    /// Arena matching the width and heading bins of `motion_table`
    pub fn for_table(motion_table: &LatticeMotionTable, size_y: u32) -> LatticeResult<Self> {
        Self::new(motion_table.size_x(), size_y, motion_table.num_angle_bins())
    }

    /// Number of lattice cells addressable by this arena
    pub fn capacity(&self) -> u64 {
        self.size_x as u64 * self.size_y as u64 * self.num_angle_bins as u64
    }

    pub fn is_valid_index(&self, index: u32) -> bool {
        (index as u64) < self.capacity()
    }

    pub fn node(&self, index: u32) -> Option<&NodeLattice> {
        self.nodes.get(&index)
    }

    pub fn node_mut(&mut self, index: u32) -> Option<&mut NodeLattice> {
        self.nodes.get_mut(&index)
    }

    /// Commit `candidate` if reaching it through `parent` at `cost` is cheaper
    /// than what the arena holds. Visited nodes are final.
    pub fn relax(&mut self, candidate: &NodeLattice, parent: u32, cost: f64) -> bool {
        let node = match self.nodes.get_mut(&candidate.index()) {
            Some(node) => node,
            None => return false,
        };
        if node.was_visited() || cost >= node.accumulated_cost() {
            return false;
        }

        node.adopt(candidate);
        node.set_parent(Some(parent));
        node.set_accumulated_cost(cost);
        node.queued();
        true
    }

    /// Poses from the start of the search to `index`
    pub fn backtrace(&self, index: u32) -> Vec<Coordinates> {
        let mut path = Vec::new();
        let mut current = self.nodes.get(&index);

        while let Some(node) = current {
            path.push(node.pose);
            // Guard against a corrupted parent chain
            if path.len() > self.nodes.len() {
                break;
            }
            current = node.parent().and_then(|parent| self.nodes.get(&parent));
        }

        path.reverse();
        path
    }

    /// Return every materialized node to its unreached state
    pub fn reset(&mut self) {
        for node in self.nodes.values_mut() {
            node.reset();
        }
    }

    /// Drop all nodes, e.g. when the grid changes size
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl NodeResolver for NodeGraph {
    fn resolve(&mut self, index: u32) -> Option<&NodeLattice> {
        if !self.is_valid_index(index) {
            return None;
        }
        Some(self.nodes.entry(index).or_insert_with(|| NodeLattice::new(index)))
    }
}
