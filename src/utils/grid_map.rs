// Occupancy grid costmap backed by a nalgebra matrix.
// Rows index y, columns index x.

use std::ops::Deref;
extern crate nalgebra as na;

use crate::common::{Costmap, LatticeError, LatticeResult, FREE_SPACE, UNKNOWN};

#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    grid: na::DMatrix<u8>,
}

impl OccupancyGrid {
    /// Build a grid from a cost matrix, upsampling every cell to `scale x scale`
    pub fn new(original_matrix: na::DMatrix<u8>, scale: usize) -> LatticeResult<Self> {
        if scale < 1 {
            return Err(LatticeError::Configuration("scale must be >= 1".to_string()));
        }
        let grid = original_matrix.kronecker(&na::DMatrix::<u8>::repeat(scale, scale, 1));
        Ok(Self { grid })
    }

    /// Entirely free grid of `size_x` by `size_y` cells
    pub fn free(size_x: u32, size_y: u32) -> Self {
        Self {
            grid: na::DMatrix::from_element(size_y as usize, size_x as usize, FREE_SPACE),
        }
    }

    /// Grid with no information in any cell
    pub fn unknown(size_x: u32, size_y: u32) -> Self {
        Self {
            grid: na::DMatrix::from_element(size_y as usize, size_x as usize, UNKNOWN),
        }
    }

    pub fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.size_x() && y < self.size_y()
    }

    pub fn set_cost(&mut self, x: u32, y: u32, cost: u8) {
        if self.in_bounds(x, y) {
            self.grid[(y as usize, x as usize)] = cost;
        }
    }
}

impl Costmap for OccupancyGrid {
    fn size_x(&self) -> u32 {
        self.grid.ncols() as u32
    }

    fn size_y(&self) -> u32 {
        self.grid.nrows() as u32
    }

    fn cost(&self, x: u32, y: u32) -> u8 {
        if !self.in_bounds(x, y) {
            return UNKNOWN;
        }
        self.grid[(y as usize, x as usize)]
    }
}

impl Deref for OccupancyGrid {
    type Target = na::DMatrix<u8>;

    fn deref(&self) -> &Self::Target {
        &self.grid
    }
}
