//! Common types used throughout lattice_planner

use nalgebra::Vector2;

/// Free space in a costmap
pub const FREE_SPACE: u8 = 0;
/// Highest cost that is still traversable
pub const MAX_NON_OBSTACLE: u8 = 252;
/// Inside the robot's inscribed radius of a lethal obstacle
pub const INSCRIBED: u8 = 253;
/// Lethal obstacle
pub const OCCUPIED: u8 = 254;
/// No information about the cell
pub const UNKNOWN: u8 = 255;

/// Continuous lattice pose in grid cells.
///
/// `theta` is expressed in heading bins, not radians: a pose with
/// `theta == 2.0` on an 8-bin lattice faces 90 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Coordinates {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Grid cell containing this pose, `None` when left of or below the origin
    pub fn cell(&self) -> Option<(u32, u32)> {
        if !(self.x >= 0.0 && self.y >= 0.0) {
            return None;
        }
        Some((self.x.floor() as u32, self.y.floor() as u32))
    }

    /// Heading bin of this pose, wrapped into `[0, num_angle_bins)`
    pub fn heading_bin(&self, num_angle_bins: u32) -> u32 {
        let n = num_angle_bins as f64;
        (self.theta.round().rem_euclid(n) as u32) % num_angle_bins.max(1)
    }
}

/// Sine and cosine of one heading bin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrigValue {
    pub sin: f64,
    pub cos: f64,
}

impl TrigValue {
    pub fn from_angle(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self { sin, cos }
    }

    /// Rotate a planar offset by this bin's angle
    pub fn rotate(&self, v: Vector2<f64>) -> Vector2<f64> {
        Vector2::new(
            self.cos * v.x - self.sin * v.y,
            self.sin * v.x + self.cos * v.y,
        )
    }
}

/// Header information of a primitive library
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeMetadata {
    /// Number of heading bins the library was generated for
    pub num_angle_bins: u32,
    /// Minimum turning radius in grid cells
    pub min_turning_radius: f64,
    /// Meters per grid cell the library was generated for
    pub grid_resolution: f64,
    pub motion_model: String,
}

/// Footprint occupancy reported by a collision checker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    Free,
    Occupied,
    Unknown,
}

/// Result of checking the robot footprint at one pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootprintCheck {
    pub occupancy: Occupancy,
    /// Costmap cost at the pose, in `[0, 255]`
    pub cost: f64,
}

impl FootprintCheck {
    pub fn free(cost: f64) -> Self {
        Self { occupancy: Occupancy::Free, cost }
    }

    pub fn occupied() -> Self {
        Self { occupancy: Occupancy::Occupied, cost: OCCUPIED as f64 }
    }

    pub fn unknown() -> Self {
        Self { occupancy: Occupancy::Unknown, cost: UNKNOWN as f64 }
    }
}
