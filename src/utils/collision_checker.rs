// Disc-footprint collision checker over a costmap
// Based on the robot-radius obstacle test of the grid planners

use crate::common::{
    CollisionChecker, Coordinates, Costmap, FootprintCheck, Occupancy, INSCRIBED, UNKNOWN,
};

pub struct GridCollisionChecker<C: Costmap> {
    costmap: C,
    /// Footprint radius in cells, 0 checks only the cell under the pose
    footprint_radius: f64,
    footprint_cells: Vec<(i64, i64)>,
}

impl<C: Costmap> GridCollisionChecker<C> {
    pub fn new(costmap: C, footprint_radius: f64) -> Self {
        let footprint_radius = footprint_radius.max(0.0);
        let r = footprint_radius.ceil() as i64;

        let mut footprint_cells = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                let d = ((dx * dx + dy * dy) as f64).sqrt();
                if d <= footprint_radius {
                    footprint_cells.push((dx, dy));
                }
            }
        }

        Self {
            costmap,
            footprint_radius,
            footprint_cells,
        }
    }

    /// Checker for a robot that occupies a single cell
    pub fn point(costmap: C) -> Self {
        Self::new(costmap, 0.0)
    }

    pub fn footprint_radius(&self) -> f64 {
        self.footprint_radius
    }

    pub fn costmap(&self) -> &C {
        &self.costmap
    }

    pub fn costmap_mut(&mut self) -> &mut C {
        &mut self.costmap
    }
}

impl<C: Costmap> CollisionChecker for GridCollisionChecker<C> {
    fn grid_size(&self) -> (u32, u32) {
        (self.costmap.size_x(), self.costmap.size_y())
    }

    fn check(&self, pose: &Coordinates) -> FootprintCheck {
        let (cx, cy) = match pose.cell() {
            Some(cell) => cell,
            None => return FootprintCheck::occupied(),
        };
        let (size_x, size_y) = self.grid_size();
        if cx >= size_x || cy >= size_y {
            return FootprintCheck::occupied();
        }

        let mut saw_unknown = false;
        for &(dx, dy) in &self.footprint_cells {
            let x = cx as i64 + dx;
            let y = cy as i64 + dy;

            // Footprint cells hanging off the map are treated as obstacles
            if x < 0 || y < 0 || x >= size_x as i64 || y >= size_y as i64 {
                return FootprintCheck::occupied();
            }

            let cost = self.costmap.cost(x as u32, y as u32);
            if cost == UNKNOWN {
                saw_unknown = true;
            } else if cost >= INSCRIBED {
                return FootprintCheck::occupied();
            }
        }

        let center_cost = self.costmap.cost(cx, cy) as f64;
        if saw_unknown {
            FootprintCheck {
                occupancy: Occupancy::Unknown,
                cost: center_cost,
            }
        } else {
            FootprintCheck::free(center_cost)
        }
    }
}
