//! State Lattice Expansion Example
//!
//! Writes a small primitive library, loads it into the motion table and
//! expands a start node on an occupancy grid with an obstacle ahead of it.
//! Run with `RUST_LOG=debug` to see the table loading messages.

use std::error::Error;
use std::f64::consts::FRAC_PI_2;
use std::io::Write;

use log::{error, info};

use lattice_planner::common::{Coordinates, OCCUPIED};
use lattice_planner::path_planning::state_lattice::{
    LatticeFile, LatticeFileMetadata, LatticeMotionTable, NodeGraph, PrimitiveRecord,
};
use lattice_planner::utils::{GridCollisionChecker, OccupancyGrid};
use lattice_planner::{LatticeResult, NodeResolver, SearchConfig};

const GRID_RESOLUTION: f64 = 0.5;
const NUM_HEADINGS: u32 = 16;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("State Lattice Expansion Example");
    println!("===============================\n");

    if let Err(e) = run() {
        error!("Expansion failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    serde_json::to_writer_pretty(&mut file, &library())?;
    file.flush()?;

    let metadata = LatticeMotionTable::get_lattice_metadata(file.path())?;
    info!(
        "Library header: {} headings, turning radius {:.2} cells, model {}",
        metadata.num_angle_bins, metadata.min_turning_radius, metadata.motion_model
    );

    // Test 1: forward only
    let config = SearchConfig::with_lattice_filepath(file.path());
    expand(&config, "Forward expansion")?;

    // Test 2: forward and reverse
    let config = SearchConfig {
        allow_reverse_expansion: true,
        ..config
    };
    expand(&config, "Forward and reverse expansion")?;

    println!("\nState Lattice expansion example finished!");
    Ok(())
}

fn expand(config: &SearchConfig, title: &str) -> LatticeResult<()> {
    println!("{}", title);
    println!("{}", "-".repeat(title.len()));

    let (size_x, size_y) = (40, 40);
    let table = LatticeMotionTable::from_config(size_x, config)?;

    let mut grid = OccupancyGrid::free(size_x, size_y);
    for y in 18..23 {
        grid.set_cost(22, y, OCCUPIED);
    }
    let checker = GridCollisionChecker::new(grid, 1.0);
    let mut graph = NodeGraph::for_table(&table, size_y)?;

    let start_pose = Coordinates::new(20.0, 20.0, 0.0);
    let start_index = table.index(20, 20, 0);
    let mut start = match graph.resolve(start_index) {
        Some(node) => *node,
        None => return Ok(()),
    };
    start.set_pose(start_pose);
    if !start.is_node_valid(false, &checker) {
        println!("Start pose is in collision");
        return Ok(());
    }

    println!(
        "Footprint radius {:.1} cells, obstacle heuristic weight {:.2}",
        checker.footprint_radius(),
        table.obstacle_heuristic_cost_weight()
    );

    let mut neighbors = Vec::new();
    start.get_neighbors(&table, &mut graph, &checker, false, &mut neighbors);
    println!(
        "{} of {} primitives are collision free",
        neighbors.len(),
        table.get_projections(&start).len()
    );

    for neighbor in &neighbors {
        let cost = start.get_traversal_cost(&table, neighbor);
        let direction = neighbor
            .motion_primitive()
            .and_then(|id| table.primitive(id))
            .map(|p| format!("{:?} {:?}", p.direction, p.curvature_class()))
            .unwrap_or_default();
        println!(
            "  ({:6.2}, {:6.2}) bin {:2}  {:<20} cost {:.3}",
            neighbor.pose.x, neighbor.pose.y, neighbor.pose.theta as u32, direction, cost
        );
    }
    println!();
    Ok(())
}

/// Straight, left and right primitives for heading bin 0, rotated into the
/// other bins when the table is loaded
fn library() -> LatticeFile {
    let straight = PrimitiveRecord {
        trajectory_id: 0,
        start_angle_index: 0,
        end_angle_index: 0,
        left_turn: false,
        trajectory_radius: 0.0,
        trajectory_length: 1.0,
        arc_length: 0.0,
        straight_length: 1.0,
        poses: (1..=4).map(|k| [k as f64 * 0.25, 0.0, 0.0]).collect(),
    };

    let radius = 2.0;
    let sweep = FRAC_PI_2 / 4.0;
    let turn = |id: u32, left: bool| {
        let side = if left { 1.0 } else { -1.0 };
        PrimitiveRecord {
            trajectory_id: id,
            start_angle_index: 0,
            end_angle_index: if left { 2 } else { NUM_HEADINGS - 2 },
            left_turn: left,
            trajectory_radius: radius,
            trajectory_length: radius * sweep,
            arc_length: radius * sweep,
            straight_length: 0.0,
            poses: (1..=4)
                .map(|k| {
                    let t = k as f64 * sweep / 4.0;
                    [radius * t.sin(), side * radius * (1.0 - t.cos()), side * t]
                })
                .collect(),
        }
    };

    LatticeFile {
        version: Some(1.0),
        lattice_metadata: LatticeFileMetadata {
            motion_model: "ackermann".to_string(),
            turning_radius: radius,
            grid_resolution: GRID_RESOLUTION,
            num_of_headings: NUM_HEADINGS,
            heading_angles: Vec::new(),
            number_of_trajectories: Some(3),
        },
        primitives: vec![straight, turn(1, true), turn(2, false)],
    }
}
