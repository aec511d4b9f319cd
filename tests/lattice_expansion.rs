//! End-to-end checks of the lattice search core: a primitive library on
//! disk, an occupancy grid, and a small A* driver committing neighbors into
//! the node arena.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::f64::consts::{FRAC_PI_2, PI};
use std::io::Write;

use approx::assert_relative_eq;
use ordered_float::OrderedFloat;
use tempfile::NamedTempFile;

use lattice_planner::common::{Coordinates, OCCUPIED};
use lattice_planner::path_planning::state_lattice::{
    LatticeFile, LatticeFileMetadata, LatticeMotionTable, NodeGraph, NodeLattice, PrimitiveRecord,
};
use lattice_planner::utils::{GridCollisionChecker, OccupancyGrid};
use lattice_planner::{Costmap, HeuristicEngine, LatticeError, NodeResolver, SearchConfig};

const NUM_HEADINGS: u32 = 8;

fn straight(id: u32, length: f64) -> PrimitiveRecord {
    PrimitiveRecord {
        trajectory_id: id,
        start_angle_index: 0,
        end_angle_index: 0,
        left_turn: false,
        trajectory_radius: 0.0,
        trajectory_length: length,
        arc_length: 0.0,
        straight_length: length,
        poses: vec![[0.5 * length, 0.0, 0.0], [length, 0.0, 0.0]],
    }
}

fn quarter_turn(id: u32, left: bool) -> PrimitiveRecord {
    let side = if left { 1.0 } else { -1.0 };
    let mut poses: Vec<[f64; 3]> = (1..5)
        .map(|k| {
            let t = k as f64 * FRAC_PI_2 / 5.0;
            [t.sin(), side * (1.0 - t.cos()), side * t]
        })
        .collect();
    poses.push([1.0, side, side * FRAC_PI_2]);

    PrimitiveRecord {
        trajectory_id: id,
        start_angle_index: 0,
        end_angle_index: if left { 2 } else { 6 },
        left_turn: left,
        trajectory_radius: 1.0,
        trajectory_length: 1.57,
        arc_length: 1.57,
        straight_length: 0.0,
        poses,
    }
}

fn library() -> LatticeFile {
    LatticeFile {
        version: Some(1.0),
        lattice_metadata: LatticeFileMetadata {
            motion_model: "ackermann".to_string(),
            turning_radius: 1.0,
            grid_resolution: 1.0,
            num_of_headings: NUM_HEADINGS,
            heading_angles: Vec::new(),
            number_of_trajectories: Some(3),
        },
        primitives: vec![straight(0, 1.0), quarter_turn(1, true), quarter_turn(2, false)],
    }
}

fn write_library(library: &LatticeFile) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    serde_json::to_writer(&mut file, library).unwrap();
    file.flush().unwrap();
    file
}

/// Straight-line distance to the goal, ignoring obstacles and heading
struct EuclideanHeuristic;

impl HeuristicEngine for EuclideanHeuristic {
    fn precompute_distance_heuristic(&mut self, _: f64, _: u32, _: &SearchConfig, _: f64) {}

    fn reset_obstacle_heuristic(&mut self, _: &dyn Costmap, _: u32, _: u32) {}

    fn obstacle_heuristic(
        &mut self,
        _: &dyn Costmap,
        node: &Coordinates,
        goal: &Coordinates,
        _: f64,
    ) -> f64 {
        (node.position() - goal.position()).norm()
    }

    fn distance_heuristic(&self, _: &Coordinates, _: &Coordinates, _: f64) -> f64 {
        0.0
    }
}

struct Plan {
    path: Vec<Coordinates>,
    cost: f64,
}

/// A* over the lattice until any heading at `goal_cell` is reached
fn search(
    table: &LatticeMotionTable,
    checker: &GridCollisionChecker<OccupancyGrid>,
    start: Coordinates,
    goal_cell: (u32, u32),
) -> Option<Plan> {
    let (size_x, size_y) = (checker.costmap().size_x(), checker.costmap().size_y());
    let mut graph = NodeGraph::for_table(table, size_y).ok()?;
    let mut heuristic = EuclideanHeuristic;
    let goal = Coordinates::new(goal_cell.0 as f64, goal_cell.1 as f64, 0.0);
    assert_eq!(table.size_x(), size_x);

    let (sx, sy) = start.cell()?;
    let start_index = table.index(sx, sy, start.heading_bin(table.num_angle_bins()));
    let mut start_node = *graph.resolve(start_index)?;
    start_node.set_pose(start);
    if !start_node.is_node_valid(false, checker) {
        return None;
    }
    start_node.set_accumulated_cost(0.0);
    start_node.queued();
    *graph.node_mut(start_index)? = start_node;

    let mut open = BinaryHeap::new();
    open.push(Reverse((OrderedFloat(0.0), start_index)));
    let mut neighbors = Vec::new();

    while let Some(Reverse((_, index))) = open.pop() {
        let node = *graph.node(index)?;
        if node.was_visited() {
            continue;
        }
        graph.node_mut(index)?.visited();

        if node.pose.cell() == Some(goal_cell) {
            return Some(Plan {
                path: graph.backtrace(index),
                cost: node.accumulated_cost(),
            });
        }

        neighbors.clear();
        node.get_neighbors(table, &mut graph, checker, false, &mut neighbors);
        for neighbor in &neighbors {
            let cost = node.accumulated_cost() + node.get_traversal_cost(table, neighbor);
            if graph.relax(neighbor, index, cost) {
                let h = NodeLattice::get_heuristic_cost(
                    &mut heuristic,
                    &neighbor.pose,
                    &goal,
                    checker.costmap(),
                    table,
                );
                open.push(Reverse((OrderedFloat(cost + h), neighbor.index())));
            }
        }
    }
    None
}

#[test]
fn test_expansion_on_open_grid() {
    let file = write_library(&library());
    let config = SearchConfig::with_lattice_filepath(file.path());
    let table = LatticeMotionTable::from_config(10, &config).unwrap();
    let checker = GridCollisionChecker::point(OccupancyGrid::free(10, 10));
    let mut graph = NodeGraph::for_table(&table, 10).unwrap();

    let mut start = *graph.resolve(table.index(5, 5, 0)).unwrap();
    start.set_pose(Coordinates::new(5.0, 5.0, 0.0));
    let mut neighbors = Vec::new();
    start.get_neighbors(&table, &mut graph, &checker, false, &mut neighbors);

    let cells: Vec<_> = neighbors.iter().filter_map(|n| n.pose.cell()).collect();
    assert_eq!(cells, vec![(6, 5), (6, 6), (6, 4)]);
    assert_relative_eq!(start.get_traversal_cost(&table, &neighbors[0]), 1.0);
    for turn in &neighbors[1..] {
        assert_relative_eq!(
            start.get_traversal_cost(&table, turn),
            1.57 + config.non_straight_penalty
        );
    }
}

#[test]
fn test_search_routes_around_wall() {
    let file = write_library(&library());
    let config = SearchConfig::with_lattice_filepath(file.path());
    let table = LatticeMotionTable::from_config(10, &config).unwrap();

    let mut grid = OccupancyGrid::free(10, 10);
    for y in 0..5 {
        grid.set_cost(4, y, OCCUPIED);
    }
    let checker = GridCollisionChecker::point(grid);

    let plan = search(&table, &checker, Coordinates::new(1.0, 1.0, 0.0), (8, 1))
        .expect("a path around the wall exists");

    assert_eq!(plan.path.first().and_then(|p| p.cell()), Some((1, 1)));
    assert_eq!(plan.path.last().and_then(|p| p.cell()), Some((8, 1)));
    for pose in &plan.path {
        let (x, y) = pose.cell().unwrap();
        assert!(!(x == 4 && y < 5), "path enters the wall at {:?}", pose);
    }
    // Longer than the straight line through the wall
    assert!(plan.cost > 7.0);
}

#[test]
fn test_search_fails_when_goal_is_enclosed() {
    let file = write_library(&library());
    let config = SearchConfig::with_lattice_filepath(file.path());
    let table = LatticeMotionTable::from_config(10, &config).unwrap();

    let mut grid = OccupancyGrid::free(10, 10);
    for y in 0..10 {
        grid.set_cost(4, y, OCCUPIED);
    }
    let checker = GridCollisionChecker::point(grid);

    assert!(search(&table, &checker, Coordinates::new(1.0, 1.0, 0.0), (8, 1)).is_none());
}

#[test]
fn test_search_backs_up_with_reverse_expansion() {
    let file = write_library(&library());
    let config = SearchConfig {
        allow_reverse_expansion: true,
        ..SearchConfig::with_lattice_filepath(file.path())
    };
    let table = LatticeMotionTable::from_config(10, &config).unwrap();
    let checker = GridCollisionChecker::point(OccupancyGrid::free(10, 10));

    let plan = search(&table, &checker, Coordinates::new(5.0, 5.0, 0.0), (3, 5)).unwrap();

    let cells: Vec<_> = plan.path.iter().filter_map(|p| p.cell()).collect();
    assert_eq!(cells, vec![(5, 5), (4, 5), (3, 5)]);
    assert!(plan.path.iter().all(|p| p.heading_bin(NUM_HEADINGS) == 0));
    // Two unit reverse edges, the switch into reverse charged once
    assert_relative_eq!(plan.cost, 2.0 + config.reverse_penalty);
}

#[test]
fn test_reload_keeps_table_and_refreshes_penalties() {
    let file = write_library(&library());
    let mut config = SearchConfig::with_lattice_filepath(file.path());
    let mut table = LatticeMotionTable::from_config(10, &config).unwrap();
    let primitives = table.len();

    config.non_straight_penalty = 1.3;
    table.init_motion_model(10, &config).unwrap();
    assert_eq!(table.len(), primitives);
    assert_relative_eq!(table.non_straight_penalty(), 1.3);

    let metadata = LatticeMotionTable::get_lattice_metadata(file.path()).unwrap();
    assert_eq!(metadata.num_angle_bins, NUM_HEADINGS);
    assert_relative_eq!(table.bin_to_angle(2.0), PI / 2.0);
}

#[test]
fn test_library_errors() {
    let missing = SearchConfig::with_lattice_filepath("/nonexistent/lattice.json");
    assert!(matches!(
        LatticeMotionTable::from_config(10, &missing),
        Err(LatticeError::PrimitiveFile { .. })
    ));

    let mut partial = library();
    partial.primitives[2].start_angle_index = 3;
    partial.primitives[2].end_angle_index = 3;
    let file = write_library(&partial);
    let err = LatticeMotionTable::from_config(10, &SearchConfig::with_lattice_filepath(file.path()))
        .unwrap_err();
    assert!(err.is_configuration_error());
}
