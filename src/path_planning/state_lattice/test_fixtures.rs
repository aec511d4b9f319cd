//! Primitive libraries shared by the state lattice unit tests

use std::f64::consts::FRAC_PI_2;
use std::io::Write;

use tempfile::NamedTempFile;

use crate::common::SearchConfig;

use super::motion_primitive::{LatticeFile, LatticeFileMetadata, PrimitiveRecord};

/// Straight primitive of `length` meters starting at `bin`
pub fn straight_record(id: u32, bin: u32, num_headings: u32, length: f64) -> PrimitiveRecord {
    let yaw = bin as f64 * 2.0 * std::f64::consts::PI / num_headings as f64;
    let (sin, cos) = yaw.sin_cos();
    PrimitiveRecord {
        trajectory_id: id,
        start_angle_index: bin,
        end_angle_index: bin,
        left_turn: false,
        trajectory_radius: 0.0,
        trajectory_length: length,
        arc_length: 0.0,
        straight_length: length,
        poses: vec![
            [0.5 * length * cos, 0.5 * length * sin, yaw],
            [length * cos, length * sin, yaw],
        ],
    }
}

/// Left quarter turn of radius 1 from heading bin 0, ending at (1, 1)
pub fn quarter_turn_record(id: u32, num_headings: u32) -> PrimitiveRecord {
    let mut poses: Vec<[f64; 3]> = (1..5)
        .map(|k| {
            let t = k as f64 * FRAC_PI_2 / 5.0;
            [t.sin(), 1.0 - t.cos(), t]
        })
        .collect();
    poses.push([1.0, 1.0, FRAC_PI_2]);

    PrimitiveRecord {
        trajectory_id: id,
        start_angle_index: 0,
        end_angle_index: (num_headings as f64 / 4.0).round() as u32 % num_headings,
        left_turn: true,
        trajectory_radius: 1.0,
        trajectory_length: 1.57,
        arc_length: 1.57,
        straight_length: 0.0,
        poses,
    }
}

/// Mirror image of `quarter_turn_record`, ending at (1, -1)
pub fn right_quarter_turn_record(id: u32, num_headings: u32) -> PrimitiveRecord {
    let mut record = quarter_turn_record(id, num_headings);
    for pose in record.poses.iter_mut() {
        pose[1] = -pose[1];
        pose[2] = -pose[2];
    }
    record.left_turn = false;
    record.end_angle_index = (num_headings - record.end_angle_index) % num_headings;
    record
}

/// One straight primitive of length 1 and one quarter turn, authored for
/// bin 0 only on a 1 m grid
pub fn scenario_library(num_headings: u32) -> LatticeFile {
    LatticeFile {
        version: Some(1.0),
        lattice_metadata: LatticeFileMetadata {
            motion_model: "ackermann".to_string(),
            turning_radius: 1.0,
            grid_resolution: 1.0,
            num_of_headings: num_headings,
            heading_angles: Vec::new(),
            number_of_trajectories: Some(2),
        },
        primitives: vec![
            straight_record(0, 0, num_headings, 1.0),
            quarter_turn_record(1, num_headings),
        ],
    }
}

pub fn write_library(library: &LatticeFile) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    serde_json::to_writer_pretty(&mut file, library).unwrap();
    file.flush().unwrap();
    file
}

pub fn write_raw(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn config_for(file: &NamedTempFile) -> SearchConfig {
    SearchConfig::with_lattice_filepath(file.path())
}
