//! Motion primitives for the State Lattice search
//!
//! A primitive is a short, curvature-continuous path authored for one
//! starting heading bin. Poses are offsets from the primitive's start,
//! positions in grid cells and headings in bins.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::common::config::ChangePenaltyPolicy;
use crate::common::error::{LatticeError, LatticeResult};
use crate::common::types::{Coordinates, TrigValue};

/// Below this curved length (cells) a primitive counts as straight
pub const STRAIGHT_ARC_LENGTH: f64 = 1e-3;

/// Driving direction along a primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Coarse curvature class of a primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurvatureClass {
    Straight,
    Left,
    Right,
}

/// Whether moving from `previous` to `next` pays the change penalty
pub fn change_penalty_applies(
    policy: ChangePenaltyPolicy,
    previous: CurvatureClass,
    next: CurvatureClass,
) -> bool {
    match policy {
        ChangePenaltyPolicy::AnyClassChange => previous != next,
        ChangePenaltyPolicy::OppositeTurn => matches!(
            (previous, next),
            (CurvatureClass::Left, CurvatureClass::Right) | (CurvatureClass::Right, CurvatureClass::Left)
        ),
    }
}

/// One pose along a primitive, relative to the primitive's start position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionPose {
    pub x: f64,
    pub y: f64,
    /// Absolute heading in bins
    pub theta: f64,
}

impl MotionPose {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    /// Place this offset at `origin`
    pub fn apply_to(&self, origin: &Coordinates) -> Coordinates {
        Coordinates::new(origin.x + self.x, origin.y + self.y, self.theta)
    }
}

/// A motion primitive expressed in the absolute frame of its start bin
#[derive(Debug, Clone, PartialEq)]
pub struct MotionPrimitive {
    /// Position in the motion table's primitive store
    pub id: u32,
    /// Identifier as authored in the primitive file
    pub trajectory_id: u32,
    pub start_angle: u32,
    pub end_angle: u32,
    pub left_turn: bool,
    /// Turning radius of the curved portion in cells, 0 for straight lines
    pub turning_radius: f64,
    /// Length of the curved portion in cells
    pub arc_length: f64,
    /// Total length in cells
    pub trajectory_length: f64,
    pub direction: Direction,
    pub poses: Vec<MotionPose>,
}

impl MotionPrimitive {
    /// Final offset reached by this primitive
    pub fn end_pose(&self) -> MotionPose {
        self.poses
            .last()
            .copied()
            .unwrap_or_else(|| MotionPose::new(0.0, 0.0, self.start_angle as f64))
    }

    /// Poses strictly before the end pose
    pub fn intermediate_poses(&self) -> &[MotionPose] {
        match self.poses.len() {
            0 => &[],
            n => &self.poses[..n - 1],
        }
    }

    pub fn curvature_class(&self) -> CurvatureClass {
        if self.arc_length < STRAIGHT_ARC_LENGTH && self.start_angle == self.end_angle {
            CurvatureClass::Straight
        } else if self.left_turn {
            CurvatureClass::Left
        } else {
            CurvatureClass::Right
        }
    }

    pub fn is_reverse(&self) -> bool {
        self.direction == Direction::Reverse
    }

    /// Copy of this primitive rotated counter-clockwise by `bins` heading bins
    pub fn rotated(&self, bins: u32, trig: &TrigValue, num_angle_bins: u32) -> Self {
        let n = num_angle_bins as f64;
        let poses = self
            .poses
            .iter()
            .map(|pose| {
                let p = trig.rotate(nalgebra::Vector2::new(pose.x, pose.y));
                MotionPose::new(snap(p.x), snap(p.y), (pose.theta + bins as f64).rem_euclid(n))
            })
            .collect();

        Self {
            start_angle: (self.start_angle + bins) % num_angle_bins,
            end_angle: (self.end_angle + bins) % num_angle_bins,
            poses,
            ..self.clone()
        }
    }

    /// The same path driven backwards by a robot facing the opposite way.
    ///
    /// Positions are unchanged; every heading flips by half a turn.
    pub fn reversed(&self, num_angle_bins: u32) -> Self {
        let half = num_angle_bins / 2;
        let n = num_angle_bins as f64;
        let poses = self
            .poses
            .iter()
            .map(|pose| MotionPose::new(pose.x, pose.y, (pose.theta + half as f64).rem_euclid(n)))
            .collect();

        Self {
            start_angle: (self.start_angle + half) % num_angle_bins,
            end_angle: (self.end_angle + half) % num_angle_bins,
            direction: Direction::Reverse,
            poses,
            ..self.clone()
        }
    }
}

/// Drop floating point noise left by rotations so exact offsets stay exact
fn snap(value: f64) -> f64 {
    let snapped = (value * 1e9).round() / 1e9;
    if snapped == 0.0 {
        0.0
    } else {
        snapped
    }
}

/// Normalize angle to [0, 2*PI)
pub fn normalize_angle(angle: f64) -> f64 {
    angle.rem_euclid(2.0 * PI)
}

// ============================================================================
// Primitive library file
// ============================================================================

/// Whole primitive library document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatticeFile {
    #[serde(default)]
    pub version: Option<f64>,
    pub lattice_metadata: LatticeFileMetadata,
    pub primitives: Vec<PrimitiveRecord>,
}

/// Header only; the primitive array is skipped while parsing
#[derive(Debug, Clone, Deserialize)]
pub struct LatticeHeader {
    pub lattice_metadata: LatticeFileMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatticeFileMetadata {
    #[serde(default = "default_motion_model")]
    pub motion_model: String,
    /// Minimum turning radius [m]
    pub turning_radius: f64,
    /// Grid resolution the library was generated for [m/cell]
    pub grid_resolution: f64,
    pub num_of_headings: u32,
    #[serde(default)]
    pub heading_angles: Vec<f64>,
    #[serde(default)]
    pub number_of_trajectories: Option<usize>,
}

fn default_motion_model() -> String {
    "ackermann".to_string()
}

/// One primitive as stored in the file, lengths in meters, yaw in radians
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimitiveRecord {
    pub trajectory_id: u32,
    pub start_angle_index: u32,
    pub end_angle_index: u32,
    #[serde(default)]
    pub left_turn: bool,
    #[serde(default)]
    pub trajectory_radius: f64,
    pub trajectory_length: f64,
    #[serde(default)]
    pub arc_length: f64,
    #[serde(default)]
    pub straight_length: f64,
    pub poses: Vec<[f64; 3]>,
}

impl PrimitiveRecord {
    /// Convert to grid units, rejecting records inconsistent with the header
    pub fn to_primitive(&self, grid_resolution: f64, num_angle_bins: u32) -> LatticeResult<MotionPrimitive> {
        let id = self.trajectory_id;
        if self.start_angle_index >= num_angle_bins || self.end_angle_index >= num_angle_bins {
            return Err(LatticeError::Configuration(format!(
                "primitive {} uses heading bins ({}, {}) but the library declares {} headings",
                id, self.start_angle_index, self.end_angle_index, num_angle_bins
            )));
        }
        if self.poses.is_empty() {
            return Err(LatticeError::Configuration(format!("primitive {} has no poses", id)));
        }
        let lengths = [self.trajectory_length, self.arc_length, self.trajectory_radius];
        if lengths.iter().any(|l| !l.is_finite() || *l < 0.0) {
            return Err(LatticeError::Configuration(format!(
                "primitive {} has a negative or non-finite length",
                id
            )));
        }

        let bin_size = 2.0 * PI / num_angle_bins as f64;
        let poses = self
            .poses
            .iter()
            .map(|&[x, y, yaw]| {
                MotionPose::new(
                    x / grid_resolution,
                    y / grid_resolution,
                    normalize_angle(yaw) / bin_size,
                )
            })
            .collect();

        Ok(MotionPrimitive {
            id: 0,
            trajectory_id: id,
            start_angle: self.start_angle_index,
            end_angle: self.end_angle_index,
            left_turn: self.left_turn,
            turning_radius: self.trajectory_radius / grid_resolution,
            arc_length: self.arc_length / grid_resolution,
            trajectory_length: self.trajectory_length / grid_resolution,
            direction: Direction::Forward,
            poses,
        })
    }
}
