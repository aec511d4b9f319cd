//! Lattice motion table
//!
//! Loads a primitive library once, caches the primitive set of every
//! heading bin in the absolute frame of that bin, and carries the
//! planner-wide traversal penalties.

use std::f64::consts::PI;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{debug, info, warn};

use crate::common::config::{ChangePenaltyPolicy, SearchConfig};
use crate::common::error::{LatticeError, LatticeResult};
use crate::common::types::{LatticeMetadata, TrigValue};

use super::motion_primitive::{
    normalize_angle, LatticeFile, LatticeFileMetadata, LatticeHeader, MotionPrimitive,
};
use super::node_lattice::NodeLattice;

/// Table of motion primitives and traversal penalties shared by all nodes
#[derive(Debug, Clone, Default)]
pub struct LatticeMotionTable {
    primitives: Vec<MotionPrimitive>,
    projections: Vec<Range<usize>>,
    size_x: u32,
    num_angle_bins: u32,
    min_turning_radius: f64,
    bin_size: f64,
    change_penalty: f64,
    non_straight_penalty: f64,
    reverse_penalty: f64,
    cost_penalty: f64,
    obstacle_heuristic_cost_weight: f64,
    change_penalty_policy: ChangePenaltyPolicy,
    allow_reverse_expansion: bool,
    trig_values: Vec<TrigValue>,
    metadata: Option<LatticeMetadata>,
    current_lattice_filepath: Option<PathBuf>,
}

impl LatticeMotionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table in one step
    pub fn from_config(size_x: u32, config: &SearchConfig) -> LatticeResult<Self> {
        let mut table = Self::new();
        table.init_motion_model(size_x, config)?;
        Ok(table)
    }

    /// Initialize the motion model for a grid `size_x` cells wide.
    ///
    /// The primitive file is only read when the file path, grid width or
    /// reverse expansion setting differ from the cached ones; penalties are
    /// refreshed on every call. On error the table is left untouched.
    pub fn init_motion_model(&mut self, size_x: u32, config: &SearchConfig) -> LatticeResult<()> {
        config.validate()?;

        let cached = self.current_lattice_filepath.as_deref() == Some(config.lattice_filepath.as_path())
            && self.size_x == size_x
            && self.allow_reverse_expansion == config.allow_reverse_expansion
            && !self.projections.is_empty();
        if cached {
            debug!(
                "Primitive library {} already loaded, refreshing penalties only",
                config.lattice_filepath.display()
            );
            self.apply_penalties(config);
            return Ok(());
        }

        let path = config.lattice_filepath.as_path();
        let file: LatticeFile = read_document(path)?;
        let metadata = parse_metadata(&file.lattice_metadata, path)?;
        let trig_values = build_trig_values(metadata.num_angle_bins);
        let (primitives, projections) =
            build_projections(&file, &metadata, &trig_values, config.allow_reverse_expansion)?;

        info!(
            "Loaded primitive library {}: {} headings, {} primitives, min turning radius {:.3} cells",
            path.display(),
            metadata.num_angle_bins,
            file.primitives.len(),
            metadata.min_turning_radius
        );

        self.size_x = size_x;
        self.num_angle_bins = metadata.num_angle_bins;
        self.min_turning_radius = metadata.min_turning_radius;
        self.bin_size = 2.0 * PI / metadata.num_angle_bins as f64;
        self.allow_reverse_expansion = config.allow_reverse_expansion;
        self.primitives = primitives;
        self.projections = projections;
        self.trig_values = trig_values;
        self.metadata = Some(metadata);
        self.current_lattice_filepath = Some(config.lattice_filepath.clone());
        self.apply_penalties(config);

        Ok(())
    }

    /// Read the header of a primitive library without its primitives
    pub fn get_lattice_metadata<P: AsRef<Path>>(lattice_filepath: P) -> LatticeResult<LatticeMetadata> {
        let path = lattice_filepath.as_ref();
        let header: LatticeHeader = read_document(path)?;
        parse_metadata(&header.lattice_metadata, path)
    }

    /// Primitives applicable from the heading bin of `node`
    pub fn get_projections(&self, node: &NodeLattice) -> &[MotionPrimitive] {
        self.projections_for_bin(node.pose.heading_bin(self.num_angle_bins))
    }

    pub fn projections_for_bin(&self, bin: u32) -> &[MotionPrimitive] {
        match self.projections.get(bin as usize) {
            Some(range) => &self.primitives[range.clone()],
            None => &[],
        }
    }

    /// Primitive by its table id
    pub fn primitive(&self, id: u32) -> Option<&MotionPrimitive> {
        self.primitives.get(id as usize)
    }

    fn apply_penalties(&mut self, config: &SearchConfig) {
        self.change_penalty = config.change_penalty;
        self.non_straight_penalty = config.non_straight_penalty;
        self.reverse_penalty = config.reverse_penalty;
        self.cost_penalty = config.cost_penalty;
        self.obstacle_heuristic_cost_weight = config.obstacle_heuristic_cost_weight;
        self.change_penalty_policy = config.change_penalty_policy;
    }

    // ========================================================================
    // Coordinate helpers
    // ========================================================================

    /// Lattice index of an in-range cell and heading bin
    pub fn index(&self, x: u32, y: u32, angle: u32) -> u32 {
        NodeLattice::get_index(x, y, angle, self.size_x, self.num_angle_bins)
    }

    /// Continuous heading in bins for an angle in radians
    pub fn angle_to_bin(&self, angle: f64) -> f64 {
        if self.bin_size <= 0.0 {
            return 0.0;
        }
        normalize_angle(angle) / self.bin_size
    }

    pub fn bin_to_angle(&self, bin: f64) -> f64 {
        bin * self.bin_size
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn is_initialized(&self) -> bool {
        !self.projections.is_empty()
    }

    pub fn size_x(&self) -> u32 {
        self.size_x
    }

    pub fn num_angle_bins(&self) -> u32 {
        self.num_angle_bins
    }

    pub fn min_turning_radius(&self) -> f64 {
        self.min_turning_radius
    }

    pub fn bin_size(&self) -> f64 {
        self.bin_size
    }

    pub fn change_penalty(&self) -> f64 {
        self.change_penalty
    }

    pub fn non_straight_penalty(&self) -> f64 {
        self.non_straight_penalty
    }

    pub fn reverse_penalty(&self) -> f64 {
        self.reverse_penalty
    }

    pub fn cost_penalty(&self) -> f64 {
        self.cost_penalty
    }

    pub fn obstacle_heuristic_cost_weight(&self) -> f64 {
        self.obstacle_heuristic_cost_weight
    }

    pub fn change_penalty_policy(&self) -> ChangePenaltyPolicy {
        self.change_penalty_policy
    }

    pub fn allow_reverse_expansion(&self) -> bool {
        self.allow_reverse_expansion
    }

    pub fn trig_values(&self) -> &[TrigValue] {
        &self.trig_values
    }

    pub fn metadata(&self) -> Option<&LatticeMetadata> {
        self.metadata.as_ref()
    }

    pub fn lattice_filepath(&self) -> Option<&Path> {
        self.current_lattice_filepath.as_deref()
    }

    /// Total number of primitives across all bins, reverse copies included
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

fn read_document<T: serde::de::DeserializeOwned>(path: &Path) -> LatticeResult<T> {
    let contents = fs::read_to_string(path).map_err(|source| LatticeError::PrimitiveFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| LatticeError::MalformedPrimitiveFile {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_metadata(header: &LatticeFileMetadata, path: &Path) -> LatticeResult<LatticeMetadata> {
    let n = header.num_of_headings;
    if n == 0 {
        return Err(LatticeError::Configuration(format!(
            "{} declares zero headings",
            path.display()
        )));
    }
    if !(header.grid_resolution.is_finite() && header.grid_resolution > 0.0) {
        return Err(LatticeError::Configuration(format!(
            "{} declares invalid grid resolution {}",
            path.display(),
            header.grid_resolution
        )));
    }
    if !(header.turning_radius.is_finite() && header.turning_radius >= 0.0) {
        return Err(LatticeError::Configuration(format!(
            "{} declares invalid turning radius {}",
            path.display(),
            header.turning_radius
        )));
    }

    if !header.heading_angles.is_empty() {
        if header.heading_angles.len() != n as usize {
            return Err(LatticeError::Configuration(format!(
                "{} declares {} headings but lists {} heading angles",
                path.display(),
                n,
                header.heading_angles.len()
            )));
        }
        let bin_size = 2.0 * PI / n as f64;
        let non_uniform = header
            .heading_angles
            .iter()
            .enumerate()
            .any(|(i, &angle)| {
                let delta = normalize_angle(angle - i as f64 * bin_size);
                delta.min(2.0 * PI - delta) > 1e-3
            });
        if non_uniform {
            warn!(
                "{} lists non-uniform heading angles, treating bins as uniform",
                path.display()
            );
        }
    }

    Ok(LatticeMetadata {
        num_angle_bins: n,
        min_turning_radius: header.turning_radius / header.grid_resolution,
        grid_resolution: header.grid_resolution,
        motion_model: header.motion_model.clone(),
    })
}

fn build_trig_values(num_angle_bins: u32) -> Vec<TrigValue> {
    let bin_size = 2.0 * PI / num_angle_bins as f64;
    (0..num_angle_bins)
        .map(|i| TrigValue::from_angle(i as f64 * bin_size))
        .collect()
}

/// Group primitives per start bin, filling bins from bin 0 by rotation when
/// only bin 0 is authored, then lay them out contiguously per bin.
fn build_projections(
    file: &LatticeFile,
    metadata: &LatticeMetadata,
    trig_values: &[TrigValue],
    allow_reverse_expansion: bool,
) -> LatticeResult<(Vec<MotionPrimitive>, Vec<Range<usize>>)> {
    let n = metadata.num_angle_bins;

    if let Some(expected) = file.lattice_metadata.number_of_trajectories {
        if expected != file.primitives.len() {
            return Err(LatticeError::Configuration(format!(
                "library declares {} trajectories but contains {}",
                expected,
                file.primitives.len()
            )));
        }
    }
    if allow_reverse_expansion && n % 2 != 0 {
        return Err(LatticeError::Configuration(format!(
            "reverse expansion needs an even number of headings, library has {}",
            n
        )));
    }

    let authored = file
        .primitives
        .iter()
        .map(|record| record.to_primitive(metadata.grid_resolution, n))
        .collect::<LatticeResult<Vec<_>>>()?;
    let mut by_bin = authored.into_iter().into_group_map_by(|p| p.start_angle);

    let per_bin: Vec<Vec<MotionPrimitive>> = if by_bin.len() == n as usize {
        (0..n).map(|bin| by_bin.remove(&bin).unwrap_or_default()).collect()
    } else if by_bin.len() == 1 && by_bin.contains_key(&0) {
        let base = by_bin.remove(&0).unwrap_or_default();
        (0..n)
            .map(|bin| {
                base.iter()
                    .map(|p| p.rotated(bin, &trig_values[bin as usize], n))
                    .collect()
            })
            .collect()
    } else {
        let missing = (0..n).find(|bin| !by_bin.contains_key(bin)).unwrap_or(0);
        return Err(LatticeError::Configuration(format!(
            "no motion primitives for heading bin {}",
            missing
        )));
    };

    let mut primitives = Vec::new();
    let mut projections = Vec::with_capacity(n as usize);
    for bin in 0..n {
        let start = primitives.len();
        primitives.extend(per_bin[bin as usize].iter().cloned());
        if allow_reverse_expansion {
            let opposite = ((bin + n / 2) % n) as usize;
            primitives.extend(per_bin[opposite].iter().map(|p| p.reversed(n)));
        }
        projections.push(start..primitives.len());
    }
    for (id, primitive) in primitives.iter_mut().enumerate() {
        primitive.id = id as u32;
    }

    Ok((primitives, projections))
}
