//! Common types, traits, configuration, and error definitions for lattice_planner
//!
//! This module provides the foundational building blocks shared by the
//! motion table, the search nodes, and their collaborators.

pub mod types;
pub mod traits;
pub mod config;
pub mod error;

pub use types::*;
pub use traits::*;
pub use config::*;
pub use error::*;
