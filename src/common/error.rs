//! Error types for lattice_planner

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the lattice motion table and search nodes
#[derive(Error, Debug)]
pub enum LatticeError {
    /// Invalid search configuration or inconsistent primitive library
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Primitive library file missing or unreadable
    #[error("Failed to read primitive file {}: {source}", path.display())]
    PrimitiveFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Primitive library file is not a valid lattice document
    #[error("Malformed primitive file {}: {source}", path.display())]
    MalformedPrimitiveFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Coordinate triple outside the lattice
    #[error("Index error: ({x}, {y}, {angle}) is outside the lattice")]
    Index { x: u32, y: u32, angle: u32 },
}

impl LatticeError {
    /// True for every failure that must abort planning setup
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            LatticeError::Configuration(_)
                | LatticeError::PrimitiveFile { .. }
                | LatticeError::MalformedPrimitiveFile { .. }
        )
    }
}

/// Result type alias for lattice operations
pub type LatticeResult<T> = Result<T, LatticeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LatticeError::Configuration("no primitives for heading bin 3".to_string());
        assert_eq!(
            format!("{}", err),
            "Configuration error: no primitives for heading bin 3"
        );
    }

    #[test]
    fn test_file_errors_are_configuration_errors() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = LatticeError::PrimitiveFile {
            path: PathBuf::from("missing.json"),
            source: io_err,
        };
        assert!(err.is_configuration_error());
        assert!(format!("{}", err).contains("missing.json"));
    }

    #[test]
    fn test_index_error_is_not_configuration_error() {
        let err = LatticeError::Index { x: 10, y: 0, angle: 0 };
        assert!(!err.is_configuration_error());
    }
}
