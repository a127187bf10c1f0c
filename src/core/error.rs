//! Error types for the voxelization engine

use crate::engine::Phase;
use glam::{DVec3, IVec3};
use thiserror::Error;

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Coordinate ({}, {}, {}) lies outside the domain", .0.x, .0.y, .0.z)]
    OutOfDomainCoordinate(DVec3),

    #[error("Cell ({}, {}, {}) lies outside the grid", .0.x, .0.y, .0.z)]
    OutOfDomainCell(IVec3),

    #[error("`{operation}` is not allowed while the engine is {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: Phase,
    },

    #[error("Invalid material id {0}: expected 1..={max}", max = i16::MAX)]
    InvalidMaterial(i32),

    #[error("Label {0} is not present in the grid")]
    UnknownLabel(i16),

    #[error("Volume label space exhausted: more than {0} volumes")]
    LabelSpaceExhausted(usize),

    #[error("Buffer of {len} labels does not match shape {shape:?}")]
    BufferShape { len: usize, shape: [usize; 3] },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn phase(operation: &'static str, phase: Phase) -> Self {
        Self::InvalidPhase { operation, phase }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_error_message() {
        let err = Error::phase("push_triangle", Phase::Segmented);
        assert_eq!(
            err.to_string(),
            "`push_triangle` is not allowed while the engine is segmented"
        );
    }

    #[test]
    fn test_material_error_message() {
        let err = Error::InvalidMaterial(0);
        assert_eq!(err.to_string(), "Invalid material id 0: expected 1..=32767");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
