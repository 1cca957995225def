//! Graph-specific error types.

use ft_core::{FtError, StreamId, UnitId};

/// Flowsheet construction and lookup errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A stream refers to a unit that doesn't exist.
    InvalidUnitRef { stream: StreamId, unit: UnitId },

    /// A stream sits in a unit's slots but does not reference that unit.
    InconsistentAdjacency { stream: StreamId, unit: UnitId },

    /// Unit ID not present in the flowsheet.
    UnitNotFound { unit: UnitId },

    /// Stream ID not present in the flowsheet.
    StreamNotFound { stream: StreamId },

    /// A stream without a source has no outlet port.
    MissingSource { stream: StreamId },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::InvalidUnitRef { stream, unit } => {
                write!(f, "Stream {} refers to non-existent unit {}", stream, unit)
            }
            GraphError::InconsistentAdjacency { stream, unit } => {
                write!(
                    f,
                    "Stream {} in unit {}'s slots but doesn't reference that unit",
                    stream, unit
                )
            }
            GraphError::UnitNotFound { unit } => write!(f, "Unit {} not found", unit),
            GraphError::StreamNotFound { stream } => write!(f, "Stream {} not found", stream),
            GraphError::MissingSource { stream } => {
                write!(f, "Stream {} has no source unit", stream)
            }
        }
    }
}

impl std::error::Error for GraphError {}

impl From<GraphError> for FtError {
    fn from(err: GraphError) -> Self {
        FtError::Invariant {
            what: err.to_string(),
        }
    }
}
