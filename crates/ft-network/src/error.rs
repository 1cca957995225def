//! Error types for network resolution.

use ft_core::{FtError, StreamId, UnitId};
use thiserror::Error;

/// Errors raised while building or merging networks.
///
/// All of these mean the caller handed in an inconsistent graph or structure;
/// none are retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Networks must have units in common to join")]
    NoCommonUnits,

    #[error("Unit {unit} not in path")]
    UnitNotInPath { unit: UnitId },

    #[error("Network does not contain any of the given units")]
    UnitsNotFound,

    #[error("Invalid recycle: {what}")]
    InvalidRecycle { what: &'static str },

    #[error("Recycle sink mismatch: expected unit {expected}, found unit {found}")]
    RecycleSinkMismatch { expected: UnitId, found: UnitId },

    #[error("Stream {stream} has no sink")]
    MissingSink { stream: StreamId },

    #[error("Graph error: {0}")]
    Graph(#[from] ft_graph::GraphError),

    #[error("Core error: {0}")]
    Core(#[from] FtError),
}

pub type NetworkResult<T> = Result<T, NetworkError>;

impl From<NetworkError> for FtError {
    fn from(e: NetworkError) -> Self {
        match e {
            NetworkError::Core(inner) => inner,
            NetworkError::Graph(inner) => inner.into(),
            NetworkError::InvalidRecycle { what } => FtError::InvalidArg { what },
            other => FtError::Invariant {
                what: other.to_string(),
            },
        }
    }
}
