//! Flowsheet validation logic.

use std::collections::HashSet;
use ft_core::{FtResult, StreamId};

use crate::error::GraphError;
use crate::graph::{Stream, Unit};

/// Validate the flowsheet structure: IDs are contiguous and all references exist.
pub(crate) fn validate_structure(units: &[Unit], streams: &[Stream]) -> FtResult<()> {
    for (i, unit) in units.iter().enumerate() {
        if unit.id.slot() != i {
            return Err(GraphError::UnitNotFound { unit: unit.id }.into());
        }
    }

    for (i, stream) in streams.iter().enumerate() {
        if stream.id.slot() != i {
            return Err(GraphError::StreamNotFound { stream: stream.id }.into());
        }
    }

    // Both endpoints, when present, must name a real unit
    for stream in streams {
        for unit in [stream.source, stream.sink].into_iter().flatten() {
            if unit.slot() >= units.len() {
                return Err(GraphError::InvalidUnitRef {
                    stream: stream.id,
                    unit,
                }
                .into());
            }
        }
    }

    Ok(())
}

/// Validate unit slot lists against stream endpoints.
pub(crate) fn validate_slots(units: &[Unit], streams: &[Stream]) -> FtResult<()> {
    let mut seen_in: HashSet<StreamId> = HashSet::new();
    let mut seen_out: HashSet<StreamId> = HashSet::new();

    for unit in units {
        for &stream_id in &unit.ins {
            let stream = streams
                .get(stream_id.slot())
                .ok_or(GraphError::StreamNotFound { stream: stream_id })?;
            if stream.sink != Some(unit.id) || !seen_in.insert(stream_id) {
                return Err(GraphError::InconsistentAdjacency {
                    stream: stream_id,
                    unit: unit.id,
                }
                .into());
            }
        }
        for &stream_id in &unit.outs {
            let stream = streams
                .get(stream_id.slot())
                .ok_or(GraphError::StreamNotFound { stream: stream_id })?;
            if stream.source != Some(unit.id) || !seen_out.insert(stream_id) {
                return Err(GraphError::InconsistentAdjacency {
                    stream: stream_id,
                    unit: unit.id,
                }
                .into());
            }
        }
    }

    // Every connected endpoint must appear in the matching slot list
    for stream in streams {
        if let Some(sink) = stream.sink {
            if !seen_in.contains(&stream.id) {
                return Err(GraphError::InconsistentAdjacency {
                    stream: stream.id,
                    unit: sink,
                }
                .into());
            }
        }
        if let Some(source) = stream.source {
            if !seen_out.contains(&stream.id) {
                return Err(GraphError::InconsistentAdjacency {
                    stream: stream.id,
                    unit: source,
                }
                .into());
            }
        }
    }

    Ok(())
}
