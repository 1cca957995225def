//! Core graph data structures.

use ft_core::{StreamId, UnitId};

use crate::error::GraphError;

/// Behavioral class of a unit, as far as network resolution cares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitClass {
    /// Ordinary unit operation.
    #[default]
    Process,
    /// Boundary unit (utilities, storage, treatment) that is never placed inside a path.
    Facility,
    /// Two-sided exchanger between process streams; simulated once per side.
    ProcessHeatExchanger,
}

/// A unit operation in the flowsheet.
///
/// Units hold no process data, only identity and their ordered stream slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub class: UnitClass,
    pub(crate) ins: Vec<StreamId>,
    pub(crate) outs: Vec<StreamId>,
}

impl Unit {
    /// Inlet streams in slot order.
    pub fn ins(&self) -> &[StreamId] {
        &self.ins
    }

    /// Outlet streams in slot order.
    pub fn outs(&self) -> &[StreamId] {
        &self.outs
    }

    pub fn is_facility(&self) -> bool {
        self.class == UnitClass::Facility
    }

    pub fn is_process_heat_exchanger(&self) -> bool {
        self.class == UnitClass::ProcessHeatExchanger
    }
}

/// A directed flow connection between two units.
///
/// `source == None` marks a feed entering from the flowsheet boundary,
/// `sink == None` a product leaving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    pub id: StreamId,
    pub name: String,
    pub source: Option<UnitId>,
    pub sink: Option<UnitId>,
}

impl Stream {
    pub fn is_feed(&self) -> bool {
        self.source.is_none()
    }

    pub fn is_product(&self) -> bool {
        self.sink.is_none()
    }
}

/// Canonical key of a stream: its source unit and outlet slot.
///
/// Stays valid if the stream occupying the slot is swapped out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutletPort {
    pub source: UnitId,
    pub index: usize,
}

/// The flowsheet: a validated, immutable collection of units and streams.
///
/// Units and streams are stored in vectors indexed by their IDs.
#[derive(Debug, Clone)]
pub struct Flowsheet {
    pub(crate) units: Vec<Unit>,
    pub(crate) streams: Vec<Stream>,
}

impl Flowsheet {
    /// Return all units.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Return all streams.
    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    /// Get a unit by ID (returns None if ID out of bounds).
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id.slot())
    }

    /// Get a stream by ID (returns None if ID out of bounds).
    pub fn stream(&self, id: StreamId) -> Option<&Stream> {
        self.streams.get(id.slot())
    }

    /// Look up a unit by name.
    pub fn unit_by_name(&self, name: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.name == name)
    }

    /// Look up a stream by name.
    pub fn stream_by_name(&self, name: &str) -> Option<&Stream> {
        self.streams.iter().find(|s| s.name == name)
    }

    /// Unit producing the stream, if any.
    pub fn source(&self, stream: StreamId) -> Option<UnitId> {
        self.stream(stream).and_then(|s| s.source)
    }

    /// Unit consuming the stream, if any.
    pub fn sink(&self, stream: StreamId) -> Option<UnitId> {
        self.stream(stream).and_then(|s| s.sink)
    }

    /// Whether the unit exists and is a facility.
    pub fn is_facility(&self, unit: UnitId) -> bool {
        self.unit(unit).is_some_and(Unit::is_facility)
    }

    /// Whether the unit exists and is a process heat exchanger.
    pub fn is_process_heat_exchanger(&self, unit: UnitId) -> bool {
        self.unit(unit).is_some_and(Unit::is_process_heat_exchanger)
    }

    /// Outlet port key of a stream.
    pub fn outlet_port(&self, stream: StreamId) -> Result<OutletPort, GraphError> {
        let s = self
            .stream(stream)
            .ok_or(GraphError::StreamNotFound { stream })?;
        let source = s.source.ok_or(GraphError::MissingSource { stream })?;
        let unit = self
            .unit(source)
            .ok_or(GraphError::InvalidUnitRef { stream, unit: source })?;
        let index = unit
            .outs
            .iter()
            .position(|&o| o == stream)
            .ok_or(GraphError::InconsistentAdjacency { stream, unit: source })?;
        Ok(OutletPort { source, index })
    }

    /// Stream currently occupying an outlet port.
    pub fn stream_at(&self, port: OutletPort) -> Option<StreamId> {
        self.unit(port.source)?.outs.get(port.index).copied()
    }
}
