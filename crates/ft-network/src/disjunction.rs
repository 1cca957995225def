//! Registry of streams that must never close a recycle loop.
//!
//! A disjunction marks a stream as deterministic: its flow and condition are
//! fixed after a linear pass, so network resolution never forms a loop about it.
//! Entries are keyed by outlet port, so they survive replacing the stream object
//! in that slot.

use std::collections::HashSet;

use ft_core::StreamId;
use ft_graph::{Flowsheet, OutletPort};

use crate::error::NetworkResult;

/// Explicit disjunction context passed to the network builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Disjunctions {
    ports: Vec<OutletPort>,
}

impl Disjunctions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `stream` as deterministic. Marking twice is a no-op.
    pub fn mark(&mut self, flowsheet: &Flowsheet, stream: StreamId) -> NetworkResult<()> {
        let port = flowsheet.outlet_port(stream)?;
        self.mark_port(port);
        Ok(())
    }

    /// Remove the mark from `stream`, if present.
    pub fn unmark(&mut self, flowsheet: &Flowsheet, stream: StreamId) -> NetworkResult<()> {
        let port = flowsheet.outlet_port(stream)?;
        self.unmark_port(port);
        Ok(())
    }

    pub fn mark_port(&mut self, port: OutletPort) {
        if !self.ports.contains(&port) {
            self.ports.push(port);
        }
    }

    pub fn unmark_port(&mut self, port: OutletPort) {
        self.ports.retain(|&p| p != port);
    }

    /// Whether the stream's outlet port is marked. Feeds are never marked.
    pub fn contains(&self, flowsheet: &Flowsheet, stream: StreamId) -> bool {
        flowsheet
            .outlet_port(stream)
            .is_ok_and(|port| self.ports.contains(&port))
    }

    /// Marked ports in marking order.
    pub fn ports(&self) -> &[OutletPort] {
        &self.ports
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn clear(&mut self) {
        self.ports.clear();
    }

    /// Streams currently occupying the marked ports.
    pub fn streams(&self, flowsheet: &Flowsheet) -> HashSet<StreamId> {
        self.ports
            .iter()
            .filter_map(|&port| flowsheet.stream_at(port))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;
    use ft_graph::{FlowsheetBuilder, GraphError, UnitClass};

    fn loop_flowsheet() -> (Flowsheet, StreamId, StreamId) {
        let mut builder = FlowsheetBuilder::new();
        let m1 = builder.add_unit("M1", UnitClass::Process);
        let s1 = builder.add_unit("S1", UnitClass::Process);
        let feed = builder.add_feed("feed", m1);
        builder.add_stream("mixed", m1, s1);
        let recycle = builder.add_stream("recycle", s1, m1);
        (builder.build().unwrap(), feed, recycle)
    }

    #[test]
    fn mark_and_unmark() {
        let (flowsheet, _, recycle) = loop_flowsheet();
        let mut disjunctions = Disjunctions::new();

        disjunctions.mark(&flowsheet, recycle).unwrap();
        disjunctions.mark(&flowsheet, recycle).unwrap();
        assert_eq!(disjunctions.len(), 1);
        assert!(disjunctions.contains(&flowsheet, recycle));
        assert_eq!(disjunctions.streams(&flowsheet), HashSet::from([recycle]));

        disjunctions.unmark(&flowsheet, recycle).unwrap();
        assert!(disjunctions.is_empty());
        assert!(!disjunctions.contains(&flowsheet, recycle));

        // Unmarking an unmarked stream is fine
        disjunctions.unmark(&flowsheet, recycle).unwrap();
    }

    #[test]
    fn feeds_cannot_be_marked() {
        let (flowsheet, feed, _) = loop_flowsheet();
        let mut disjunctions = Disjunctions::new();
        assert_eq!(
            disjunctions.mark(&flowsheet, feed),
            Err(NetworkError::Graph(GraphError::MissingSource { stream: feed }))
        );
        assert!(!disjunctions.contains(&flowsheet, feed));
    }

    #[test]
    fn stale_port_resolves_to_nothing() {
        let (flowsheet, _, recycle) = loop_flowsheet();
        let mut disjunctions = Disjunctions::new();
        let port = flowsheet.outlet_port(recycle).unwrap();
        disjunctions.mark_port(OutletPort {
            source: port.source,
            index: port.index + 5,
        });
        assert_eq!(disjunctions.len(), 1);
        assert!(disjunctions.streams(&flowsheet).is_empty());
    }
}
