//! Incremental flowsheet builder.

use ft_core::{FtResult, StreamId, UnitId};

use crate::graph::{Flowsheet, Stream, Unit, UnitClass};
use crate::validate;

/// Builder for constructing a flowsheet incrementally.
///
/// Use `add_unit` and the stream methods to build up the flowsheet,
/// then call `build()` to validate and freeze it into an immutable `Flowsheet`.
/// Stream slots are filled in creation order on both the source and the sink.
#[derive(Debug, Default)]
pub struct FlowsheetBuilder {
    units: Vec<Unit>,
    streams: Vec<Stream>,
    next_unit_id: u32,
    next_stream_id: u32,
}

impl FlowsheetBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit to the flowsheet and return its ID.
    pub fn add_unit(&mut self, name: impl Into<String>, class: UnitClass) -> UnitId {
        let id = UnitId::from_index(self.next_unit_id);
        self.next_unit_id += 1;
        self.units.push(Unit {
            id,
            name: name.into(),
            class,
            ins: Vec::new(),
            outs: Vec::new(),
        });
        id
    }

    /// Add a stream with optional endpoints.
    ///
    /// The stream takes the next outlet slot of `source` and the next inlet slot of `sink`.
    /// Unknown unit IDs are recorded as given and rejected by `build()`.
    pub fn connect(
        &mut self,
        name: impl Into<String>,
        source: Option<UnitId>,
        sink: Option<UnitId>,
    ) -> StreamId {
        let id = StreamId::from_index(self.next_stream_id);
        self.next_stream_id += 1;

        if let Some(unit) = source.and_then(|u| self.units.get_mut(u.slot())) {
            unit.outs.push(id);
        }
        if let Some(unit) = sink.and_then(|u| self.units.get_mut(u.slot())) {
            unit.ins.push(id);
        }

        self.streams.push(Stream {
            id,
            name: name.into(),
            source,
            sink,
        });
        id
    }

    /// Add an internal stream from `source` to `sink`.
    pub fn add_stream(
        &mut self,
        name: impl Into<String>,
        source: UnitId,
        sink: UnitId,
    ) -> StreamId {
        self.connect(name, Some(source), Some(sink))
    }

    /// Add a feed entering `sink` from outside the flowsheet.
    pub fn add_feed(&mut self, name: impl Into<String>, sink: UnitId) -> StreamId {
        self.connect(name, None, Some(sink))
    }

    /// Add a product leaving `source`.
    pub fn add_product(&mut self, name: impl Into<String>, source: UnitId) -> StreamId {
        self.connect(name, Some(source), None)
    }

    /// Build and validate the flowsheet, returning an immutable `Flowsheet`.
    pub fn build(self) -> FtResult<Flowsheet> {
        validate::validate_structure(&self.units, &self.streams)?;
        validate::validate_slots(&self.units, &self.streams)?;

        Ok(Flowsheet {
            units: self.units,
            streams: self.streams,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_basic() {
        let mut builder = FlowsheetBuilder::new();
        let u1 = builder.add_unit("U1", UnitClass::Process);
        let u2 = builder.add_unit("U2", UnitClass::Process);
        let s1 = builder.add_stream("S1", u1, u2);

        assert_eq!(u1.index(), 0);
        assert_eq!(u2.index(), 1);
        assert_eq!(s1.index(), 0);
        assert_eq!(builder.units[0].outs, vec![s1]);
        assert_eq!(builder.units[1].ins, vec![s1]);
    }

    #[test]
    fn slots_follow_creation_order() {
        let mut builder = FlowsheetBuilder::new();
        let mixer = builder.add_unit("M1", UnitClass::Process);
        let splitter = builder.add_unit("S1", UnitClass::Process);
        let feed = builder.add_feed("feed", mixer);
        let mixed = builder.add_stream("mixed", mixer, splitter);
        let product = builder.add_product("product", splitter);
        let recycle = builder.add_stream("recycle", splitter, mixer);
        let flowsheet = builder.build().unwrap();

        assert_eq!(flowsheet.unit(mixer).unwrap().ins(), &[feed, recycle]);
        assert_eq!(flowsheet.unit(splitter).unwrap().outs(), &[product, recycle]);
        assert_eq!(flowsheet.unit(splitter).unwrap().ins(), &[mixed]);
    }

    #[test]
    fn build_rejects_unknown_unit() {
        let mut builder = FlowsheetBuilder::new();
        let u1 = builder.add_unit("U1", UnitClass::Process);
        builder.add_stream("S1", u1, UnitId::from_index(42));
        assert!(builder.build().is_err());
    }
}
