//! Reachability and boundary queries.
//!
//! These are the graph capabilities network resolution consumes: how far a unit's
//! outlets reach, which streams enter or leave a group of units, and which units
//! consume a set of streams.

use std::collections::HashSet;

use ft_core::{StreamId, UnitId};

use crate::graph::Flowsheet;

impl Flowsheet {
    /// All units reachable through the outlets of `unit`.
    ///
    /// Streams in `ends` are not crossed. Facilities are skipped (and not traversed)
    /// unless `facilities` is set. `unit` itself is included only when it sits on a cycle.
    pub fn downstream_units(
        &self,
        unit: UnitId,
        ends: &HashSet<StreamId>,
        facilities: bool,
    ) -> HashSet<UnitId> {
        self.collect_downstream(unit, ends, facilities, None)
    }

    /// Like [`Flowsheet::downstream_units`], limited to `max_hops` streams away from `unit`.
    pub fn downstream_units_within(
        &self,
        unit: UnitId,
        ends: &HashSet<StreamId>,
        facilities: bool,
        max_hops: usize,
    ) -> HashSet<UnitId> {
        self.collect_downstream(unit, ends, facilities, Some(max_hops))
    }

    fn collect_downstream(
        &self,
        unit: UnitId,
        ends: &HashSet<StreamId>,
        facilities: bool,
        max_hops: Option<usize>,
    ) -> HashSet<UnitId> {
        let mut found = HashSet::new();
        let mut frontier = vec![unit];
        let mut hops = 0;

        while !frontier.is_empty() && max_hops.is_none_or(|max| hops < max) {
            hops += 1;
            let mut next = Vec::new();
            for current in frontier {
                let Some(current) = self.unit(current) else {
                    continue;
                };
                for &outlet in current.outs() {
                    if ends.contains(&outlet) {
                        continue;
                    }
                    let Some(sink) = self.sink(outlet) else {
                        continue;
                    };
                    if !facilities && self.is_facility(sink) {
                        continue;
                    }
                    if found.insert(sink) {
                        next.push(sink);
                    }
                }
            }
            frontier = next;
        }

        found
    }

    /// Every inlet and outlet stream of the given units.
    pub fn streams_from_units<'a>(
        &self,
        units: impl IntoIterator<Item = &'a UnitId>,
    ) -> HashSet<StreamId> {
        let mut streams = HashSet::new();
        for unit in units.into_iter().filter_map(|&u| self.unit(u)) {
            streams.extend(unit.ins().iter().copied());
            streams.extend(unit.outs().iter().copied());
        }
        streams
    }

    /// Inlet streams entering the unit group from outside (or from nowhere).
    ///
    /// Ordered by unit, then inlet slot; each stream appears once.
    pub fn feeds_from_units(&self, units: &[UnitId]) -> Vec<StreamId> {
        let members: HashSet<UnitId> = units.iter().copied().collect();
        let mut seen = HashSet::new();
        let mut feeds = Vec::new();
        for unit in units.iter().filter_map(|&u| self.unit(u)) {
            for &inlet in unit.ins() {
                let outside = self.source(inlet).is_none_or(|s| !members.contains(&s));
                if outside && seen.insert(inlet) {
                    feeds.push(inlet);
                }
            }
        }
        feeds
    }

    /// Outlet streams leaving the unit group (no sink, or a sink outside the group).
    ///
    /// Ordered by unit, then outlet slot.
    pub fn products_from_units(&self, units: &[UnitId]) -> Vec<StreamId> {
        let members: HashSet<UnitId> = units.iter().copied().collect();
        let mut seen = HashSet::new();
        let mut products = Vec::new();
        for unit in units.iter().filter_map(|&u| self.unit(u)) {
            for &outlet in unit.outs() {
                let outside = self.sink(outlet).is_none_or(|s| !members.contains(&s));
                if outside && seen.insert(outlet) {
                    products.push(outlet);
                }
            }
        }
        products
    }

    /// Units consuming any of the given streams.
    pub fn sinks_of(&self, streams: impl IntoIterator<Item = StreamId>) -> HashSet<UnitId> {
        streams.into_iter().filter_map(|s| self.sink(s)).collect()
    }
}
