//! Merge operators.
//!
//! Every merge keeps one owner per nested network and never leaves a unit in
//! two siblings: overlapping direct units are removed from the container, since
//! the incoming network is the more specific description of them.

use std::collections::HashSet;
use std::mem;

use ft_core::UnitId;
use ft_graph::Flowsheet;
use tracing::debug;

use crate::error::{NetworkError, NetworkResult};
use crate::network::{Element, Network};
use crate::recycle::Recycle;

impl Network {
    /// Splice a linear network in where it first overlaps this path, or append it.
    pub fn join_linear_network(&mut self, network: Network) {
        match self.remove_overlap(&network.units) {
            Some(index) => self.insert_linear_network(index, network),
            None => self.append_linear_network(network),
        }
    }

    /// Merge a cyclic network.
    ///
    /// Loops closing at the same unit fold into one network with a combined
    /// recycle. Otherwise the network descends into the nested network it shares
    /// units with, or is inserted as an opaque block at the first shared unit.
    pub fn join_recycle_network(&mut self, mut network: Network) -> NetworkResult<()> {
        if self.recycle_sink == network.recycle_sink {
            // Feed forward: both loops close at the same unit
            let recycle = mem::take(&mut network.recycle);
            let sink = network.recycle_sink.take();
            self.merge_recycle(recycle, sink)?;
            return self.add_linear_network(network);
        }

        self.absorb_sharing_siblings(&mut network)?;
        let index = self.remove_overlap(&network.units);
        let units: Vec<UnitId> = network.units.iter().copied().collect();
        if let Some(nested) = self.nested_sharing_units(&network.units) {
            nested.join_recycle_network(network)?;
            self.units.extend(units);
            return Ok(());
        }
        match index {
            Some(index) => {
                self.insert_recycle_network(index, network);
                Ok(())
            }
            None => Err(NetworkError::NoCommonUnits),
        }
    }

    /// Merge a network feeding into `unit`.
    ///
    /// The incoming network lands just ahead of `unit` (or ahead of the nested
    /// network holding it). Cyclic networks descend into nested networks so loop
    /// nesting is preserved.
    pub fn join_network_at_unit(&mut self, network: Network, unit: UnitId) -> NetworkResult<()> {
        self.remove_overlap(&network.units);
        let index = self
            .path
            .iter()
            .position(|item| item.contains_unit(unit))
            .ok_or(NetworkError::UnitNotInPath { unit })?;

        let holds_unit_nested = matches!(self.path[index], Element::Network(_));
        match (holds_unit_nested, network.is_cyclic()) {
            (true, true) => {
                let units: Vec<UnitId> = network.units.iter().copied().collect();
                if let Element::Network(nested) = &mut self.path[index] {
                    nested.join_network_at_unit(network, unit)?;
                }
                self.units.extend(units);
            }
            (false, true) => self.insert_recycle_network(index, network),
            (_, false) => self.insert_linear_network(index, network),
        }
        Ok(())
    }

    /// Union recycle stream(s) into this network's marking.
    ///
    /// The streams must close at this network's recycle sink, if it has one.
    pub fn add_recycle(&mut self, flowsheet: &Flowsheet, recycle: Recycle) -> NetworkResult<()> {
        let sink = recycle.sink(flowsheet)?;
        self.merge_recycle(recycle, sink)
    }

    /// Append a network with no connection to this one yet.
    ///
    /// A cyclic container is first wrapped so the appended network stays outside its loop.
    pub fn append_network(&mut self, network: Network) {
        if self.is_cyclic() {
            let inner = Network {
                path: mem::take(&mut self.path),
                units: self.units.clone(),
                recycle: mem::take(&mut self.recycle),
                recycle_sink: self.recycle_sink.take(),
            };
            self.units.extend(network.units.iter().copied());
            self.path = vec![Element::Network(inner)];
            if network.is_cyclic() {
                self.path.push(Element::Network(network));
            } else {
                self.path.extend(network.path);
            }
        } else if network.is_cyclic() {
            self.append_recycle_network(network);
        } else {
            self.append_linear_network(network);
        }
    }

    fn merge_recycle(&mut self, recycle: Recycle, sink: Option<UnitId>) -> NetworkResult<()> {
        if recycle.is_none() {
            return Ok(());
        }
        match (self.recycle_sink, sink) {
            (Some(expected), Some(found)) if expected != found => {
                return Err(NetworkError::RecycleSinkMismatch { expected, found });
            }
            _ => {}
        }
        self.recycle.union(recycle)?;
        if self.recycle_sink.is_none() {
            self.recycle_sink = sink;
        }
        Ok(())
    }

    /// Merge a network as linear, descending into a nested network it overlaps.
    fn add_linear_network(&mut self, mut network: Network) -> NetworkResult<()> {
        self.absorb_sharing_siblings(&mut network)?;
        let index = self.remove_overlap(&network.units);
        let units: Vec<UnitId> = network.units.iter().copied().collect();
        if let Some(nested) = self.nested_sharing_units(&network.units) {
            nested.add_linear_network(network)?;
            self.units.extend(units);
            return Ok(());
        }
        match index {
            Some(index) => self.insert_linear_network(index, network),
            None => self.append_linear_network(network),
        }
        Ok(())
    }

    /// Fold every nested network past the first one sharing units with `network`
    /// into `network`.
    ///
    /// The incoming network only descends into one nested network, so any other
    /// sibling holding a shared unit has to move inside it.
    fn absorb_sharing_siblings(&mut self, network: &mut Network) -> NetworkResult<()> {
        let mut descended = false;
        let mut extra = Vec::new();
        for item in mem::take(&mut self.path) {
            match item {
                Element::Network(sibling)
                    if descended && !sibling.units.is_disjoint(&network.units) =>
                {
                    extra.push(sibling);
                }
                item => {
                    descended |= matches!(
                        &item,
                        Element::Network(n) if !n.units.is_disjoint(&network.units)
                    );
                    self.path.push(item);
                }
            }
        }
        for sibling in extra {
            debug!(units = sibling.units.len(), "folding sibling network into incoming network");
            if sibling.is_cyclic() {
                network.join_recycle_network(sibling)?;
            } else {
                network.join_linear_network(sibling);
            }
        }
        Ok(())
    }

    fn nested_sharing_units(&mut self, units: &HashSet<UnitId>) -> Option<&mut Network> {
        self.path.iter_mut().find_map(|item| match item {
            Element::Network(n) if !n.units.is_disjoint(units) => Some(n),
            _ => None,
        })
    }

    /// Drop direct units of this path that also belong to `units`.
    ///
    /// Returns the position of the first one dropped.
    fn remove_overlap(&mut self, units: &HashSet<UnitId>) -> Option<usize> {
        let first = self.path.iter().position(|item| item.is_unit_in(units))?;
        self.path.retain(|item| !item.is_unit_in(units));
        Some(first)
    }

    fn insert_linear_network(&mut self, index: usize, network: Network) {
        self.units.extend(network.units);
        self.path.splice(index..index, network.path);
    }

    fn append_linear_network(&mut self, network: Network) {
        self.units.extend(network.units);
        self.path.extend(network.path);
    }

    fn append_recycle_network(&mut self, network: Network) {
        self.units.extend(network.units.iter().copied());
        self.path.push(Element::Network(network));
    }

    fn insert_recycle_network(&mut self, index: usize, network: Network) {
        self.units.extend(network.units.iter().copied());
        self.path.insert(index, Element::Network(network));
        // A lone nested network is this network
        if let [Element::Network(_)] = self.path.as_slice() {
            if let Some(Element::Network(only)) = self.path.pop() {
                debug!(units = only.units.len(), "adopting sole nested network");
                self.path = only.path;
                self.recycle = only.recycle;
                self.recycle_sink = only.recycle_sink;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ft_core::StreamId;
    use ft_graph::{FlowsheetBuilder, UnitClass};

    /// feed -> P1 -> M1 -> M2 -> S2 -> S1 -> product
    /// S2 -> inner -> M2, S1 -> outer -> M1, S1 -> bypass -> M1
    struct Loops {
        flowsheet: Flowsheet,
        p1: UnitId,
        m1: UnitId,
        m2: UnitId,
        s2: UnitId,
        s1: UnitId,
        inner: StreamId,
        outer: StreamId,
        bypass: StreamId,
    }

    fn loops() -> Loops {
        let mut builder = FlowsheetBuilder::new();
        let p1 = builder.add_unit("P1", UnitClass::Process);
        let m1 = builder.add_unit("M1", UnitClass::Process);
        let m2 = builder.add_unit("M2", UnitClass::Process);
        let s2 = builder.add_unit("S2", UnitClass::Process);
        let s1 = builder.add_unit("S1", UnitClass::Process);
        builder.add_feed("feed", p1);
        builder.add_stream("p1_m1", p1, m1);
        builder.add_stream("m1_m2", m1, m2);
        builder.add_stream("m2_s2", m2, s2);
        builder.add_stream("s2_s1", s2, s1);
        let inner = builder.add_stream("inner", s2, m2);
        builder.add_product("product", s1);
        let outer = builder.add_stream("outer", s1, m1);
        let bypass = builder.add_stream("bypass", s1, m1);
        Loops {
            flowsheet: builder.build().unwrap(),
            p1,
            m1,
            m2,
            s2,
            s1,
            inner,
            outer,
            bypass,
        }
    }

    fn cyclic(fx: &Loops, units: Vec<UnitId>, recycle: StreamId) -> Network {
        let path = units.into_iter().map(Element::Unit).collect();
        Network::with_recycle(path, Recycle::Single(recycle), &fx.flowsheet).unwrap()
    }

    #[test]
    fn linear_join_splices_at_first_overlap() {
        let fx = loops();
        let mut root = Network::from(vec![fx.m1, fx.m2, fx.s1]);
        root.join_linear_network(Network::from(vec![fx.m2, fx.s2]));

        assert_eq!(root.flattened(), vec![fx.m1, fx.m2, fx.s2, fx.s1]);
        assert!(root.units_consistent());
    }

    #[test]
    fn linear_join_appends_when_disjoint() {
        let fx = loops();
        let mut root = Network::from(vec![fx.m1]);
        root.join_linear_network(Network::from(vec![fx.s1]));
        assert_eq!(root.flattened(), vec![fx.m1, fx.s1]);
    }

    #[test]
    fn recycle_join_nests_loops() {
        let fx = loops();
        let mut root = Network::from(vec![fx.m1, fx.m2, fx.s2, fx.s1]);
        root.join_recycle_network(cyclic(&fx, vec![fx.m1, fx.m2, fx.s2, fx.s1], fx.outer))
            .unwrap();

        // Sole element adopted: the root itself is the outer loop
        assert_eq!(root.recycle(), &Recycle::Single(fx.outer));
        assert_eq!(root.recycle_sink(), Some(fx.m1));

        root.join_recycle_network(cyclic(&fx, vec![fx.m2, fx.s2], fx.inner))
            .unwrap();
        assert_eq!(root.path().len(), 3);
        let nested = root.path()[1].as_network().unwrap();
        assert_eq!(nested.recycle(), &Recycle::Single(fx.inner));
        assert_eq!(nested.flattened(), vec![fx.m2, fx.s2]);
        assert!(root.units_consistent());
    }

    #[test]
    fn recycle_join_descends_into_overlapping_nested_network() {
        let fx = loops();
        let outer = cyclic(&fx, vec![fx.m1, fx.m2, fx.s2, fx.s1], fx.outer);
        let mut root = Network::new(vec![Element::Network(outer)]);
        root.join_recycle_network(cyclic(&fx, vec![fx.m2, fx.s2], fx.inner))
            .unwrap();

        let outer = root.path()[0].as_network().unwrap();
        assert_eq!(outer.path().len(), 3);
        assert!(outer.path()[1].as_network().is_some());
        assert!(root.units_consistent());
    }

    #[test]
    fn feed_forward_loops_fold_together() {
        let fx = loops();
        let mut first = cyclic(&fx, vec![fx.m1, fx.m2, fx.s2, fx.s1], fx.outer);
        first
            .join_recycle_network(cyclic(&fx, vec![fx.m1, fx.m2, fx.s2, fx.s1], fx.bypass))
            .unwrap();

        assert_eq!(first.recycle().streams().len(), 2);
        assert!(first.recycle().contains(fx.outer));
        assert!(first.recycle().contains(fx.bypass));
        assert_eq!(first.subnetworks().count(), 0);
        assert_eq!(first.flattened(), vec![fx.m1, fx.m2, fx.s2, fx.s1]);
    }

    #[test]
    fn loop_bridging_two_siblings_keeps_one_owner_per_unit() {
        // A <-> B and C <-> D, then B -> C with C -> B closing a third loop at B
        let mut builder = FlowsheetBuilder::new();
        let a = builder.add_unit("A", UnitClass::Process);
        let b = builder.add_unit("B", UnitClass::Process);
        let c = builder.add_unit("C", UnitClass::Process);
        let d = builder.add_unit("D", UnitClass::Process);
        builder.add_stream("ab", a, b);
        let ba = builder.add_stream("ba", b, a);
        builder.add_stream("cd", c, d);
        let dc = builder.add_stream("dc", d, c);
        builder.add_stream("bc", b, c);
        let cb = builder.add_stream("cb", c, b);
        let flowsheet = builder.build().unwrap();
        let cyclic = |units: Vec<UnitId>, recycle| {
            let path = units.into_iter().map(Element::Unit).collect();
            Network::with_recycle(path, Recycle::Single(recycle), &flowsheet).unwrap()
        };

        let mut root = Network::new(vec![
            cyclic(vec![a, b], ba).into(),
            cyclic(vec![c, d], dc).into(),
        ]);
        root.join_recycle_network(cyclic(vec![b, c], cb)).unwrap();

        assert_eq!(root.flattened(), vec![a, b, c, d]);
        assert!(root.units_consistent());
        assert_eq!(root.path().len(), 1);

        // [A, [B, [C, D]]]
        let first = root.path()[0].as_network().unwrap();
        assert_eq!(first.recycle(), &Recycle::Single(ba));
        let bridge = first.path()[1].as_network().unwrap();
        assert_eq!(bridge.recycle(), &Recycle::Single(cb));
        let last = bridge.path()[1].as_network().unwrap();
        assert_eq!(last.recycle(), &Recycle::Single(dc));
    }

    #[test]
    fn recycle_join_without_common_units_fails() {
        let fx = loops();
        let mut root = Network::from(vec![fx.m1]);
        let err = root
            .join_recycle_network(cyclic(&fx, vec![fx.m2, fx.s2], fx.inner))
            .unwrap_err();
        assert_eq!(err, NetworkError::NoCommonUnits);
    }

    #[test]
    fn join_at_unit_places_feed_ahead() {
        let fx = loops();
        let outer = cyclic(&fx, vec![fx.m1, fx.m2, fx.s2, fx.s1], fx.outer);
        let mut root = Network::new(vec![Element::Network(outer)]);

        // Linear feed segment for a unit inside the loop sits ahead of the loop
        root.join_network_at_unit(Network::from(vec![fx.p1]), fx.m1)
            .unwrap();
        assert_eq!(root.path()[0], Element::Unit(fx.p1));
        assert!(root.path()[1].as_network().is_some());
        assert!(root.units_consistent());

        assert_eq!(
            root.join_network_at_unit(Network::default(), UnitId::from_index(99)),
            Err(NetworkError::UnitNotInPath {
                unit: UnitId::from_index(99)
            })
        );
    }

    #[test]
    fn join_at_unit_nests_cyclic_networks() {
        let fx = loops();
        let mut root = Network::from(vec![fx.m1, fx.m2, fx.s1]);
        root.join_network_at_unit(cyclic(&fx, vec![fx.s2], fx.inner), fx.m2)
            .unwrap();

        assert_eq!(root.path().len(), 4);
        assert_eq!(root.path()[0], Element::Unit(fx.m1));
        assert!(root.path()[1].as_network().is_some());
        assert_eq!(root.path()[2], Element::Unit(fx.m2));
    }

    #[test]
    fn append_wraps_cyclic_container() {
        let fx = loops();
        let mut root = cyclic(&fx, vec![fx.m2, fx.s2], fx.inner);
        root.append_network(Network::from(vec![fx.s1]));

        assert!(!root.is_cyclic());
        assert_eq!(root.recycle_sink(), None);
        assert_eq!(root.path().len(), 2);
        let wrapped = root.path()[0].as_network().unwrap();
        assert_eq!(wrapped.recycle(), &Recycle::Single(fx.inner));
        assert_eq!(root.path()[1], Element::Unit(fx.s1));
        assert!(root.units_consistent());
    }

    #[test]
    fn append_keeps_cyclic_networks_opaque() {
        let fx = loops();
        let mut root = Network::from(vec![fx.m1]);
        root.append_network(cyclic(&fx, vec![fx.m2, fx.s2], fx.inner));
        assert_eq!(root.path().len(), 2);
        assert!(root.path()[1].as_network().is_some());
        assert!(!root.is_cyclic());
    }

    #[test]
    fn add_recycle_is_idempotent() {
        let fx = loops();
        let mut network = Network::from(vec![fx.m1, fx.s1]);
        network
            .add_recycle(&fx.flowsheet, Recycle::Single(fx.outer))
            .unwrap();
        let once = network.recycle().clone();
        network
            .add_recycle(&fx.flowsheet, Recycle::Single(fx.outer))
            .unwrap();
        assert_eq!(network.recycle(), &once);
        assert_eq!(network.recycle_sink(), Some(fx.m1));

        network
            .add_recycle(&fx.flowsheet, Recycle::Single(fx.bypass))
            .unwrap();
        assert_eq!(network.recycle().len(), 2);

        let err = network
            .add_recycle(&fx.flowsheet, Recycle::Single(fx.inner))
            .unwrap_err();
        assert_eq!(
            err,
            NetworkError::RecycleSinkMismatch {
                expected: fx.m1,
                found: fx.m2
            }
        );
    }
}
