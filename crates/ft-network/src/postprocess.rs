//! Clean-up passes run after ordering.

use std::collections::HashSet;

use ft_core::UnitId;
use ft_graph::Flowsheet;

use crate::network::{Element, Network};
use crate::recycle::Recycle;

impl Network {
    /// Re-insert process heat exchangers right after the unit feeding their second side.
    ///
    /// A process heat exchanger is evaluated once per side, so when a unit later
    /// in a level feeds an exchanger already placed earlier in that level (and no
    /// later element needs it), the exchanger is placed again right after that
    /// unit. Exchangers are handled at most once across the whole tree.
    pub fn add_process_heat_exchangers(&mut self, flowsheet: &Flowsheet) {
        let mut excluded = HashSet::new();
        self.pair_heat_exchangers(flowsheet, &mut excluded);
    }

    fn pair_heat_exchangers(&mut self, flowsheet: &Flowsheet, excluded: &mut HashSet<UnitId>) {
        let mut i = 0;
        while i < self.path.len() {
            let unit = match &mut self.path[i] {
                Element::Network(nested) => {
                    nested.pair_heat_exchangers(flowsheet, excluded);
                    None
                }
                Element::Unit(u) => flowsheet.unit(*u),
            };
            if let Some(unit) = unit {
                if unit.is_process_heat_exchanger() {
                    excluded.insert(unit.id);
                }
                if !excluded.contains(&unit.id) {
                    for &outlet in unit.outs() {
                        let Some(sink) = flowsheet.sink(outlet) else {
                            continue;
                        };
                        if self.needs_second_pass(flowsheet, sink, i) {
                            excluded.insert(sink);
                            self.path.insert(i + 1, Element::Unit(sink));
                        }
                    }
                }
            }
            i += 1;
        }

        if let (Some(Element::Unit(first)), Some(Element::Unit(last))) =
            (self.path.first(), self.path.last())
        {
            if self.path.len() > 1 && first == last {
                self.path.pop();
            }
        }
    }

    fn needs_second_pass(&self, flowsheet: &Flowsheet, sink: UnitId, position: usize) -> bool {
        flowsheet.is_process_heat_exchanger(sink)
            && self.path[..position].contains(&Element::Unit(sink))
            && !self.path[position + 1..]
                .iter()
                .any(|item| item.contains_unit(sink))
    }

    /// Collapse a recycle set onto the single outlet of the unit all its streams feed.
    ///
    /// Applied at every nesting depth.
    pub fn reduce_recycles(&mut self, flowsheet: &Flowsheet) {
        if let Recycle::Multi(streams) = &self.recycle {
            let sinks: HashSet<Option<UnitId>> =
                streams.iter().map(|&s| flowsheet.sink(s)).collect();
            if let [Some(sink)] = sinks.into_iter().collect::<Vec<_>>()[..] {
                if let Some(&[outlet]) = flowsheet.unit(sink).map(|u| u.outs()) {
                    self.recycle = Recycle::Single(outlet);
                    self.recycle_sink = flowsheet.sink(outlet);
                }
            }
        }
        for item in &mut self.path {
            if let Element::Network(nested) = item {
                nested.reduce_recycles(flowsheet);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ft_core::StreamId;
    use ft_graph::{FlowsheetBuilder, UnitClass};

    #[test]
    fn exchanger_reinserted_after_second_side() {
        // feed -> HX1 (cold side) -> R1 -> HX1 (hot side) -> product
        let mut builder = FlowsheetBuilder::new();
        let hx = builder.add_unit("HX1", UnitClass::ProcessHeatExchanger);
        let r1 = builder.add_unit("R1", UnitClass::Process);
        let f1 = builder.add_unit("F1", UnitClass::Process);
        builder.add_feed("feed", hx);
        builder.add_stream("cold_out", hx, r1);
        builder.add_stream("r1_hot", r1, hx);
        builder.add_stream("hot_out", hx, f1);
        let flowsheet = builder.build().unwrap();

        let mut network = Network::from(vec![hx, r1, f1]);
        network.add_process_heat_exchangers(&flowsheet);
        assert_eq!(network.flattened(), vec![hx, r1, hx, f1]);
        assert!(network.units_consistent());

        // Already paired: a second run changes nothing
        network.add_process_heat_exchangers(&flowsheet);
        assert_eq!(network.flattened(), vec![hx, r1, hx, f1]);
    }

    #[test]
    fn exchanger_left_alone_when_needed_later() {
        let mut builder = FlowsheetBuilder::new();
        let hx = builder.add_unit("HX1", UnitClass::ProcessHeatExchanger);
        let r1 = builder.add_unit("R1", UnitClass::Process);
        builder.add_stream("cold_out", hx, r1);
        builder.add_stream("r1_hot", r1, hx);
        let flowsheet = builder.build().unwrap();

        // HX1 also appears after R1, so no second copy
        let mut network = Network::new(vec![hx.into(), r1.into(), hx.into(), r1.into()]);
        network.add_process_heat_exchangers(&flowsheet);
        assert_eq!(network.path().len(), 4);
    }

    #[test]
    fn closing_duplicate_dropped() {
        let mut builder = FlowsheetBuilder::new();
        let m1 = builder.add_unit("M1", UnitClass::Process);
        let s1 = builder.add_unit("S1", UnitClass::Process);
        builder.add_stream("m1_s1", m1, s1);
        let flowsheet = builder.build().unwrap();

        let mut network = Network::from(vec![m1, s1, m1]);
        network.add_process_heat_exchangers(&flowsheet);
        assert_eq!(network.flattened(), vec![m1, s1]);
    }

    fn converging_recycles(splitter_outs: usize) -> (Flowsheet, StreamId, StreamId, UnitId) {
        // S1 -> r1, r2 -> M1 -> (M1 outlets)
        let mut builder = FlowsheetBuilder::new();
        let m1 = builder.add_unit("M1", UnitClass::Process);
        let s1 = builder.add_unit("S1", UnitClass::Process);
        let r1 = builder.add_stream("r1", s1, m1);
        let r2 = builder.add_stream("r2", s1, m1);
        for i in 0..splitter_outs {
            builder.add_stream(format!("m1_{i}"), m1, s1);
        }
        (builder.build().unwrap(), r1, r2, m1)
    }

    #[test]
    fn recycle_set_collapses_onto_single_outlet() {
        let (flowsheet, r1, r2, m1) = converging_recycles(1);
        let s1 = flowsheet.unit_by_name("S1").unwrap().id;
        let mixed = flowsheet.unit(m1).unwrap().outs()[0];

        let inner = Network::with_recycle(
            vec![m1.into(), s1.into()],
            Recycle::from_streams([r1, r2]),
            &flowsheet,
        )
        .unwrap();
        let mut network = Network::new(vec![inner.into()]);
        network.reduce_recycles(&flowsheet);

        let inner = network.path()[0].as_network().unwrap();
        assert_eq!(inner.recycle(), &Recycle::Single(mixed));
        assert_eq!(inner.recycle_sink(), Some(s1));
    }

    #[test]
    fn recycle_set_kept_with_several_outlets() {
        let (flowsheet, r1, r2, m1) = converging_recycles(2);
        let s1 = flowsheet.unit_by_name("S1").unwrap().id;
        let mut network = Network::with_recycle(
            vec![m1.into(), s1.into()],
            Recycle::from_streams([r1, r2]),
            &flowsheet,
        )
        .unwrap();
        network.reduce_recycles(&flowsheet);
        assert_eq!(network.recycle().len(), 2);
    }
}
