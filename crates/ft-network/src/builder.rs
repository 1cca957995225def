//! Assemble a network tree from feeds.

use std::collections::HashSet;

use ft_core::{StreamId, UnitId};
use ft_graph::{Flowsheet, GraphError};
use tracing::debug;

use crate::disjunction::Disjunctions;
use crate::error::NetworkResult;
use crate::network::{Element, Network};
use crate::options::NetworkOptions;
use crate::paths::{Feed, find_linear_and_cyclic_paths};
use crate::recycle::Recycle;

/// Builds a `Network` over a set of units of one flowsheet.
///
/// Disjunctions are read once, when the builder is created.
pub struct NetworkBuilder<'a> {
    flowsheet: &'a Flowsheet,
    unit_order: Vec<UnitId>,
    units: HashSet<UnitId>,
    disjunctions: HashSet<StreamId>,
    options: NetworkOptions,
}

impl<'a> NetworkBuilder<'a> {
    /// A builder over every unit of `flowsheet`, in insertion order.
    pub fn new(flowsheet: &'a Flowsheet, disjunctions: &Disjunctions) -> Self {
        let unit_order: Vec<UnitId> = flowsheet.units().iter().map(|u| u.id).collect();
        Self {
            flowsheet,
            units: unit_order.iter().copied().collect(),
            unit_order,
            disjunctions: disjunctions.streams(flowsheet),
            options: NetworkOptions::default(),
        }
    }

    /// Restrict the builder to `units`, keeping their order.
    pub fn with_units(mut self, units: &[UnitId]) -> NetworkResult<Self> {
        if let Some(&unit) = units.iter().find(|&&u| self.flowsheet.unit(u).is_none()) {
            return Err(GraphError::UnitNotFound { unit }.into());
        }
        let mut seen = HashSet::new();
        self.unit_order = units.iter().copied().filter(|u| seen.insert(*u)).collect();
        self.units = seen;
        Ok(self)
    }

    pub fn with_options(mut self, options: NetworkOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &NetworkOptions {
        &self.options
    }

    /// Units the builder may place, in order.
    pub fn units(&self) -> &[UnitId] {
        &self.unit_order
    }

    /// Boundary feeds of the units: outside inlets first, then a synthetic inlet
    /// for every unit without any.
    pub fn feeds(&self) -> Vec<Feed> {
        let flowsheet = self.flowsheet;
        let mut feeds: Vec<Feed> = flowsheet
            .feeds_from_units(&self.unit_order)
            .into_iter()
            .map(Feed::Stream)
            .collect();
        feeds.extend(
            self.unit_order
                .iter()
                .filter(|&&u| flowsheet.unit(u).is_some_and(|unit| unit.ins().is_empty()))
                .map(|&u| Feed::Missing(u)),
        );
        feeds
    }

    /// Build the network for every unit of the builder.
    ///
    /// Without explicit `ends`, the products of the units and the disjunction
    /// streams are used.
    pub fn from_units(&self, ends: Option<&HashSet<StreamId>>) -> NetworkResult<Network> {
        let feeds = self.feeds();
        let Some((&feedstock, others)) = feeds.split_first() else {
            debug!("no feeds; empty network");
            return Ok(Network::default());
        };
        let ends = match ends {
            Some(ends) if !ends.is_empty() => ends.clone(),
            _ => {
                let mut ends: HashSet<StreamId> = self
                    .flowsheet
                    .products_from_units(&self.unit_order)
                    .into_iter()
                    .collect();
                ends.extend(self.disjunctions.iter().copied());
                ends
            }
        };
        let network = self.from_feedstock(feedstock, others, &ends)?;
        debug!(
            units = network.units().len(),
            elements = network.path().len(),
            recycles = network.get_all_recycles().len(),
            "network built from units"
        );
        Ok(network)
    }

    /// Build the network reached from `feedstock`, then merge in what each of
    /// `feeds` reaches.
    ///
    /// `ends` are streams the traversal must not cross. The caller's set is left
    /// untouched.
    pub fn from_feedstock(
        &self,
        feedstock: Feed,
        feeds: &[Feed],
        ends: &HashSet<StreamId>,
    ) -> NetworkResult<Network> {
        let flowsheet = self.flowsheet;
        let mut ends = ends.clone();
        let mut recycle_ends = ends.clone();

        let (linear_paths, cyclic_paths) = find_linear_and_cyclic_paths(
            flowsheet,
            feedstock,
            &mut ends,
            &self.units,
            &self.disjunctions,
        );
        let mut linear = linear_paths.into_iter().map(Network::from);
        let mut network = linear.next().unwrap_or_default();
        for linear_network in linear {
            network.join_linear_network(linear_network);
        }
        for cyclic in cyclic_paths {
            let path = cyclic.path.into_iter().map(Element::Unit).collect();
            let recycle_network =
                Network::with_recycle(path, Recycle::Single(cyclic.recycle), flowsheet)?;
            if network.is_empty() {
                // Every path from the feedstock closed a loop
                network = recycle_network;
            } else {
                network.join_recycle_network(recycle_network)?;
            }
        }

        ends.extend(network.streams(flowsheet));
        for &feed in feeds {
            let sink = feed.sink(flowsheet);
            if feed.stream().is_some_and(|s| ends.contains(&s))
                || sink.is_some_and(|u| flowsheet.is_facility(u))
            {
                debug!(?feed, "feed already covered or feeds a facility; skipped");
                continue;
            }
            let downstream = self.from_feedstock(feed, &[], &ends)?;
            let new_streams = downstream.streams(flowsheet);
            let connecting_units: HashSet<UnitId> = ends
                .intersection(&new_streams)
                .filter(|&&s| flowsheet.source(s).is_some() && !self.disjunctions.contains(&s))
                .filter_map(|&s| flowsheet.sink(s))
                .filter(|u| self.units.contains(u))
                .collect();
            ends.extend(new_streams);

            let connections: Vec<UnitId> = connecting_units.iter().copied().collect();
            let unit = match connections[..] {
                [] => {
                    debug!(?feed, "independent feed network appended");
                    network.append_network(downstream);
                    continue;
                }
                [unit] => unit,
                _ => network.first_unit(&connecting_units)?,
            };
            debug!(?feed, ?unit, connections = connections.len(), "feed network joined");
            network.join_network_at_unit(downstream, unit)?;
        }

        recycle_ends.extend(network.get_all_recycles());
        let members = network.flattened();
        recycle_ends.extend(flowsheet.products_from_units(&members));
        network.sort_bounded(flowsheet, &recycle_ends, self.options.max_sort_passes);
        if self.options.pair_heat_exchangers {
            network.add_process_heat_exchangers(flowsheet);
        }
        if self.options.reduce_recycles {
            network.reduce_recycles(flowsheet);
        }
        Ok(network)
    }
}
