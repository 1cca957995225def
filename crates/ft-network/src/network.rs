//! The nested network structure produced by resolution.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use ft_core::{StreamId, UnitId};
use ft_graph::Flowsheet;

use crate::error::{NetworkError, NetworkResult};
use crate::recycle::Recycle;

/// One step of a network path: a unit, or a nested network run as a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Unit(UnitId),
    Network(Network),
}

impl Element {
    /// Whether this element is, or contains, `unit`.
    pub fn contains_unit(&self, unit: UnitId) -> bool {
        match self {
            Element::Unit(u) => *u == unit,
            Element::Network(n) => n.units.contains(&unit),
        }
    }

    pub(crate) fn is_unit_in(&self, units: &HashSet<UnitId>) -> bool {
        matches!(self, Element::Unit(u) if units.contains(u))
    }

    pub fn as_unit(&self) -> Option<UnitId> {
        match self {
            Element::Unit(u) => Some(*u),
            Element::Network(_) => None,
        }
    }

    pub fn as_network(&self) -> Option<&Network> {
        match self {
            Element::Unit(_) => None,
            Element::Network(n) => Some(n),
        }
    }
}

impl From<UnitId> for Element {
    fn from(unit: UnitId) -> Self {
        Element::Unit(unit)
    }
}

impl From<Network> for Element {
    fn from(network: Network) -> Self {
        Element::Network(network)
    }
}

/// An ordered path of units and nested networks, optionally converged against recycle streams.
///
/// Evaluated top to bottom: a linear network runs its path once, a cyclic one
/// iterates its path until its recycle stream(s) converge.
///
/// `units` always equals the flattened set of units in `path`. Each nested
/// network is owned by exactly one parent.
#[derive(Debug, Clone, Default)]
pub struct Network {
    pub(crate) path: Vec<Element>,
    pub(crate) units: HashSet<UnitId>,
    pub(crate) recycle: Recycle,
    pub(crate) recycle_sink: Option<UnitId>,
}

impl Network {
    /// A linear network over `path`.
    pub fn new(path: Vec<Element>) -> Self {
        let units = nested_network_units(&path);
        Self {
            path,
            units,
            recycle: Recycle::None,
            recycle_sink: None,
        }
    }

    /// A network over `path` converged against `recycle`.
    pub fn with_recycle(
        path: Vec<Element>,
        recycle: Recycle,
        flowsheet: &Flowsheet,
    ) -> NetworkResult<Self> {
        let recycle_sink = recycle.sink(flowsheet)?;
        let mut network = Self::new(path);
        network.recycle = recycle;
        network.recycle_sink = recycle_sink;
        Ok(network)
    }

    pub fn path(&self) -> &[Element] {
        &self.path
    }

    pub fn units(&self) -> &HashSet<UnitId> {
        &self.units
    }

    pub fn recycle(&self) -> &Recycle {
        &self.recycle
    }

    pub fn recycle_sink(&self) -> Option<UnitId> {
        self.recycle_sink
    }

    pub fn is_cyclic(&self) -> bool {
        self.recycle.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn is_disjoint(&self, other: &Network) -> bool {
        self.units.is_disjoint(&other.units)
    }

    /// Nested networks directly in this path.
    pub fn subnetworks(&self) -> impl Iterator<Item = &Network> {
        self.path.iter().filter_map(Element::as_network)
    }

    /// Every recycle stream in this network and its nested networks.
    pub fn get_all_recycles(&self) -> BTreeSet<StreamId> {
        let mut all = BTreeSet::new();
        self.collect_recycles(&mut all);
        all
    }

    fn collect_recycles(&self, all: &mut BTreeSet<StreamId>) {
        all.extend(self.recycle.streams());
        for nested in self.subnetworks() {
            nested.collect_recycles(all);
        }
    }

    /// Every inlet and outlet stream of the member units.
    pub fn streams(&self, flowsheet: &Flowsheet) -> HashSet<StreamId> {
        flowsheet.streams_from_units(&self.units)
    }

    /// First of `units` met walking the path in order, descending into nested networks.
    pub fn first_unit(&self, units: &HashSet<UnitId>) -> NetworkResult<UnitId> {
        for item in &self.path {
            match item {
                Element::Network(n) if !n.units.is_disjoint(units) => return n.first_unit(units),
                Element::Unit(u) if units.contains(u) => return Ok(*u),
                _ => {}
            }
        }
        Err(NetworkError::UnitsNotFound)
    }

    /// Units in evaluation order, flattened.
    pub fn flattened(&self) -> Vec<UnitId> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<UnitId>) {
        for item in &self.path {
            match item {
                Element::Unit(u) => out.push(*u),
                Element::Network(n) => n.flatten_into(out),
            }
        }
    }

    /// Whether the cached unit set matches the path, at every nesting depth.
    pub fn units_consistent(&self) -> bool {
        nested_network_units(&self.path) == self.units
            && self.subnetworks().all(Network::units_consistent)
    }

    /// Render the structure with unit names from the flowsheet.
    pub fn display<'a>(&'a self, flowsheet: &'a Flowsheet) -> NetworkDisplay<'a> {
        NetworkDisplay {
            network: self,
            flowsheet,
        }
    }
}

/// Two networks are equal when their paths and recycles are.
impl PartialEq for Network {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.recycle == other.recycle
    }
}

impl Eq for Network {}

impl From<Vec<UnitId>> for Network {
    fn from(path: Vec<UnitId>) -> Self {
        Network::new(path.into_iter().map(Element::Unit).collect())
    }
}

fn nested_network_units(path: &[Element]) -> HashSet<UnitId> {
    let mut units = HashSet::new();
    for item in path {
        match item {
            Element::Unit(u) => {
                units.insert(*u);
            }
            Element::Network(n) => units.extend(n.units.iter().copied()),
        }
    }
    units
}

pub struct NetworkDisplay<'a> {
    network: &'a Network,
    flowsheet: &'a Flowsheet,
}

impl NetworkDisplay<'_> {
    fn info(&self, network: &Network, indent: &str) -> String {
        let indent = format!("{indent}    ");
        let end = format!(",\n{indent}");
        let items: Vec<String> = network
            .path
            .iter()
            .map(|item| match item {
                Element::Network(n) => self.info(n, &indent),
                Element::Unit(u) => self
                    .flowsheet
                    .unit(*u)
                    .map_or_else(|| u.to_string(), |unit| unit.name.clone()),
            })
            .collect();

        let mut info = format!("Network(\n{indent}[{}]", items.join(&format!("{end} ")));
        if network.is_cyclic() {
            info.push_str(&format!(
                "{end}recycle={})",
                network.recycle.display(self.flowsheet)
            ));
        } else {
            info.push(')');
        }
        info
    }
}

impl fmt::Display for NetworkDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.info(self.network, ""))
    }
}
