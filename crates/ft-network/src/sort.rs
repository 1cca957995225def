//! Ordering pass: producers before consumers within each network level.

use std::collections::HashSet;
use std::mem;

use ft_core::{StreamId, UnitId};
use ft_graph::Flowsheet;
use tracing::warn;

use crate::network::{Element, Network};

/// A path element paired with every unit downstream of it.
struct PathSource {
    position: usize,
    source: Element,
    downstream: HashSet<UnitId>,
}

impl PathSource {
    fn new(
        position: usize,
        source: Element,
        flowsheet: &Flowsheet,
        ends: &HashSet<StreamId>,
    ) -> Self {
        let downstream = match &source {
            Element::Unit(u) => flowsheet.downstream_units(*u, ends, false),
            Element::Network(n) => n
                .units()
                .iter()
                .flat_map(|&u| flowsheet.downstream_units(u, ends, false))
                .collect(),
        };
        Self {
            position,
            source,
            downstream,
        }
    }

    /// Whether this element is reached from `other`.
    fn downstream_from(&self, other: &PathSource) -> bool {
        match &self.source {
            Element::Unit(u) => other.downstream.contains(u),
            Element::Network(n) => n.units().iter().any(|u| other.downstream.contains(u)),
        }
    }
}

impl Network {
    /// Reorder every level so upstream elements come first, innermost levels first.
    ///
    /// Reach is computed without crossing streams in `ends`. Each level gets at most
    /// N² passes for N elements. Returns `false` when some level did not settle; that
    /// level keeps its input order.
    pub fn sort(&mut self, flowsheet: &Flowsheet, ends: &HashSet<StreamId>) -> bool {
        self.sort_bounded(flowsheet, ends, None)
    }

    /// [`Network::sort`] with an explicit pass budget per level.
    pub fn sort_bounded(
        &mut self,
        flowsheet: &Flowsheet,
        ends: &HashSet<StreamId>,
        max_passes: Option<usize>,
    ) -> bool {
        let mut settled = true;
        for item in &mut self.path {
            if let Element::Network(nested) = item {
                settled &= nested.sort_bounded(flowsheet, ends, max_passes);
            }
        }

        let mut sources: Vec<PathSource> = mem::take(&mut self.path)
            .into_iter()
            .enumerate()
            .map(|(position, item)| PathSource::new(position, item, flowsheet, ends))
            .collect();
        let n = sources.len();
        let passes = max_passes.unwrap_or(n * n);

        let mut level_settled = n <= 1;
        for _ in 0..passes {
            if relocation_pass(&mut sources) {
                level_settled = true;
                break;
            }
        }
        if !level_settled {
            warn!(elements = n, passes, "network path could not be determined");
            sources.sort_by_key(|s| s.position);
        }

        self.path = sources.into_iter().map(|s| s.source).collect();
        settled && level_settled
    }
}

/// One scan over all pairs; returns `true` if nothing moved.
fn relocation_pass(sources: &mut Vec<PathSource>) -> bool {
    let n = sources.len();
    let mut stop = true;
    for i in 0..n.saturating_sub(1) {
        for j in i + 1..n {
            if sources[i].downstream_from(&sources[j]) {
                let upstream = sources.remove(j);
                sources.insert(i, upstream);
                stop = false;
            }
        }
    }
    stop
}
