//! Path enumeration and reduction.
//!
//! A depth-first walk from a feed splits everything reachable into linear
//! (cycle-free) paths and cycle-closing paths paired with the stream that closes
//! them. Linear paths are then reduced to a disjoint covering set ready for
//! incremental network assembly.

use std::cmp::Reverse;
use std::collections::HashSet;

use ft_core::{StreamId, UnitId};
use ft_graph::Flowsheet;

/// Ordered units along a path; no unit repeats within one enumerated path.
pub type Path = Vec<UnitId>;

/// Where a traversal starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    /// A real stream entering the units of interest.
    Stream(StreamId),
    /// Synthetic boundary inlet for a unit that has no inlet streams.
    Missing(UnitId),
}

impl Feed {
    pub fn stream(self) -> Option<StreamId> {
        match self {
            Feed::Stream(s) => Some(s),
            Feed::Missing(_) => None,
        }
    }

    pub fn sink(self, flowsheet: &Flowsheet) -> Option<UnitId> {
        match self {
            Feed::Stream(s) => flowsheet.sink(s),
            Feed::Missing(u) => Some(u),
        }
    }
}

/// A loop: units from the re-entered unit onward, and the stream closing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclicPath {
    pub path: Path,
    pub recycle: StreamId,
}

/// Raw traversal output before reduction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPaths {
    /// Paths ending at a boundary, a dead end, or an end stream.
    pub linear: Vec<Path>,
    /// Full traversal paths paired with the stream that closes a cycle.
    pub with_recycle: Vec<(Path, StreamId)>,
}

/// Depth-first path enumerator.
///
/// `ends` grows as closing streams are found, so later branches stop at the
/// same closure point.
pub struct PathSearch<'a> {
    flowsheet: &'a Flowsheet,
    ends: &'a mut HashSet<StreamId>,
    units: &'a HashSet<UnitId>,
    disjunctions: &'a HashSet<StreamId>,
    found: RawPaths,
}

impl<'a> PathSearch<'a> {
    pub fn new(
        flowsheet: &'a Flowsheet,
        ends: &'a mut HashSet<StreamId>,
        units: &'a HashSet<UnitId>,
        disjunctions: &'a HashSet<StreamId>,
    ) -> Self {
        Self {
            flowsheet,
            ends,
            units,
            disjunctions,
            found: RawPaths::default(),
        }
    }

    /// Enumerate every path reachable from `feed`.
    pub fn run(mut self, feed: Feed) -> RawPaths {
        let sink = feed.sink(self.flowsheet);
        self.fill_path(feed.stream(), sink, Vec::new());
        self.found
    }

    fn fill_path(&mut self, stream: Option<StreamId>, unit: Option<UnitId>, mut path: Path) {
        let flowsheet = self.flowsheet;

        // Some(false): stop here without a loop; Some(true): close onto an existing loop
        let mut has_recycle = None;
        if let Some(s) = stream {
            if self.disjunctions.contains(&s) {
                has_recycle = Some(false);
            } else if self.ends.contains(&s) {
                has_recycle = Some(
                    unit.is_some_and(|u| path.contains(&u))
                        && self
                            .found
                            .with_recycle
                            .iter()
                            .any(|(_, recycle)| flowsheet.sink(*recycle) == unit),
                );
            }
        }

        let unit = match unit {
            Some(u)
                if has_recycle != Some(false)
                    && !flowsheet.is_facility(u)
                    && self.units.contains(&u) =>
            {
                u
            }
            _ => {
                self.found.linear.push(path);
                return;
            }
        };

        if let Some(s) = stream {
            if has_recycle == Some(true) || path.contains(&unit) {
                self.found.with_recycle.push((path, s));
                self.ends.insert(s);
                return;
            }
        }

        path.push(unit);
        let outs = flowsheet.unit(unit).map_or(&[][..], |u| u.outs());
        match outs.split_first() {
            Some((&first, others)) => {
                for &outlet in others {
                    self.fill_path(Some(outlet), flowsheet.sink(outlet), path.clone());
                }
                self.fill_path(Some(first), flowsheet.sink(first), path);
            }
            None => self.found.linear.push(path),
        }
    }
}

/// Enumerate from `feed`, then reduce linear paths and cut cyclic paths down to their loops.
///
/// Loops come back longest first.
pub fn find_linear_and_cyclic_paths(
    flowsheet: &Flowsheet,
    feed: Feed,
    ends: &mut HashSet<StreamId>,
    units: &HashSet<UnitId>,
    disjunctions: &HashSet<StreamId>,
) -> (Vec<Path>, Vec<CyclicPath>) {
    let raw = PathSearch::new(flowsheet, ends, units, disjunctions).run(feed);
    let mut cyclic: Vec<CyclicPath> = raw
        .with_recycle
        .into_iter()
        .map(|(path, recycle)| to_cyclic_path(flowsheet, path, recycle))
        .collect();
    cyclic.sort_by_key(|c| Reverse(c.path.len()));
    (simplified_linear_paths(flowsheet, raw.linear), cyclic)
}

fn to_cyclic_path(flowsheet: &Flowsheet, mut path: Path, recycle: StreamId) -> CyclicPath {
    let start = flowsheet
        .sink(recycle)
        .and_then(|sink| path.iter().position(|&u| u == sink))
        .unwrap_or(0);
    CyclicPath {
        path: path.split_off(start),
        recycle,
    }
}

/// Reduce overlapping linear paths to a disjoint covering set.
///
/// Shorter paths give up every unit a longer path also visits, then get the
/// outlets of their last unit that lead back into the covered set reattached.
/// The result is ordered longest first.
pub fn simplified_linear_paths(flowsheet: &Flowsheet, mut paths: Vec<Path>) -> Vec<Path> {
    if paths.is_empty() {
        return paths;
    }
    paths.sort_by_key(Vec::len);
    let sets: Vec<HashSet<UnitId>> = paths
        .iter()
        .map(|p| p.iter().copied().collect())
        .collect();
    let covered: HashSet<UnitId> = sets.iter().flatten().copied().collect();

    let mut simplified = Vec::with_capacity(paths.len());
    for (i, mut path) in paths.into_iter().enumerate() {
        let longer = &sets[i + 1..];
        path.retain(|u| !longer.iter().any(|set| set.contains(u)));
        if let Some(&last) = path.last() {
            add_back_ends(flowsheet, &mut path, last, &covered);
            simplified.push(path);
        }
    }
    simplified.reverse();
    simplified
}

fn add_back_ends(
    flowsheet: &Flowsheet,
    path: &mut Path,
    last: UnitId,
    covered: &HashSet<UnitId>,
) {
    let Some(unit) = flowsheet.unit(last) else {
        return;
    };
    for &outlet in unit.outs() {
        // A sink already on the path would only close a loop
        if let Some(sink) = flowsheet
            .sink(outlet)
            .filter(|s| covered.contains(s) && !path.contains(s))
        {
            path.push(sink);
        }
    }
}
