//! Recycle stream markings of a network.

use std::collections::BTreeSet;
use std::fmt;

use ft_core::{StreamId, UnitId};
use ft_graph::Flowsheet;

use crate::error::{NetworkError, NetworkResult};

/// Feedback stream(s) a cyclic network converges against.
///
/// `Multi` holds at least two streams; unions that collapse to one stream
/// normalize back to `Single`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Recycle {
    #[default]
    None,
    Single(StreamId),
    Multi(BTreeSet<StreamId>),
}

impl Recycle {
    /// Build a recycle from any number of streams.
    pub fn from_streams(streams: impl IntoIterator<Item = StreamId>) -> Self {
        Self::normalized(streams.into_iter().collect())
    }

    fn normalized(mut set: BTreeSet<StreamId>) -> Self {
        match set.len() {
            0 => Recycle::None,
            1 => set.pop_first().map_or(Recycle::None, Recycle::Single),
            _ => Recycle::Multi(set),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Recycle::None)
    }

    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Number of streams marked.
    pub fn len(&self) -> usize {
        match self {
            Recycle::None => 0,
            Recycle::Single(_) => 1,
            Recycle::Multi(set) => set.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, stream: StreamId) -> bool {
        match self {
            Recycle::None => false,
            Recycle::Single(s) => *s == stream,
            Recycle::Multi(set) => set.contains(&stream),
        }
    }

    /// Marked streams in ascending ID order.
    pub fn streams(&self) -> Vec<StreamId> {
        match self {
            Recycle::None => Vec::new(),
            Recycle::Single(s) => vec![*s],
            Recycle::Multi(set) => set.iter().copied().collect(),
        }
    }

    fn check_shape(&self) -> NetworkResult<()> {
        match self {
            Recycle::Multi(set) if set.len() < 2 => Err(NetworkError::InvalidRecycle {
                what: "a recycle set needs at least two streams",
            }),
            _ => Ok(()),
        }
    }

    /// Union `other` into this marking.
    ///
    /// Idempotent: re-adding a stream already marked is a no-op.
    pub fn union(&mut self, other: Recycle) -> NetworkResult<()> {
        self.check_shape()?;
        other.check_shape()?;
        let merged = match (std::mem::take(self), other) {
            (current, Recycle::None) => current,
            (Recycle::None, incoming) => incoming,
            (Recycle::Single(a), Recycle::Single(b)) if a == b => Recycle::Single(a),
            (Recycle::Single(a), Recycle::Single(b)) => Recycle::Multi(BTreeSet::from([a, b])),
            (Recycle::Single(a), Recycle::Multi(mut set))
            | (Recycle::Multi(mut set), Recycle::Single(a)) => {
                set.insert(a);
                Recycle::Multi(set)
            }
            (Recycle::Multi(mut set), Recycle::Multi(more)) => {
                set.extend(more);
                Recycle::Multi(set)
            }
        };
        *self = merged;
        Ok(())
    }

    /// The unit consuming the marked stream(s).
    ///
    /// Every stream of a set must share one sink.
    pub fn sink(&self, flowsheet: &Flowsheet) -> NetworkResult<Option<UnitId>> {
        self.check_shape()?;
        let mut sink = None;
        for stream in self.streams() {
            flowsheet
                .stream(stream)
                .ok_or(ft_graph::GraphError::StreamNotFound { stream })?;
            let found = flowsheet
                .sink(stream)
                .ok_or(NetworkError::MissingSink { stream })?;
            match sink {
                None => sink = Some(found),
                Some(expected) if expected != found => {
                    return Err(NetworkError::RecycleSinkMismatch { expected, found });
                }
                Some(_) => {}
            }
        }
        Ok(sink)
    }

    /// Render the marking with stream labels from the flowsheet.
    pub fn display<'a>(&'a self, flowsheet: &'a Flowsheet) -> RecycleDisplay<'a> {
        RecycleDisplay {
            recycle: self,
            flowsheet,
        }
    }
}

/// Label a stream by its origin: `<source name>-<outlet index>`, or its own name for feeds.
pub(crate) fn stream_label(flowsheet: &Flowsheet, stream: StreamId) -> String {
    match flowsheet.outlet_port(stream) {
        Ok(port) => {
            let source = flowsheet
                .unit(port.source)
                .map_or_else(|| port.source.to_string(), |u| u.name.clone());
            format!("{}-{}", source, port.index)
        }
        Err(_) => flowsheet
            .stream(stream)
            .map_or_else(|| stream.to_string(), |s| s.name.clone()),
    }
}

pub struct RecycleDisplay<'a> {
    recycle: &'a Recycle,
    flowsheet: &'a Flowsheet,
}

impl fmt::Display for RecycleDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.recycle {
            Recycle::None => write!(f, "None"),
            Recycle::Single(s) => write!(f, "{}", stream_label(self.flowsheet, *s)),
            Recycle::Multi(set) => {
                let labels: Vec<String> = set
                    .iter()
                    .map(|s| stream_label(self.flowsheet, *s))
                    .collect();
                write!(f, "[{}]", labels.join(", "))
            }
        }
    }
}
