//! ft-network: flowsheet decomposition into nested, ordered networks.
//!
//! Splits the units reachable from a set of feeds into linear paths and
//! recycle loops, nests the loops into a tree of `Network`s, and orders every
//! level so upstream units run before the units they feed.
//!
//! # Example
//!
//! ```
//! use ft_graph::{FlowsheetBuilder, UnitClass};
//! use ft_network::{Disjunctions, NetworkBuilder, Recycle};
//!
//! let mut builder = FlowsheetBuilder::new();
//! let pump = builder.add_unit("P1", UnitClass::Process);
//! let mixer = builder.add_unit("M1", UnitClass::Process);
//! let splitter = builder.add_unit("S1", UnitClass::Process);
//! builder.add_feed("feed", pump);
//! builder.add_stream("s1", pump, mixer);
//! builder.add_stream("s2", mixer, splitter);
//! let recycle = builder.add_stream("recycle", splitter, mixer);
//! builder.add_product("product", splitter);
//! let flowsheet = builder.build().unwrap();
//!
//! let network = NetworkBuilder::new(&flowsheet, &Disjunctions::new())
//!     .from_units(None)
//!     .unwrap();
//! let nested = network.subnetworks().next().unwrap();
//! assert_eq!(nested.recycle(), &Recycle::Single(recycle));
//! assert_eq!(network.flattened(), vec![pump, mixer, splitter]);
//! ```

pub mod builder;
pub mod disjunction;
pub mod error;
pub mod join;
pub mod network;
pub mod options;
pub mod paths;
pub mod postprocess;
pub mod recycle;
pub mod sort;

pub use builder::NetworkBuilder;
pub use disjunction::Disjunctions;
pub use error::{NetworkError, NetworkResult};
pub use network::{Element, Network, NetworkDisplay};
pub use options::NetworkOptions;
pub use paths::{CyclicPath, Feed, Path, find_linear_and_cyclic_paths, simplified_linear_paths};
pub use recycle::{Recycle, RecycleDisplay};
