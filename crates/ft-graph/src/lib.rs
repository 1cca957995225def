//! ft-graph: flowsheet graph layer for flowtopo.
//!
//! Provides:
//! - Core graph data structures (Unit, Stream, OutletPort, Flowsheet)
//! - Incremental flowsheet builder with validation
//! - Reachability and boundary queries used by network resolution
//!
//! # Example
//!
//! ```
//! use ft_graph::{FlowsheetBuilder, UnitClass};
//!
//! let mut builder = FlowsheetBuilder::new();
//! let pump = builder.add_unit("P1", UnitClass::Process);
//! let tank = builder.add_unit("T1", UnitClass::Process);
//! builder.add_feed("water", pump);
//! builder.add_stream("s1", pump, tank);
//! builder.add_product("out", tank);
//! let flowsheet = builder.build().unwrap();
//!
//! assert_eq!(flowsheet.units().len(), 2);
//! assert_eq!(flowsheet.streams().len(), 3);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod query;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::FlowsheetBuilder;
pub use error::GraphError;
pub use graph::{Flowsheet, OutletPort, Stream, Unit, UnitClass};
