//! ft-core: stable foundation for flowtopo.
//!
//! Contains:
//! - ids (stable compact IDs for units and streams)
//! - error (shared error types)

pub mod error;
pub mod ids;

// Re-exports: nice ergonomics for downstream crates
pub use error::{FtError, FtResult};
pub use ids::*;
