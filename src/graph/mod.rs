//! Minimal graph store used by every topology builder.

pub mod algorithms;
pub mod store;

pub use store::{Graph, Link, NodeRecord};
