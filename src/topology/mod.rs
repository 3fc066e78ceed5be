//! ICN topology module.
//!
//! This module contains the node and link vocabulary, role assignment, the
//! two-phase builder and the frozen topology consumed by the simulator.

pub mod builder;
pub mod model;
pub mod roles;
pub mod types;

// Re-export key types for easier access
pub use builder::TopologyBuilder;
pub use model::{LinkSnapshot, NodeSnapshot, Topology, TopologySnapshot};
pub use types::{LinkType, NodeId, Role};
