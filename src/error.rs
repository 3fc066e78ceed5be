//! Error taxonomy for topology construction.
//!
//! Every failure is fatal for the topology being built: a builder either
//! returns a validated [`Topology`](crate::topology::Topology) or one of
//! these errors, never a partially built graph.

use std::path::PathBuf;

use crate::topology::types::{NodeId, Role};

/// Errors raised while parsing, assembling or validating a topology
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    /// Parse failure, connectivity failure or structurally unusable graph
    #[error("Malformed topology: {0}")]
    MalformedTopology(String),

    /// Nodes left without a role when the topology was validated
    #[error("Nodes without a role: {}", format_ids(.nodes))]
    MissingRole { nodes: Vec<NodeId> },

    /// A node was assigned a second role
    #[error("Conflicting role for node {node}: already {existing}, requested {requested}")]
    ConflictingRole {
        node: NodeId,
        existing: Role,
        requested: Role,
    },

    /// A candidate list names a node that is not a router
    #[error("Invalid cache candidate {node}: {reason}")]
    InvalidCandidate { node: NodeId, reason: String },

    /// Registry miss
    #[error("Unknown topology family '{0}'")]
    UnknownTopology(String),

    /// Parameter out of its declared range or of the wrong type
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A dataset file could not be read
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, TopologyError>;

impl TopologyError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedTopology(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

fn format_ids(nodes: &[NodeId]) -> String {
    nodes
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
