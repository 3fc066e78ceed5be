//! Topology type definitions.
//!
//! Node identifiers, node roles and link classifications shared by the
//! graph store, the builders and the importers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque node identifier
///
/// Synthetic and most dataset nodes are numbered; some datasets (ISP latency
/// maps, Telstra link lists) name their routers instead. Numbers order before
/// names so mixed graphs still sort deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Num(u64),
    Name(String),
}

impl NodeId {
    /// Interpret a dataset token: all-digit tokens become numbers
    pub fn parse(token: &str) -> Self {
        match token.parse::<u64>() {
            Ok(n) => NodeId::Num(n),
            Err(_) => NodeId::Name(token.to_string()),
        }
    }

    /// Numeric value, if this is a numbered node
    pub fn as_num(&self) -> Option<u64> {
        match self {
            NodeId::Num(n) => Some(*n),
            NodeId::Name(_) => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Num(n) => write!(f, "{}", n),
            NodeId::Name(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for NodeId {
    fn from(n: u64) -> Self {
        NodeId::Num(n)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId::Name(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId::Name(s)
    }
}

/// Functional role of a node in an ICN topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Permanently stores and serves content
    Source,
    /// Issues content requests
    Receiver,
    /// Forwards requests, may host a cache
    Router,
    /// Forwards requests, never hosts a cache
    Gateway,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Source => "source",
            Role::Receiver => "receiver",
            Role::Router => "router",
            Role::Gateway => "gateway",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a link stays inside the modelled domain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    #[default]
    Internal,
    External,
}
