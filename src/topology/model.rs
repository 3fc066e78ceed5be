//! The frozen ICN topology handed to the simulation engine.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::{Result, TopologyError};
use crate::graph::{Graph, Link};
use crate::topology::types::{LinkType, NodeId, Role};

/// A validated topology
///
/// The node and link sets cannot change once built. The only mutable state
/// is the cache size annotation written by a placement algorithm, and it is
/// restricted to cache candidates. Clone the topology to give each
/// experiment worker its own instance.
#[derive(Debug, Clone)]
pub struct Topology {
    name: String,
    graph: Graph,
    icr_candidates: BTreeSet<NodeId>,
    cache_sizes: BTreeMap<NodeId, u64>,
}

impl Topology {
    pub(crate) fn new(name: String, graph: Graph, icr_candidates: BTreeSet<NodeId>) -> Self {
        Self {
            name,
            graph,
            icr_candidates,
            cache_sizes: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read-only view of the underlying graph
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn role(&self, id: &NodeId) -> Option<Role> {
        self.graph.node(id).and_then(|n| n.role())
    }

    pub fn nodes_with_role(&self, role: Role) -> BTreeSet<NodeId> {
        self.graph
            .nodes()
            .filter(|n| n.role() == Some(role))
            .map(|n| n.id.clone())
            .collect()
    }

    pub fn sources(&self) -> BTreeSet<NodeId> {
        self.nodes_with_role(Role::Source)
    }

    pub fn receivers(&self) -> BTreeSet<NodeId> {
        self.nodes_with_role(Role::Receiver)
    }

    pub fn routers(&self) -> BTreeSet<NodeId> {
        self.nodes_with_role(Role::Router)
    }

    pub fn gateways(&self) -> BTreeSet<NodeId> {
        self.nodes_with_role(Role::Gateway)
    }

    /// Routers that may host a cache
    pub fn icr_candidates(&self) -> &BTreeSet<NodeId> {
        &self.icr_candidates
    }

    /// Nodes with a cache deployed, mapped to their cache size
    pub fn cache_nodes(&self) -> &BTreeMap<NodeId, u64> {
        &self.cache_sizes
    }

    /// Record the cache size a placement algorithm chose for `node`
    pub fn assign_cache(&mut self, node: &NodeId, size: u64) -> Result<()> {
        if !self.icr_candidates.contains(node) {
            let reason = match self.role(node) {
                Some(Role::Router) => "router is not a cache candidate".to_string(),
                Some(role) => format!("node is a {}", role),
                None => "node is not in the topology".to_string(),
            };
            return Err(TopologyError::InvalidCandidate {
                node: node.clone(),
                reason,
            });
        }
        self.cache_sizes.insert(node.clone(), size);
        Ok(())
    }

    /// Drop every cache size annotation
    pub fn clear_caches(&mut self) {
        self.cache_sizes.clear();
    }

    pub fn link(&self, u: &NodeId, v: &NodeId) -> Option<&Link> {
        self.graph.link(u, v)
    }

    pub fn weight(&self, u: &NodeId, v: &NodeId) -> Option<f64> {
        self.link(u, v).map(|l| l.weight)
    }

    pub fn delay(&self, u: &NodeId, v: &NodeId) -> Option<f64> {
        self.link(u, v).map(|l| l.delay)
    }

    pub fn link_type(&self, u: &NodeId, v: &NodeId) -> Option<LinkType> {
        self.link(u, v).map(|l| l.kind)
    }

    /// Serializable copy of the whole topology
    pub fn snapshot(&self) -> TopologySnapshot {
        TopologySnapshot {
            name: self.name.clone(),
            nodes: self
                .graph
                .nodes()
                .map(|n| NodeSnapshot {
                    id: n.id.clone(),
                    role: n.role(),
                    depth: n.depth,
                    synthetic: n.synthetic,
                })
                .collect(),
            links: self
                .graph
                .edges()
                .map(|(u, v, l)| LinkSnapshot {
                    u: u.clone(),
                    v: v.clone(),
                    weight: l.weight,
                    delay: l.delay,
                    kind: l.kind,
                })
                .collect(),
            icr_candidates: self.icr_candidates.clone(),
            cache_nodes: self.cache_sizes.clone(),
        }
    }
}

/// JSON view written by `icntopo build --output`
#[derive(Debug, Clone, Serialize)]
pub struct TopologySnapshot {
    pub name: String,
    pub nodes: Vec<NodeSnapshot>,
    pub links: Vec<LinkSnapshot>,
    pub icr_candidates: BTreeSet<NodeId>,
    pub cache_nodes: BTreeMap<NodeId, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    pub synthetic: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkSnapshot {
    pub u: NodeId,
    pub v: NodeId,
    pub weight: f64,
    pub delay: f64,
    #[serde(rename = "type")]
    pub kind: LinkType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::CandidatePolicy;
    use crate::topology::builder::TopologyBuilder;

    fn small() -> Topology {
        let mut b = TopologyBuilder::new("small");
        b.graph_mut().add_path([0u64, 1, 2, 3]).unwrap();
        b.assign_role(0u64, Role::Receiver).unwrap();
        b.assign_role(3u64, Role::Source).unwrap();
        b.assign_role(1u64, Role::Router).unwrap();
        b.assign_role(2u64, Role::Gateway).unwrap();
        b.finish(&CandidatePolicy::AllRouters).unwrap()
    }

    #[test]
    fn test_role_queries() {
        let t = small();
        assert_eq!(t.sources().len(), 1);
        assert_eq!(t.receivers().into_iter().next(), Some(NodeId::Num(0)));
        assert_eq!(t.gateways().len(), 1);
        assert_eq!(t.role(&NodeId::Num(1)), Some(Role::Router));
        assert_eq!(t.role(&NodeId::Num(9)), None);
    }

    #[test]
    fn test_assign_cache_only_on_candidates() {
        let mut t = small();
        t.assign_cache(&NodeId::Num(1), 100).unwrap();
        assert_eq!(t.cache_nodes().get(&NodeId::Num(1)), Some(&100));

        let err = t.assign_cache(&NodeId::Num(2), 10).unwrap_err();
        assert!(err.to_string().contains("gateway"));
        assert!(t.assign_cache(&NodeId::Num(42), 10).is_err());

        t.clear_caches();
        assert!(t.cache_nodes().is_empty());
    }

    #[test]
    fn test_clones_are_independent() {
        let t = small();
        let mut worker = t.clone();
        worker.assign_cache(&NodeId::Num(1), 5).unwrap();
        assert!(t.cache_nodes().is_empty());
    }

    #[test]
    fn test_snapshot_json() {
        let t = small();
        let json = serde_json::to_value(t.snapshot()).unwrap();
        assert_eq!(json["name"], "small");
        assert_eq!(json["nodes"].as_array().unwrap().len(), 4);
        assert_eq!(json["links"][2]["type"], "external");
        assert_eq!(json["icr_candidates"], serde_json::json!([1]));
    }
}
