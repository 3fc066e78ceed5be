//! Two-phase topology construction.
//!
//! A [`TopologyBuilder`] owns a mutable graph while nodes, links and roles
//! are assembled. [`TopologyBuilder::finish`] consumes it, checks every
//! invariant, isolates sources, selects cache candidates and returns the
//! frozen [`Topology`]. Nothing is returned when any step fails.

use log::info;

use crate::candidates::CandidatePolicy;
use crate::error::{Result, TopologyError};
use crate::graph::Graph;
use crate::links::{self, SOURCE_WEIGHT_FACTOR};
use crate::topology::model::Topology;
use crate::topology::roles;
use crate::topology::types::{NodeId, Role};

#[derive(Debug, Clone)]
pub struct TopologyBuilder {
    name: String,
    graph: Graph,
}

impl TopologyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_graph(name, Graph::new())
    }

    pub fn from_graph(name: impl Into<String>, graph: Graph) -> Self {
        Self {
            name: name.into(),
            graph,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn assign_role(&mut self, id: impl Into<NodeId>, role: Role) -> Result<()> {
        roles::assign_role(&mut self.graph, &id.into(), role)
    }

    pub fn assign_roles<I, T>(&mut self, ids: I, role: Role) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        for id in ids {
            self.assign_role(id, role)?;
        }
        Ok(())
    }

    /// Give `role` to every node that has none yet
    pub fn assign_remaining(&mut self, role: Role) -> Result<()> {
        let pending: Vec<NodeId> = self
            .graph
            .nodes()
            .filter(|n| n.role().is_none())
            .map(|n| n.id.clone())
            .collect();
        self.assign_roles(pending, role)
    }

    pub fn nodes_with_role(&self, role: Role) -> Vec<NodeId> {
        roles::nodes_with_role(&self.graph, role)
    }

    /// Validate, isolate sources, select candidates and freeze
    pub fn finish(mut self, policy: &CandidatePolicy) -> Result<Topology> {
        if self.graph.node_count() < 2 || self.graph.edge_count() == 0 {
            return Err(TopologyError::malformed(format!(
                "{}: topology needs at least 2 nodes and one link",
                self.name
            )));
        }
        roles::validate(&self.graph)?;
        for required in [Role::Source, Role::Receiver] {
            if !self.graph.nodes().any(|n| n.role() == Some(required)) {
                return Err(TopologyError::malformed(format!(
                    "{}: topology has no {} node",
                    self.name, required
                )));
            }
        }

        links::isolate_sources(&mut self.graph, SOURCE_WEIGHT_FACTOR);
        links::validate_links(&self.graph)?;

        let candidates = policy.select(&self.graph)?;

        let topology = Topology::new(self.name, self.graph, candidates);
        info!(
            "Built topology {}: {} nodes, {} links, {} sources, {} receivers, {} cache candidates",
            topology.name(),
            topology.node_count(),
            topology.edge_count(),
            topology.sources().len(),
            topology.receivers().len(),
            topology.icr_candidates().len()
        );
        Ok(topology)
    }
}
