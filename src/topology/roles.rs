//! Role assignment and role completeness checks.

use crate::error::{Result, TopologyError};
use crate::graph::Graph;
use crate::topology::types::{NodeId, Role};

/// Give `id` its role; each node gets exactly one
pub fn assign_role(graph: &mut Graph, id: &NodeId, role: Role) -> Result<()> {
    let record = graph
        .node_mut(id)
        .ok_or_else(|| TopologyError::malformed(format!("cannot assign {} to unknown node {}", role, id)))?;
    match record.role {
        Some(existing) => Err(TopologyError::ConflictingRole {
            node: id.clone(),
            existing,
            requested: role,
        }),
        None => {
            record.role = Some(role);
            Ok(())
        }
    }
}

/// Fail with every node that still lacks a role
pub fn validate(graph: &Graph) -> Result<()> {
    let missing: Vec<NodeId> = graph
        .nodes()
        .filter(|n| n.role().is_none())
        .map(|n| n.id.clone())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(TopologyError::MissingRole { nodes: missing })
    }
}

/// Ids holding `role`, in insertion order
pub fn nodes_with_role(graph: &Graph, role: Role) -> Vec<NodeId> {
    graph
        .nodes()
        .filter(|n| n.role() == Some(role))
        .map(|n| n.id.clone())
        .collect()
}
