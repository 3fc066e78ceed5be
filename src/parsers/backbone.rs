//! Real-backbone importer (GEANT, GARR, WIDE, Tiscali, ...).

use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TopologyError};
use crate::graph::Graph;
use crate::links::{self, DelayUnit, Links};
use crate::topology::builder::TopologyBuilder;
use crate::topology::types::{NodeId, Role};

/// Which backbone nodes get a synthetic receiver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiverPlacement {
    /// Every node of the main component
    #[default]
    All,
    /// Degree-1 nodes only
    Leaves,
}

impl FromStr for ReceiverPlacement {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ReceiverPlacement::All),
            "leaves" | "leafs" => Ok(ReceiverPlacement::Leaves),
            other => Err(TopologyError::config(format!(
                "receivers must be 'all' or 'leaves', got '{}'",
                other
            ))),
        }
    }
}

/// First node with the strictly highest degree
pub fn highest_degree_node(graph: &Graph) -> Option<&NodeId> {
    let mut best: Option<(&NodeId, usize)> = None;
    for id in graph.node_ids() {
        let degree = graph.degree(id);
        if best.map_or(true, |(_, d)| degree > d) {
            best = Some((id, degree));
        }
    }
    best.map(|(id, _)| id)
}

/// Attach one source and a set of receivers to a backbone graph
///
/// The graph is restricted to its largest component. One source hangs off
/// the highest-degree node and receivers hang off every node (or every
/// degree-1 node). Synthetic ids start at the dataset's id offset: sources
/// at `offset + n`, receivers at `2 * offset + n`. All links get `delay`
/// milliseconds and weight 1.
pub fn import_backbone(
    name: &str,
    graph: &Graph,
    placement: ReceiverPlacement,
    delay: f64,
) -> Result<TopologyBuilder> {
    let mut graph = super::main_component(graph, name)?;
    let routers: Vec<NodeId> = graph.node_ids().cloned().collect();

    let attachments: Vec<NodeId> = match placement {
        ReceiverPlacement::All => routers.clone(),
        ReceiverPlacement::Leaves => routers
            .iter()
            .filter(|r| graph.degree(r) == 1)
            .cloned()
            .collect(),
    };
    if attachments.is_empty() {
        return Err(TopologyError::malformed(format!(
            "{}: no degree-1 node to attach receivers to",
            name
        )));
    }
    let hub = highest_degree_node(&graph)
        .cloned()
        .ok_or_else(|| TopologyError::malformed(format!("{}: empty graph", name)))?;

    let offset = super::synthetic_offset(&graph)?;
    let source = super::attached_id(&hub, offset, "src");
    graph.add_edge(source.clone(), hub.clone())?;
    graph.add_node(source.clone()).synthetic = true;

    let mut receivers = Vec::with_capacity(attachments.len());
    for node in &attachments {
        let receiver = super::attached_id(node, 2 * offset, "rec");
        graph.add_edge(receiver.clone(), node.clone())?;
        graph.add_node(receiver.clone()).synthetic = true;
        receivers.push(receiver);
    }

    links::set_weights_constant(&mut graph, 1.0, Links::All)?;
    links::set_delays_constant(&mut graph, delay, DelayUnit::Milliseconds, Links::All)?;
    debug!(
        "{}: source {} on node {} (degree {}), {} receivers",
        name,
        source,
        hub,
        graph.degree(&hub) - 1,
        receivers.len()
    );

    let mut builder = TopologyBuilder::from_graph(name, graph);
    builder.assign_role(source, Role::Source)?;
    builder.assign_roles(receivers, Role::Receiver)?;
    builder.assign_roles(routers, Role::Router)?;
    Ok(builder)
}
