//! Dataset readers and real-topology importers.
//!
//! Readers turn one file format into a bare [`Graph`]; the importers in
//! [`isp`] and [`backbone`] restrict a graph to its largest component and
//! attach synthetic sources and receivers. Every path is resolved by the
//! caller against the configured resource root.

pub mod adjacency;
pub mod backbone;
pub mod cch;
pub mod connections;
pub mod gml;
pub mod isp;

use std::fs;
use std::path::Path;

use crate::error::{Result, TopologyError};
use crate::graph::Graph;
use crate::topology::types::NodeId;

pub use adjacency::{parse_adjacency_file, parse_adjacency_str};
pub use backbone::{import_backbone, ReceiverPlacement};
pub use cch::{parse_cch_file, parse_cch_str};
pub use connections::{Connection, ConnectionList};
pub use gml::{parse_gml_file, parse_gml_str, GmlGraph};
pub use isp::import_isp_latency;

/// Read a dataset file, keeping the path in the error
pub fn read_resource(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| TopologyError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Largest connected component, rejected when it cannot hold a topology
pub(crate) fn main_component(graph: &Graph, dataset: &str) -> Result<Graph> {
    let component = graph.largest_component()?;
    if component.node_count() < 2 || component.edge_count() == 0 {
        return Err(TopologyError::malformed(format!(
            "{}: largest connected component has {} node(s)",
            dataset,
            component.node_count()
        )));
    }
    if component.node_count() < graph.node_count() {
        log::debug!(
            "{}: kept {} of {} nodes in the largest component",
            dataset,
            component.node_count(),
            graph.node_count()
        );
    }
    Ok(component)
}

/// Id of a synthetic node attached to `node`
///
/// Numbered nodes map to `base + n`; named nodes get `prefix-name`.
pub(crate) fn attached_id(node: &NodeId, base: u64, prefix: &str) -> NodeId {
    match node {
        NodeId::Num(n) => NodeId::Num(base + n),
        NodeId::Name(name) => NodeId::Name(format!("{}-{}", prefix, name)),
    }
}

/// First id free for synthetic nodes in a numbered dataset
///
/// The smallest power of ten above every numeric id and above the node
/// count, never below 1000, so that `offset + i` stays readable as
/// "attached to node i" and `offset..2 * offset` holds one node per dataset
/// node. Callers allocate at most up to `10 * offset + n` with `n < offset`;
/// datasets whose ids leave no room for that fail with `MalformedTopology`.
pub fn synthetic_offset(graph: &Graph) -> Result<u64> {
    let max = graph
        .node_ids()
        .filter_map(|id| id.as_num())
        .max()
        .unwrap_or(0)
        .max(graph.node_count() as u64);
    let mut offset = 1000u64;
    while offset <= max {
        offset = offset.checked_mul(10).ok_or_else(|| id_space_exhausted(max))?;
    }
    if offset.checked_mul(11).is_none() {
        return Err(id_space_exhausted(max));
    }
    Ok(offset)
}

fn id_space_exhausted(max: u64) -> TopologyError {
    TopologyError::malformed(format!(
        "node id {} leaves no room for synthetic source and receiver ids",
        max
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_offset() {
        let mut g = Graph::new();
        g.add_path([0u64, 57]).unwrap();
        assert_eq!(synthetic_offset(&g).unwrap(), 1000);
        g.add_edge(57u64, 1000u64).unwrap();
        assert_eq!(synthetic_offset(&g).unwrap(), 10_000);
        g.add_edge(57u64, "leaf-1").unwrap();
        assert_eq!(synthetic_offset(&g).unwrap(), 10_000);
    }

    #[test]
    fn test_synthetic_offset_rejects_huge_ids() {
        let mut g = Graph::new();
        g.add_edge(1u64, 100_000_000_000_000_000u64).unwrap();
        assert_eq!(synthetic_offset(&g).unwrap(), 1_000_000_000_000_000_000);

        g.add_edge(1u64, 1_000_000_000_000_000_000u64).unwrap();
        assert!(matches!(
            synthetic_offset(&g),
            Err(TopologyError::MalformedTopology(_))
        ));
    }

    #[test]
    fn test_main_component() {
        let mut g = Graph::new();
        g.add_path([1u64, 2, 3]).unwrap();
        g.add_edge(7u64, 8u64).unwrap();
        let main = main_component(&g, "test").unwrap();
        assert_eq!(main.node_count(), 3);

        let mut lonely = Graph::new();
        lonely.add_node(1u64);
        lonely.add_node(2u64);
        assert!(matches!(
            main_component(&lonely, "test"),
            Err(TopologyError::MalformedTopology(_))
        ));
    }

    #[test]
    fn test_attached_id() {
        assert_eq!(attached_id(&NodeId::Num(7), 2000, "rec"), NodeId::Num(2007));
        assert_eq!(attached_id(&NodeId::from("gw-3"), 2000, "rec"), NodeId::from("rec-gw-3"));
    }
}
