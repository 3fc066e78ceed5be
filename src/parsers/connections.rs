//! JSON connection lists used for ad-hoc random topologies.
//!
//! ```json
//! { "connections": [ { "source_id": 3, "destination_id": 7 }, ... ] }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TopologyError};
use crate::graph::Graph;
use crate::topology::types::NodeId;

/// Give up on a random draw after this many disconnected attempts
pub const MAX_RANDOM_ATTEMPTS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub source_id: u64,
    pub destination_id: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionList {
    pub connections: Vec<Connection>,
}

impl ConnectionList {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| TopologyError::malformed(format!("connection list: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = super::read_resource(path)?;
        Self::from_json(&content).map_err(|e| match e {
            TopologyError::MalformedTopology(msg) => {
                TopologyError::MalformedTopology(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| TopologyError::malformed(format!("connection list: {}", e)))?;
        fs::write(path, json).map_err(|source| TopologyError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Degree of every node counted over the raw lines
    ///
    /// Repeated connections count once per line and a self-loop counts twice,
    /// so this can exceed the degree in [`ConnectionList::to_graph`].
    pub fn line_degrees(&self) -> HashMap<u64, usize> {
        let mut degrees = HashMap::new();
        for c in &self.connections {
            *degrees.entry(c.destination_id).or_insert(0) += 1;
            *degrees.entry(c.source_id).or_insert(0) += 1;
        }
        degrees
    }

    /// Undirected graph; nodes ordered by first appearance, destination first
    pub fn to_graph(&self) -> Result<Graph> {
        let mut graph = Graph::new();
        for c in &self.connections {
            graph.add_node(c.destination_id);
            graph.add_node(c.source_id);
            if c.source_id == c.destination_id {
                warn!("connection list: skipping self-loop on {}", c.source_id);
                continue;
            }
            graph.add_edge(NodeId::Num(c.destination_id), NodeId::Num(c.source_id))?;
        }
        Ok(graph)
    }

    /// Draw a connected G(n, p) graph as a connection list
    ///
    /// Every pair `i < j` is linked with probability `edge_probability`;
    /// draws are repeated until the result is connected. The same seed always
    /// gives the same list.
    pub fn random(nodes: u64, edge_probability: f64, seed: u64) -> Result<Self> {
        if nodes < 2 {
            return Err(TopologyError::config(format!(
                "random connection list needs at least 2 nodes, got {}",
                nodes
            )));
        }
        if !(edge_probability > 0.0 && edge_probability <= 1.0) {
            return Err(TopologyError::config(format!(
                "edge probability must be within (0, 1], got {}",
                edge_probability
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        for attempt in 1..=MAX_RANDOM_ATTEMPTS {
            let mut connections = Vec::new();
            for i in 0..nodes {
                for j in i + 1..nodes {
                    if rng.gen_bool(edge_probability) {
                        connections.push(Connection {
                            source_id: i,
                            destination_id: j,
                        });
                    }
                }
            }
            let list = Self { connections };
            let graph = list.to_graph()?;
            if graph.node_count() as u64 == nodes && graph.is_connected() {
                debug!("random connection list connected after {} draw(s)", attempt);
                return Ok(list);
            }
        }
        Err(TopologyError::config(format!(
            "no connected graph with {} nodes and p={} after {} draws",
            nodes, edge_probability, MAX_RANDOM_ATTEMPTS
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_and_order() {
        let json = r#"{"connections": [
            {"source_id": 5, "destination_id": 2},
            {"source_id": 2, "destination_id": 9, "bandwidth": 10},
            {"source_id": 5, "destination_id": 9}
        ]}"#;
        let list = ConnectionList::from_json(json).unwrap();
        let g = list.to_graph().unwrap();
        let order: Vec<u64> = g.node_ids().filter_map(|n| n.as_num()).collect();
        assert_eq!(order, vec![2, 5, 9]);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn test_line_degrees_count_repeats() {
        let json = r#"{"connections": [
            {"source_id": 0, "destination_id": 1},
            {"source_id": 1, "destination_id": 0},
            {"source_id": 4, "destination_id": 4}
        ]}"#;
        let list = ConnectionList::from_json(json).unwrap();
        let degrees = list.line_degrees();
        assert_eq!(degrees[&0], 2);
        assert_eq!(degrees[&1], 2);
        assert_eq!(degrees[&4], 2);
        assert_eq!(list.to_graph().unwrap().degree(&NodeId::Num(0)), 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("random.json");
        let list = ConnectionList {
            connections: vec![Connection { source_id: 0, destination_id: 1 }],
        };
        list.save(&path).unwrap();
        assert_eq!(ConnectionList::load(&path).unwrap(), list);
    }

    #[test]
    fn test_random_is_connected_and_seeded() {
        let a = ConnectionList::random(30, 0.2, 7).unwrap();
        let b = ConnectionList::random(30, 0.2, 7).unwrap();
        assert_eq!(a, b);
        let g = a.to_graph().unwrap();
        assert_eq!(g.node_count(), 30);
        assert!(g.is_connected());

        let full = ConnectionList::random(5, 1.0, 0).unwrap();
        assert_eq!(full.connections.len(), 10);
    }

    #[test]
    fn test_random_rejects_bad_input() {
        assert!(ConnectionList::random(1, 0.5, 0).is_err());
        assert!(ConnectionList::random(10, 0.0, 0).is_err());
        assert!(ConnectionList::random(10, 1.5, 0).is_err());
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            ConnectionList::from_json("{\"links\": []}"),
            Err(TopologyError::MalformedTopology(_))
        ));
    }
}
