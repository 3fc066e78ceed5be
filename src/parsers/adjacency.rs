//! Whitespace-delimited adjacency lists with optional latency.
//!
//! ```text
//! # comment
//! Seattle,+WA1  Chicago,+IL3  12.5
//! bb-1784       gw-22
//! ```
//!
//! Two columns use the caller's default delay; a third column is the link
//! latency in milliseconds. A repeated pair overwrites the earlier line.

use std::path::Path;

use log::warn;

use crate::error::{Result, TopologyError};
use crate::graph::{Graph, Link};
use crate::topology::types::NodeId;

/// Parse adjacency text into a graph, delays in milliseconds
pub fn parse_adjacency_str(content: &str, default_delay: f64) -> Result<Graph> {
    let mut graph = Graph::new();
    for (lineno, raw) in content.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split_whitespace().collect();
        let delay = match cols.len() {
            2 => default_delay,
            3 => cols[2].parse::<f64>().map_err(|_| {
                TopologyError::malformed(format!(
                    "line {}: invalid latency '{}'",
                    lineno + 1,
                    cols[2]
                ))
            })?,
            n => {
                return Err(TopologyError::malformed(format!(
                    "line {}: expected 2 or 3 columns, found {}",
                    lineno + 1,
                    n
                )))
            }
        };
        if !(delay.is_finite() && delay >= 0.0) {
            return Err(TopologyError::malformed(format!(
                "line {}: negative latency {}",
                lineno + 1,
                delay
            )));
        }

        let (u, v) = (NodeId::parse(cols[0]), NodeId::parse(cols[1]));
        if u == v {
            warn!("line {}: skipping self-loop on {}", lineno + 1, u);
            continue;
        }
        if graph.has_edge(&u, &v) {
            warn!("line {}: link {}-{} listed twice, keeping the last one", lineno + 1, u, v);
        }
        graph.add_link(
            u,
            v,
            Link {
                delay,
                ..Link::default()
            },
        )?;
    }
    Ok(graph)
}

pub fn parse_adjacency_file(path: &Path, default_delay: f64) -> Result<Graph> {
    let content = super::read_resource(path)?;
    parse_adjacency_str(&content, default_delay).map_err(|e| match e {
        TopologyError::MalformedTopology(msg) => {
            TopologyError::MalformedTopology(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}
