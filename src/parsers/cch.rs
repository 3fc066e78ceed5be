//! RocketFuel ISP map reader (`.cch` files).
//!
//! Internal node lines look like
//!
//! ```text
//! uid @loc [+] [bb] (num_neigh) [&ext] -> <nuid-1> <nuid-2> ... {-euid} ... =name[!] rn
//! ```
//!
//! Lines for external nodes start with `-` and are skipped, as are the
//! `{-euid}` links leaving the AS.

use std::path::Path;
use std::sync::LazyLock;

use log::warn;
use regex::Regex;

use crate::error::{Result, TopologyError};
use crate::graph::Graph;
use crate::topology::types::NodeId;

/// Compiled regex patterns for `.cch` lines
struct CchPatterns {
    uid: Regex,
    location: Regex,
    name: Regex,
    radius: Regex,
    neighbor: Regex,
}

impl CchPatterns {
    fn new() -> Self {
        Self {
            uid: Regex::new(r"^(\d+)\s").expect("Invalid uid regex"),
            location: Regex::new(r"@(\S+)").expect("Invalid location regex"),
            name: Regex::new(r"=(\S+)").expect("Invalid name regex"),
            radius: Regex::new(r"\br(\d+)$").expect("Invalid radius regex"),
            neighbor: Regex::new(r"<(\d+)>").expect("Invalid neighbor regex"),
        }
    }
}

static PATTERNS: LazyLock<CchPatterns> = LazyLock::new(CchPatterns::new);

fn malformed(lineno: usize, what: &str) -> TopologyError {
    TopologyError::malformed(format!("cch line {}: missing {}", lineno + 1, what))
}

/// Parse a RocketFuel map into an undirected graph of internal routers
///
/// Node attributes: `name`, `location` (with `+` read as a space),
/// `backbone` ("true"/"false") and `r` (radius).
pub fn parse_cch_str(content: &str) -> Result<Graph> {
    let mut graph = Graph::new();
    for (lineno, raw) in content.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() || line.starts_with('-') {
            continue;
        }

        let uid: u64 = PATTERNS
            .uid
            .captures(line)
            .and_then(|c| c[1].parse().ok())
            .ok_or_else(|| malformed(lineno, "node uid"))?;
        let name = PATTERNS
            .name
            .captures(line)
            .map(|c| c[1].trim_end_matches('!').to_string())
            .ok_or_else(|| malformed(lineno, "'=name'"))?;
        let radius = PATTERNS
            .radius
            .captures(line)
            .map(|c| c[1].to_string())
            .ok_or_else(|| malformed(lineno, "radius 'rN'"))?;

        let head = line.split("->").next().unwrap_or(line);
        let backbone = head.split_whitespace().any(|t| t == "bb");

        let record = graph.add_node(uid);
        record.attributes.insert("name".to_string(), name);
        record.attributes.insert("r".to_string(), radius);
        record.attributes.insert("backbone".to_string(), backbone.to_string());
        if let Some(c) = PATTERNS.location.captures(head) {
            record.attributes.insert("location".to_string(), c[1].replace('+', " "));
        }

        if let Some((_, links)) = line.split_once("->") {
            for cap in PATTERNS.neighbor.captures_iter(links) {
                let Ok(dst) = cap[1].parse::<u64>() else {
                    continue;
                };
                if dst == uid {
                    warn!("cch line {}: skipping self-loop on {}", lineno + 1, uid);
                    continue;
                }
                graph.add_edge(NodeId::Num(uid), NodeId::Num(dst))?;
            }
        }
    }
    Ok(graph)
}

pub fn parse_cch_file(path: &Path) -> Result<Graph> {
    let content = super::read_resource(path)?;
    parse_cch_str(&content)
}
