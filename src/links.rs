//! Link annotation: routing weights, propagation delays and link types.

use std::str::FromStr;

use log::debug;

use crate::error::{Result, TopologyError};
use crate::graph::Graph;
use crate::topology::types::{LinkType, NodeId, Role};

/// Suggested by Computer Networks 2011 (citing IMC'06 measurements)
pub const INTERNAL_LINK_DELAY: f64 = 2.0;
pub const EXTERNAL_LINK_DELAY: f64 = 34.0;

/// Multiplier applied to every link touching a source
pub const SOURCE_WEIGHT_FACTOR: f64 = 1000.0;

/// Smallest weight assigned when weights are derived from latencies
pub const MIN_LATENCY_WEIGHT: f64 = 0.001;

/// Unit of a delay value; delays are stored in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayUnit {
    Seconds,
    Milliseconds,
    Microseconds,
}

impl DelayUnit {
    pub fn to_millis(self, value: f64) -> f64 {
        match self {
            DelayUnit::Seconds => value * 1000.0,
            DelayUnit::Milliseconds => value,
            DelayUnit::Microseconds => value / 1000.0,
        }
    }
}

impl FromStr for DelayUnit {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "s" | "sec" => Ok(DelayUnit::Seconds),
            "ms" => Ok(DelayUnit::Milliseconds),
            "us" => Ok(DelayUnit::Microseconds),
            other => Err(TopologyError::config(format!("unknown delay unit '{}'", other))),
        }
    }
}

/// Which links an annotation applies to
#[derive(Debug, Clone, Copy)]
pub enum Links<'a> {
    All,
    Only(&'a [(NodeId, NodeId)]),
}

fn apply<F>(graph: &mut Graph, links: Links<'_>, mut f: F) -> Result<()>
where
    F: FnMut(&mut crate::graph::Link),
{
    match links {
        Links::All => {
            for (_, _, link) in graph.links_mut() {
                f(link);
            }
        }
        Links::Only(pairs) => {
            for (u, v) in pairs {
                let link = graph.link_mut(u, v).ok_or_else(|| {
                    TopologyError::malformed(format!("no link between {} and {}", u, v))
                })?;
                f(link);
            }
        }
    }
    Ok(())
}

/// Set the same routing weight on the selected links
pub fn set_weights_constant(graph: &mut Graph, value: f64, links: Links<'_>) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(TopologyError::config(format!(
            "link weight must be positive, got {}",
            value
        )));
    }
    apply(graph, links, |link| link.weight = value)
}

/// Set the same delay on the selected links
pub fn set_delays_constant(
    graph: &mut Graph,
    value: f64,
    unit: DelayUnit,
    links: Links<'_>,
) -> Result<()> {
    let millis = unit.to_millis(value);
    if !(millis.is_finite() && millis >= 0.0) {
        return Err(TopologyError::config(format!(
            "link delay must be non-negative, got {}",
            value
        )));
    }
    apply(graph, links, |link| link.delay = millis)
}

/// Use each link's delay as its weight, never going below `floor`
pub fn set_weights_from_delays(graph: &mut Graph, floor: f64) -> Result<()> {
    if !(floor.is_finite() && floor > 0.0) {
        return Err(TopologyError::config("weight floor must be positive"));
    }
    for (_, _, link) in graph.links_mut() {
        link.weight = link.delay.max(floor);
    }
    Ok(())
}

/// Classify a single link
pub fn classify(graph: &mut Graph, u: &NodeId, v: &NodeId, kind: LinkType) -> Result<()> {
    let link = graph
        .link_mut(u, v)
        .ok_or_else(|| TopologyError::malformed(format!("no link between {} and {}", u, v)))?;
    link.kind = kind;
    Ok(())
}

/// Mark every link touching a source external and inflate its weight
///
/// Shortest paths then never transit a source node. Returns the number of
/// links touched.
pub fn isolate_sources(graph: &mut Graph, factor: f64) -> usize {
    let sources: std::collections::HashSet<NodeId> = graph
        .nodes()
        .filter(|n| n.role() == Some(Role::Source))
        .map(|n| n.id.clone())
        .collect();
    let mut touched = 0;
    for (u, v, link) in graph.links_mut() {
        if sources.contains(u) || sources.contains(v) {
            link.kind = LinkType::External;
            link.weight *= factor;
            touched += 1;
        }
    }
    debug!("Isolated {} source links (weight x{})", touched, factor);
    touched
}

/// Check weight positivity and delay non-negativity on every link
pub fn validate_links(graph: &Graph) -> Result<()> {
    for (u, v, link) in graph.edges() {
        if !(link.weight.is_finite() && link.weight > 0.0) {
            return Err(TopologyError::malformed(format!(
                "link {}-{} has non-positive weight {}",
                u, v, link.weight
            )));
        }
        if !(link.delay.is_finite() && link.delay >= 0.0) {
            return Err(TopologyError::malformed(format!(
                "link {}-{} has negative delay {}",
                u, v, link.delay
            )));
        }
    }
    Ok(())
}
