//! Cache candidate selection.
//!
//! Every policy looks only at router nodes and runs after the graph is fully
//! assembled, because synthetic source and receiver links change degrees and
//! centralities.

use std::collections::BTreeSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TopologyError};
use crate::graph::Graph;
use crate::topology::types::{NodeId, Role};

/// Centralities closer than this are treated as ties
pub const CENTRALITY_TOLERANCE: f64 = 1e-9;

/// Heuristic choosing which routers may host a cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CandidatePolicy {
    /// Every router
    AllRouters,
    /// Routers with at least `min_degree` links
    DegreeThreshold { min_degree: usize },
    /// The most central `fraction` of routers, count rounded up
    TopPercentileBetweenness { fraction: f64 },
    /// A curated list: `base`, minus `removals`, plus `additions`
    ExplicitList {
        base: Vec<NodeId>,
        #[serde(default)]
        removals: Vec<NodeId>,
        #[serde(default)]
        additions: Vec<NodeId>,
    },
}

impl Default for CandidatePolicy {
    fn default() -> Self {
        CandidatePolicy::AllRouters
    }
}

fn routers(graph: &Graph) -> Vec<&NodeId> {
    graph
        .nodes()
        .filter(|n| n.role() == Some(Role::Router))
        .map(|n| &n.id)
        .collect()
}

impl CandidatePolicy {
    /// Check parameters that do not depend on the graph
    pub fn validate(&self) -> Result<()> {
        if let CandidatePolicy::TopPercentileBetweenness { fraction } = self {
            if !(0.0..=1.0).contains(fraction) {
                return Err(TopologyError::config(format!(
                    "betweenness fraction must be within [0, 1], got {}",
                    fraction
                )));
            }
        }
        Ok(())
    }

    /// Compute the candidate set on an assembled graph with roles
    pub fn select(&self, graph: &Graph) -> Result<BTreeSet<NodeId>> {
        self.validate()?;
        let routers = routers(graph);
        let selected: BTreeSet<NodeId> = match self {
            CandidatePolicy::AllRouters => routers.into_iter().cloned().collect(),
            CandidatePolicy::DegreeThreshold { min_degree } => routers
                .into_iter()
                .filter(|r| graph.degree(r) >= *min_degree)
                .cloned()
                .collect(),
            CandidatePolicy::TopPercentileBetweenness { fraction } => {
                top_percentile_betweenness(graph, &routers, *fraction)?
            }
            CandidatePolicy::ExplicitList {
                base,
                removals,
                additions,
            } => {
                let router_set: BTreeSet<&NodeId> = routers.into_iter().collect();
                for id in base.iter().chain(removals).chain(additions) {
                    if !router_set.contains(id) {
                        let reason = match graph.node(id).and_then(|n| n.role()) {
                            Some(role) => format!("node is a {}", role),
                            None if graph.contains(id) => "node has no role".to_string(),
                            None => "node is not in the topology".to_string(),
                        };
                        return Err(TopologyError::InvalidCandidate {
                            node: id.clone(),
                            reason,
                        });
                    }
                }
                let mut set: BTreeSet<NodeId> = base.iter().cloned().collect();
                for id in removals {
                    set.remove(id);
                }
                set.extend(additions.iter().cloned());
                set
            }
        };
        debug!("{:?} selected {} cache candidates", self, selected.len());
        Ok(selected)
    }
}

/// Routers ordered by ascending centrality, ties by ascending id
///
/// Ties are runs of neighbouring scores no further apart than
/// [`CENTRALITY_TOLERANCE`].
pub fn rank_by_betweenness(graph: &Graph, routers: &[&NodeId]) -> Result<Vec<NodeId>> {
    let centrality = graph.betweenness_centrality()?;
    let mut scored: Vec<(f64, NodeId)> = routers
        .iter()
        .map(|&r| (centrality.get(r).copied().unwrap_or(0.0), r.clone()))
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let mut ranked = Vec::with_capacity(scored.len());
    let mut run: Vec<(f64, NodeId)> = Vec::new();
    for entry in scored {
        if let Some(last) = run.last() {
            if entry.0 - last.0 > CENTRALITY_TOLERANCE {
                run.sort_by(|a, b| a.1.cmp(&b.1));
                ranked.extend(run.drain(..).map(|(_, id)| id));
            }
        }
        run.push(entry);
    }
    run.sort_by(|a, b| a.1.cmp(&b.1));
    ranked.extend(run.into_iter().map(|(_, id)| id));
    Ok(ranked)
}

fn top_percentile_betweenness(
    graph: &Graph,
    routers: &[&NodeId],
    fraction: f64,
) -> Result<BTreeSet<NodeId>> {
    let ranked = rank_by_betweenness(graph, routers)?;
    // absorb float noise such as 0.7 * 10 = 7.000000000000001
    let wanted = ((fraction * ranked.len() as f64) - CENTRALITY_TOLERANCE)
        .ceil()
        .max(0.0) as usize;
    let wanted = wanted.min(ranked.len());
    Ok(ranked[ranked.len() - wanted..].iter().cloned().collect())
}
