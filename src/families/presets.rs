//! Dataset-specific presets with curated roles and candidate sets.
//!
//! The node lists and thresholds below were picked by inspecting each
//! dataset and only make sense for that exact file. They are kept as named
//! presets rather than general policies.

use crate::candidates::CandidatePolicy;
use crate::error::{Result, TopologyError};
use crate::graph::Graph;
use crate::links::{self, DelayUnit, Links, EXTERNAL_LINK_DELAY, INTERNAL_LINK_DELAY};
use crate::parsers;
use crate::registry::{BuildContext, Params};
use crate::topology::builder::TopologyBuilder;
use crate::topology::types::{NodeId, Role};

use super::datasets::load_graph;
use super::{annotate_uniform, Assembled};

/// GARR nodes facing neighbouring ASes
pub const GARR_SOURCES: &[u64] = &[0, 2, 3, 5, 13, 16, 23, 24, 25, 27, 51, 52, 54];
/// GARR degree-1 access nodes
pub const GARR_RECEIVERS: &[u64] = &[
    1, 7, 8, 9, 11, 12, 19, 26, 28, 30, 32, 33, 41, 42, 43, 47, 48, 50, 53, 57, 60,
];
/// GARR caches need this many links once artificial receivers are attached
pub const GARR_MIN_CACHE_DEGREE: usize = 4;

/// Tiscali caches start from routers with this degree
pub const TISCALI_MIN_CACHE_DEGREE: usize = 6;
/// Degree-1 Tiscali nodes hanging off a router with more links than this
/// are sources, the others receivers
pub const TISCALI_HUB_DEGREE: usize = 4;
pub const TISCALI_CACHE_REMOVALS: &[u64] = &[181, 208, 211, 220, 222, 250, 257];
pub const TISCALI_CACHE_ADDITIONS: &[u64] = &[232, 303, 326, 363, 378];

/// Internal delay everywhere, external delay on source links
fn annotate_preset(graph: &mut Graph, sources: &[NodeId]) -> Result<()> {
    annotate_uniform(graph, INTERNAL_LINK_DELAY)?;
    let source_links: Vec<(NodeId, NodeId)> = sources
        .iter()
        .flat_map(|s| graph.neighbors(s).map(move |n| (s.clone(), n.clone())))
        .collect();
    links::set_delays_constant(
        graph,
        EXTERNAL_LINK_DELAY,
        DelayUnit::Milliseconds,
        Links::Only(&source_links),
    )
}

fn require_nodes(name: &str, graph: &Graph, ids: &[u64]) -> Result<()> {
    match ids.iter().find(|&&id| !graph.contains(&NodeId::Num(id))) {
        Some(missing) => Err(TopologyError::malformed(format!(
            "{}: curated node {} is not in the dataset",
            name, missing
        ))),
        None => Ok(()),
    }
}

fn nums(ids: &[u64]) -> Vec<NodeId> {
    ids.iter().map(|&n| NodeId::Num(n)).collect()
}

/// GEANT with receivers on its leaves and sources on degree-2 nodes
///
/// Candidates are the most central half of the routers.
pub fn geant2(params: &Params, ctx: &BuildContext) -> Result<Assembled> {
    let name = "GEANT_2";
    let raw = load_graph(&ctx.resource(params.str("file")?), INTERNAL_LINK_DELAY)?;
    let mut graph = parsers::main_component(&raw, name)?;

    let nodes: Vec<NodeId> = graph.node_ids().cloned().collect();
    let receivers: Vec<NodeId> = nodes.iter().filter(|v| graph.degree(v) == 1).cloned().collect();
    let attachments: Vec<NodeId> = nodes.iter().filter(|v| graph.degree(v) == 2).cloned().collect();
    let routers: Vec<NodeId> = nodes.iter().filter(|v| graph.degree(v) != 1).cloned().collect();

    let offset = parsers::synthetic_offset(&graph)?;
    let mut sources = Vec::with_capacity(attachments.len());
    for node in &attachments {
        let source = parsers::attached_id(node, offset, "src");
        graph.add_edge(source.clone(), node.clone())?;
        graph.add_node(source.clone()).synthetic = true;
        sources.push(source);
    }
    annotate_preset(&mut graph, &sources)?;

    let mut builder = TopologyBuilder::from_graph(name, graph);
    builder.assign_roles(sources, Role::Source)?;
    builder.assign_roles(receivers, Role::Receiver)?;
    builder.assign_roles(routers, Role::Router)?;
    Ok(Assembled::with_policy(
        builder,
        CandidatePolicy::TopPercentileBetweenness { fraction: 0.5 },
    ))
}

/// GARR with curated sources and receivers plus one receiver per router
pub fn garr2(params: &Params, ctx: &BuildContext) -> Result<Assembled> {
    let name = "GARR_2";
    let mut graph = load_graph(&ctx.resource(params.str("file")?), INTERNAL_LINK_DELAY)?;
    require_nodes(name, &graph, GARR_SOURCES)?;
    require_nodes(name, &graph, GARR_RECEIVERS)?;

    let curated: std::collections::HashSet<u64> =
        GARR_SOURCES.iter().chain(GARR_RECEIVERS).copied().collect();
    let routers: Vec<NodeId> = graph
        .node_ids()
        .filter(|id| id.as_num().map_or(true, |n| !curated.contains(&n)))
        .cloned()
        .collect();

    let offset = parsers::synthetic_offset(&graph)?;
    let mut receivers = nums(GARR_RECEIVERS);
    for (i, router) in routers.iter().enumerate() {
        let receiver = NodeId::Num(offset + i as u64);
        graph.add_edge(receiver.clone(), router.clone())?;
        graph.add_node(receiver.clone()).synthetic = true;
        receivers.push(receiver);
    }
    let sources = nums(GARR_SOURCES);
    annotate_preset(&mut graph, &sources)?;

    let mut builder = TopologyBuilder::from_graph(name, graph);
    builder.assign_roles(sources, Role::Source)?;
    builder.assign_roles(receivers, Role::Receiver)?;
    builder.assign_roles(routers, Role::Router)?;
    Ok(Assembled::with_policy(
        builder,
        CandidatePolicy::DegreeThreshold {
            min_degree: GARR_MIN_CACHE_DEGREE,
        },
    ))
}

/// Tiscali with degree-1 nodes split into sources and receivers
///
/// A leaf whose neighbour is a hub becomes a source, any other leaf a
/// receiver. Candidates are high-degree routers adjusted by hand.
pub fn tiscali2(params: &Params, ctx: &BuildContext) -> Result<Assembled> {
    let name = "TISCALI_2";
    let raw = load_graph(&ctx.resource(params.str("file")?), INTERNAL_LINK_DELAY)?;
    let graph = parsers::main_component(&raw, name)?;

    let mut sources = Vec::new();
    let mut receivers = Vec::new();
    let mut routers = Vec::new();
    for v in graph.node_ids() {
        if graph.degree(v) != 1 {
            routers.push(v.clone());
            continue;
        }
        let hub_degree = graph.neighbors(v).next().map_or(0, |n| graph.degree(n));
        if hub_degree > TISCALI_HUB_DEGREE {
            sources.push(v.clone());
        } else {
            receivers.push(v.clone());
        }
    }
    let base: Vec<NodeId> = routers
        .iter()
        .filter(|r| graph.degree(r) >= TISCALI_MIN_CACHE_DEGREE)
        .cloned()
        .collect();

    let mut graph = graph;
    annotate_preset(&mut graph, &sources)?;

    let mut builder = TopologyBuilder::from_graph(name, graph);
    builder.assign_roles(sources, Role::Source)?;
    builder.assign_roles(receivers, Role::Receiver)?;
    builder.assign_roles(routers, Role::Router)?;
    Ok(Assembled::with_policy(
        builder,
        CandidatePolicy::ExplicitList {
            base,
            removals: nums(TISCALI_CACHE_REMOVALS),
            additions: nums(TISCALI_CACHE_ADDITIONS),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::topology::types::LinkType;
    use crate::topology::Topology;
    use std::collections::{BTreeMap, BTreeSet};
    use std::fs;
    use tempfile::TempDir;

    fn gml(nodes: impl IntoIterator<Item = u64>, edges: &[(u64, u64)]) -> String {
        let mut out = String::from("graph [\n");
        for n in nodes {
            out.push_str(&format!("  node [ id {} label \"n{}\" ]\n", n, n));
        }
        for (u, v) in edges {
            out.push_str(&format!("  edge [ source {} target {} ]\n", u, v));
        }
        out.push_str("]\n");
        out
    }

    fn build(name: &str, dir: &TempDir, file: &str) -> Result<Topology> {
        let mut raw = BTreeMap::new();
        raw.insert("file".to_string(), serde_yaml::Value::from(file));
        Registry::global().build(name, &raw, None, &BuildContext::new(dir.path()))
    }

    fn nums_set(ids: impl IntoIterator<Item = u64>) -> BTreeSet<NodeId> {
        ids.into_iter().map(NodeId::Num).collect()
    }

    #[test]
    fn test_geant2_roles_and_delays() {
        let dir = TempDir::new().unwrap();
        // square 0-1-2-3 with leaves 4 and 5, plus an island that is dropped
        let edges = [(0, 1), (1, 2), (2, 3), (3, 0), (0, 4), (1, 5), (8, 9)];
        fs::write(dir.path().join("g.gml"), gml(0..=9, &edges)).unwrap();

        let t = build("GEANT_2", &dir, "g.gml").unwrap();
        assert_eq!(t.receivers(), nums_set([4, 5]));
        assert_eq!(t.sources(), nums_set([1002, 1003]));
        assert_eq!(t.routers(), nums_set([0, 1, 2, 3]));
        assert!(!t.graph().contains(&NodeId::Num(8)));
        assert_eq!(t.icr_candidates().len(), 2);

        let (src, gw) = (NodeId::Num(1002), NodeId::Num(2));
        assert_eq!(t.delay(&src, &gw), Some(EXTERNAL_LINK_DELAY));
        assert_eq!(t.link_type(&src, &gw), Some(LinkType::External));
        assert_eq!(t.delay(&NodeId::Num(0), &NodeId::Num(4)), Some(INTERNAL_LINK_DELAY));
        assert_eq!(t.link_type(&NodeId::Num(0), &NodeId::Num(1)), Some(LinkType::Internal));
    }

    #[test]
    fn test_garr2_curated_roles() {
        let dir = TempDir::new().unwrap();
        let mut edges: Vec<(u64, u64)> = (0..61).map(|n| (n, n + 1)).collect();
        edges.extend([(4, 10), (4, 20)]);
        fs::write(dir.path().join("garr.gml"), gml(0..=61, &edges)).unwrap();

        let t = build("GARR_2", &dir, "garr.gml").unwrap();
        let curated: BTreeSet<u64> = GARR_SOURCES.iter().chain(GARR_RECEIVERS).copied().collect();
        let routers: BTreeSet<NodeId> =
            (0..=61u64).filter(|n| !curated.contains(n)).map(NodeId::Num).collect();
        assert_eq!(t.sources(), nums_set(GARR_SOURCES.iter().copied()));
        assert_eq!(t.routers(), routers);
        assert_eq!(t.receivers().len(), GARR_RECEIVERS.len() + routers.len());
        // 4 has two path links, two chords and its receiver
        assert_eq!(t.icr_candidates(), &nums_set([4]));
        assert!(t.sources().iter().all(|s| t
            .graph()
            .neighbors(s)
            .all(|n| t.link_type(s, n) == Some(LinkType::External))));
    }

    #[test]
    fn test_garr2_missing_curated_node() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("small.gml"), gml(0..3, &[(0, 1), (1, 2)])).unwrap();
        let err = build("GARR_2", &dir, "small.gml").unwrap_err();
        assert!(matches!(err, TopologyError::MalformedTopology(_)));
    }

    #[test]
    fn test_tiscali2_leaf_split_and_candidates() {
        let dir = TempDir::new().unwrap();
        let mut ring: Vec<u64> = vec![1];
        ring.extend(TISCALI_CACHE_ADDITIONS);
        ring.extend(TISCALI_CACHE_REMOVALS);
        let mut edges: Vec<(u64, u64)> = ring.windows(2).map(|w| (w[0], w[1])).collect();
        edges.push((ring[ring.len() - 1], 1));
        edges.extend([(1, 326), (1, 10), (1, 11), (1, 12), (232, 20)]);
        let map: String = edges
            .iter()
            .map(|(u, v)| format!("{} @Pisa,+Italy (1) -> <{}> =r{}.example.net r0\n", u, v, u))
            .collect();
        fs::write(dir.path().join("t.cch"), map).unwrap();

        let t = build("TISCALI_2", &dir, "t.cch").unwrap();
        assert_eq!(t.sources(), nums_set([10, 11, 12]));
        assert_eq!(t.receivers(), nums_set([20]));
        let mut expected = nums_set(TISCALI_CACHE_ADDITIONS.iter().copied());
        expected.insert(NodeId::Num(1));
        assert_eq!(t.icr_candidates(), &expected);
        assert_eq!(t.delay(&NodeId::Num(1), &NodeId::Num(10)), Some(EXTERNAL_LINK_DELAY));
    }
}
