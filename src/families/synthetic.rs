//! Parametric synthetic families: path, k-ary trees, ring and full mesh.

use crate::error::{Result, TopologyError};
use crate::links::{self, DelayUnit, Links};
use crate::registry::{BuildContext, Params};
use crate::topology::builder::TopologyBuilder;
use crate::topology::types::{LinkType, NodeId, Role};

use super::{annotate_uniform, Assembled};

/// Upper bound on generated tree sizes
pub const MAX_TREE_NODES: u64 = 1_000_000;

/// Receiver on node 0, source on node `n-1`, routers in between
pub fn path(params: &Params, _ctx: &BuildContext) -> Result<Assembled> {
    let n = params.count("n", 3)? as u64;
    let delay = params.delay("delay")?;

    let mut builder = TopologyBuilder::new("PATH");
    builder.graph_mut().add_path(0..n)?;
    annotate_uniform(builder.graph_mut(), delay)?;

    builder.assign_role(0u64, Role::Receiver)?;
    builder.assign_role(n - 1, Role::Source)?;
    builder.assign_roles(1..n - 1, Role::Router)?;
    Ok(Assembled::all_routers(builder))
}

/// Complete k-ary tree of height h, numbered breadth first
///
/// Node `i` has children `k*i+1 ..= k*i+k`. Returns the graph builder with
/// depths recorded and the ids of the leaves in order.
fn kary_tree(name: &str, k: u64, h: u64) -> Result<(TopologyBuilder, Vec<NodeId>)> {
    let mut total: u64 = 0;
    let mut level: u64 = 1;
    for _ in 0..=h {
        total = total.saturating_add(level);
        level = level.saturating_mul(k);
    }
    if total > MAX_TREE_NODES {
        return Err(TopologyError::config(format!(
            "{}: k={} h={} gives {} nodes, above the {} node limit",
            name, k, h, total, MAX_TREE_NODES
        )));
    }

    let mut builder = TopologyBuilder::new(name);
    let graph = builder.graph_mut();
    graph.add_node(0u64).depth = Some(0);
    let mut frontier = vec![0u64];
    for depth in 1..=h {
        let mut next = Vec::with_capacity(frontier.len() * k as usize);
        for &parent in &frontier {
            for c in 1..=k {
                let child = k * parent + c;
                graph.add_edge(parent, child)?;
                graph.add_node(child).depth = Some(depth as u32);
                next.push(child);
            }
        }
        frontier = next;
    }
    let leaves = frontier.into_iter().map(NodeId::Num).collect();
    Ok((builder, leaves))
}

/// Attach one receiver per leaf, numbered from `k^(h+1) - 1` upward
///
/// That is the tree size for binary trees and above it for wider ones. A
/// unary chain would start at 0, so the tree size is the floor.
fn attach_leaf_receivers(
    builder: &mut TopologyBuilder,
    leaves: &[NodeId],
    k: u64,
    h: u64,
) -> Result<Vec<NodeId>> {
    let size = builder.graph().node_count() as u64;
    let first = k.saturating_pow(h as u32 + 1).saturating_sub(1).max(size);
    let mut receivers = Vec::with_capacity(leaves.len());
    for (i, leaf) in leaves.iter().enumerate() {
        let receiver = NodeId::Num(first + i as u64);
        builder.graph_mut().add_edge(receiver.clone(), leaf.clone())?;
        builder.graph_mut().add_node(receiver.clone()).synthetic = true;
        receivers.push(receiver);
    }
    Ok(receivers)
}

fn tree_nodes_at(builder: &TopologyBuilder, depths: std::ops::RangeInclusive<u32>) -> Vec<NodeId> {
    builder
        .graph()
        .nodes()
        .filter(|n| n.depth.is_some_and(|d| depths.contains(&d)))
        .map(|n| n.id.clone())
        .collect()
}

/// Source at the root, routers at every depth, a receiver below each leaf
pub fn tree(params: &Params, _ctx: &BuildContext) -> Result<Assembled> {
    let k = params.count("k", 1)? as u64;
    let h = params.count("h", 1)? as u64;
    let delay = params.delay("delay")?;

    let (mut builder, leaves) = kary_tree("TREE", k, h)?;
    let receivers = attach_leaf_receivers(&mut builder, &leaves, k, h)?;
    annotate_uniform(builder.graph_mut(), delay)?;

    let routers = tree_nodes_at(&builder, 1..=h as u32);
    builder.assign_role(0u64, Role::Source)?;
    builder.assign_roles(routers, Role::Router)?;
    builder.assign_roles(receivers, Role::Receiver)?;
    Ok(Assembled::all_routers(builder))
}

/// Like TREE, but only the two deepest levels route; upper levels are gateways
pub fn tree_coor_edge(params: &Params, _ctx: &BuildContext) -> Result<Assembled> {
    let k = params.count("k", 1)? as u64;
    let h = params.count("h", 2)? as u64;
    let delay = params.delay("delay")?;

    let (mut builder, leaves) = kary_tree("TREE-COOR-EDGE", k, h)?;
    let receivers = attach_leaf_receivers(&mut builder, &leaves, k, h)?;
    annotate_uniform(builder.graph_mut(), delay)?;

    let h = h as u32;
    let gateways = tree_nodes_at(&builder, 1..=h - 2);
    let routers = tree_nodes_at(&builder, h - 1..=h);
    builder.assign_role(0u64, Role::Source)?;
    builder.assign_roles(gateways, Role::Gateway)?;
    builder.assign_roles(routers, Role::Router)?;
    builder.assign_roles(receivers, Role::Receiver)?;
    Ok(Assembled::all_routers(builder))
}

/// Ids of the gateway chain between the source and the edge routers
pub const TREE_EDGE_GATEWAYS: [u64; 4] = [1000, 1001, 1002, 1003];

/// Source behind a four-gateway chain fanning out to `k` edge routers
///
/// Router `i` (1..=k) serves receiver `100 + i`, hence `k <= 100`.
pub fn tree_edge(params: &Params, _ctx: &BuildContext) -> Result<Assembled> {
    let k = params.count("k", 1)? as u64;
    if k > 100 {
        return Err(TopologyError::config(format!(
            "TREE-EDGE: k must be at most 100, got {}",
            k
        )));
    }
    let delay = params.delay("delay")?;

    let mut builder = TopologyBuilder::new("TREE-EDGE");
    let graph = builder.graph_mut();
    graph.add_path(std::iter::once(0).chain(TREE_EDGE_GATEWAYS))?;
    let last_gateway = TREE_EDGE_GATEWAYS[TREE_EDGE_GATEWAYS.len() - 1];
    for router in 1..=k {
        graph.add_edge(last_gateway, router)?;
        graph.add_edge(router, 100 + router)?;
        graph.add_node(100 + router).synthetic = true;
    }
    annotate_uniform(graph, delay)?;

    builder.assign_role(0u64, Role::Source)?;
    builder.assign_roles(TREE_EDGE_GATEWAYS, Role::Gateway)?;
    builder.assign_roles(1..=k, Role::Router)?;
    builder.assign_roles((1..=k).map(|r| 100 + r), Role::Receiver)?;
    Ok(Assembled::all_routers(builder))
}

/// Ring of `n` routers, one receiver per router, one source on router 0
///
/// Nodes: routers `0..n`, receivers `n..2n`, source `2n`.
pub fn ring(params: &Params, _ctx: &BuildContext) -> Result<Assembled> {
    let n = params.count("n", 3)? as u64;
    let delay_int = params.delay("delay_int")?;
    let delay_ext = params.delay("delay_ext")?;

    let mut builder = TopologyBuilder::new("RING");
    let graph = builder.graph_mut();
    graph.add_path((0..n).chain(std::iter::once(0)))?;
    for r in 0..n {
        graph.add_edge(r, n + r)?;
        graph.add_node(n + r).synthetic = true;
    }
    let source = 2 * n;
    graph.add_edge(0u64, source)?;
    graph.add_node(source).synthetic = true;

    links::set_weights_constant(graph, 1.0, Links::All)?;
    links::set_delays_constant(graph, delay_int, DelayUnit::Milliseconds, Links::All)?;
    let external = [(NodeId::Num(0), NodeId::Num(source))];
    links::set_delays_constant(graph, delay_ext, DelayUnit::Milliseconds, Links::Only(&external))?;
    links::classify(graph, &external[0].0, &external[0].1, LinkType::External)?;

    builder.assign_roles(0..n, Role::Router)?;
    builder.assign_roles(n..2 * n, Role::Receiver)?;
    builder.assign_role(source, Role::Source)?;
    Ok(Assembled::all_routers(builder))
}

/// Full mesh of `n` routers, a receiver on each, sources on the first `m`
///
/// Nodes: routers `0..n`, receivers `n..2n`, sources `2n..2n+m`.
pub fn mesh(params: &Params, _ctx: &BuildContext) -> Result<Assembled> {
    let n = params.count("n", 2)? as u64;
    let m = params.count("m", 1)? as u64;
    if m > n {
        return Err(TopologyError::config(format!(
            "MESH: source count m={} cannot exceed router count n={}",
            m, n
        )));
    }
    let delay_int = params.delay("delay_int")?;
    let delay_ext = params.delay("delay_ext")?;

    let mut builder = TopologyBuilder::new("MESH");
    let graph = builder.graph_mut();
    for u in 0..n {
        for v in u + 1..n {
            graph.add_edge(u, v)?;
        }
    }
    for r in 0..n {
        graph.add_edge(r, n + r)?;
        graph.add_node(n + r).synthetic = true;
    }
    let external: Vec<(NodeId, NodeId)> = (0..m)
        .map(|r| (NodeId::Num(r), NodeId::Num(2 * n + r)))
        .collect();
    for (router, source) in &external {
        graph.add_edge(router.clone(), source.clone())?;
        graph.add_node(source.clone()).synthetic = true;
    }

    links::set_weights_constant(graph, 1.0, Links::All)?;
    links::set_delays_constant(graph, delay_int, DelayUnit::Milliseconds, Links::All)?;
    links::set_delays_constant(graph, delay_ext, DelayUnit::Milliseconds, Links::Only(&external))?;
    for (router, source) in &external {
        links::classify(graph, router, source, LinkType::External)?;
    }

    builder.assign_roles(0..n, Role::Router)?;
    builder.assign_roles(n..2 * n, Role::Receiver)?;
    builder.assign_roles(2 * n..2 * n + m, Role::Source)?;
    Ok(Assembled::all_routers(builder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use std::collections::BTreeMap;

    fn build(name: &str, yaml: &str) -> Result<crate::topology::Topology> {
        let raw: BTreeMap<String, serde_yaml::Value> = serde_yaml::from_str(yaml).unwrap();
        Registry::global().build(name, &raw, None, &BuildContext::default())
    }

    fn nums(v: impl IntoIterator<Item = u64>) -> std::collections::BTreeSet<NodeId> {
        v.into_iter().map(NodeId::Num).collect()
    }

    #[test]
    fn test_path_roles() {
        let t = build("PATH", "n: 5").unwrap();
        assert_eq!(t.receivers(), nums([0]));
        assert_eq!(t.sources(), nums([4]));
        assert_eq!(t.routers(), nums([1, 2, 3]));
        assert_eq!(t.icr_candidates(), &nums([1, 2, 3]));
        assert!(build("PATH", "n: 2").is_err());
    }

    #[test]
    fn test_tree_shape() {
        let t = build("TREE", "k: 2\nh: 2").unwrap();
        // 7 tree nodes + 4 receivers
        assert_eq!(t.node_count(), 11);
        assert_eq!(t.sources(), nums([0]));
        assert_eq!(t.routers(), nums(1..=6));
        assert_eq!(t.receivers(), nums(7..=10));
        assert!(t.link(&NodeId::Num(3), &NodeId::Num(7)).is_some());
        assert_eq!(t.graph().node(&NodeId::Num(5)).unwrap().depth, Some(2));
    }

    #[test]
    fn test_tree_receivers_start_at_k_pow() {
        // 13 tree nodes, receivers from 3^3 - 1
        let t = build("TREE", "k: 3\nh: 2").unwrap();
        assert_eq!(t.receivers(), nums(26..35));
        assert!(t.link(&NodeId::Num(4), &NodeId::Num(26)).is_some());

        let chain = build("TREE", "k: 1\nh: 3").unwrap();
        assert_eq!(chain.receivers(), nums([4]));
        assert_eq!(chain.sources(), nums([0]));
    }

    #[test]
    fn test_tree_coor_edge_gateways() {
        let t = build("TREE-COOR-EDGE", "k: 2\nh: 3").unwrap();
        assert_eq!(t.gateways(), nums([1, 2]));
        assert_eq!(t.routers(), nums(3..=14));
        assert_eq!(t.receivers().len(), 8);
        assert!(t.icr_candidates().iter().all(|c| t.role(c) == Some(Role::Router)));
    }

    #[test]
    fn test_tree_edge() {
        let t = build("TREE-EDGE", "k: 3").unwrap();
        assert_eq!(t.gateways(), nums(TREE_EDGE_GATEWAYS));
        assert_eq!(t.routers(), nums([1, 2, 3]));
        assert_eq!(t.receivers(), nums([101, 102, 103]));
        assert!(build("TREE-EDGE", "k: 101").is_err());
    }

    #[test]
    fn test_ring() {
        let t = build("RING", "n: 4\ndelay_int: 3\ndelay_ext: 20").unwrap();
        assert_eq!(t.node_count(), 9);
        let external: Vec<_> = t
            .graph()
            .edges()
            .filter(|(_, _, l)| l.kind == LinkType::External)
            .collect();
        assert_eq!(external.len(), 1);
        assert_eq!(external[0].2.delay, 20.0);
        assert_eq!(t.delay(&NodeId::Num(3), &NodeId::Num(0)), Some(3.0));
        assert_eq!(t.delay(&NodeId::Num(2), &NodeId::Num(6)), Some(3.0));
    }

    #[test]
    fn test_mesh() {
        let t = build("MESH", "n: 4\nm: 2").unwrap();
        assert_eq!(t.node_count(), 10);
        assert_eq!(t.sources(), nums([8, 9]));
        assert_eq!(t.edge_count(), 6 + 4 + 2);
        assert_eq!(t.delay(&NodeId::Num(1), &NodeId::Num(9)), Some(5.0));

        let err = build("MESH", "n: 3\nm: 4").unwrap_err();
        assert!(matches!(err, TopologyError::Configuration(_)));
    }

    #[test]
    fn test_tree_size_limit() {
        assert!(matches!(
            build("TREE", "k: 10\nh: 9"),
            Err(TopologyError::Configuration(_))
        ));
    }
}
