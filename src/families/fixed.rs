//! Hand-drawn reference networks: SINET and the asymmetric three-tier tree.

use crate::error::Result;
use crate::registry::{BuildContext, Params};
use crate::topology::builder::TopologyBuilder;
use crate::topology::types::Role;

use super::{annotate_uniform, Assembled};

/// Receivers sit at `RECEIVER_OFFSET + router`
const RECEIVER_OFFSET: u64 = 100;

/// SINET core: eight hubs (1..=8) and the spokes hanging off each hub
#[rustfmt::skip]
const SINET_CORE: &[(u64, u64)] = &[
    (1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 7), (7, 8),
    (8, 1), (1, 7), (1, 4), (1, 3), (4, 7), (5, 7),
];
const SINET_SPOKES: &[(u64, std::ops::Range<u64>)] = &[
    (1, 9..20),
    (2, 20..21),
    (3, 21..26),
    (4, 26..28),
    (5, 28..32),
    (6, 32..40),
    (7, 40..49),
    (8, 49..51),
];

fn sinet(name: &str, delay: f64, receivers_from: u64) -> Result<TopologyBuilder> {
    let mut builder = TopologyBuilder::new(name);
    let graph = builder.graph_mut();
    for &(u, v) in SINET_CORE {
        graph.add_edge(u, v)?;
    }
    graph.add_edge(0u64, 1u64)?;
    for (hub, spokes) in SINET_SPOKES {
        for spoke in spokes.clone() {
            graph.add_edge(spoke, *hub)?;
        }
    }
    for router in receivers_from..=50 {
        graph.add_edge(router, RECEIVER_OFFSET + router)?;
        graph.add_node(RECEIVER_OFFSET + router).synthetic = true;
    }
    annotate_uniform(graph, delay)?;

    builder.assign_role(0u64, Role::Source)?;
    builder.assign_roles(1..=50u64, Role::Router)?;
    builder.assign_roles((receivers_from..=50).map(|r| RECEIVER_OFFSET + r), Role::Receiver)?;
    Ok(builder)
}

/// SINET with a receiver on every router
pub fn sinet_full(params: &Params, _ctx: &BuildContext) -> Result<Assembled> {
    let delay = params.delay("delay")?;
    Ok(Assembled::all_routers(sinet("SINET", delay, 1)?))
}

/// SINET with receivers on the spoke routers only
pub fn sinet_edge(params: &Params, _ctx: &BuildContext) -> Result<Assembled> {
    let delay = params.delay("delay")?;
    Ok(Assembled::all_routers(sinet("SINET-EDGE", delay, 9)?))
}

/// Asymmetric tree below node 1: two aggregation levels, 18 leaves
#[rustfmt::skip]
const ATREE_LINKS: &[(u64, u64)] = &[
    (1, 2), (1, 3),
    (2, 4), (2, 5), (3, 6), (3, 7),
    (4, 8), (4, 9), (4, 10),
    (5, 11), (5, 12), (5, 13), (5, 14), (5, 15),
    (6, 16), (6, 17),
    (7, 18), (7, 19), (7, 20), (7, 21), (7, 22), (7, 23), (7, 24), (7, 25),
];
const ATREE_LEAVES: std::ops::RangeInclusive<u64> = 8..=25;

/// Role layout of the asymmetric tree variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtreeVariant {
    /// Source 0 above node 1; every tree node routes
    Plain,
    /// Source 0; nodes 1..=7 are gateways
    Edge,
    /// Source 0; nodes 1..=3 are gateways
    CoordinatedEdge,
    /// Node 1 is the source itself; nodes 2 and 3 are gateways
    CoordinatedEdgeRootSource,
}

impl AtreeVariant {
    fn name(self) -> &'static str {
        match self {
            AtreeVariant::Plain => "ATREE",
            AtreeVariant::Edge => "EATREE",
            AtreeVariant::CoordinatedEdge => "CEATREE",
            AtreeVariant::CoordinatedEdgeRootSource => "NCEATREE",
        }
    }

    /// First router id; lower tree ids are gateways (or the source)
    fn first_router(self) -> u64 {
        match self {
            AtreeVariant::Plain => 1,
            AtreeVariant::Edge => 8,
            AtreeVariant::CoordinatedEdge | AtreeVariant::CoordinatedEdgeRootSource => 4,
        }
    }
}

fn atree(variant: AtreeVariant, delay: f64) -> Result<TopologyBuilder> {
    let mut builder = TopologyBuilder::new(variant.name());
    let graph = builder.graph_mut();
    let source = match variant {
        AtreeVariant::CoordinatedEdgeRootSource => 1u64,
        _ => {
            graph.add_edge(0u64, 1u64)?;
            0u64
        }
    };
    for &(u, v) in ATREE_LINKS {
        graph.add_edge(u, v)?;
    }
    for leaf in ATREE_LEAVES {
        graph.add_edge(leaf, RECEIVER_OFFSET + leaf)?;
        graph.add_node(RECEIVER_OFFSET + leaf).synthetic = true;
    }
    annotate_uniform(graph, delay)?;

    let first_router = variant.first_router();
    builder.assign_role(source, Role::Source)?;
    builder.assign_roles(source + 1..first_router, Role::Gateway)?;
    builder.assign_roles(first_router..=25, Role::Router)?;
    builder.assign_roles(ATREE_LEAVES.map(|l| RECEIVER_OFFSET + l), Role::Receiver)?;
    Ok(builder)
}

pub fn atree_plain(params: &Params, _ctx: &BuildContext) -> Result<Assembled> {
    let delay = params.delay("delay")?;
    Ok(Assembled::all_routers(atree(AtreeVariant::Plain, delay)?))
}

pub fn atree_edge(params: &Params, _ctx: &BuildContext) -> Result<Assembled> {
    let delay = params.delay("delay")?;
    Ok(Assembled::all_routers(atree(AtreeVariant::Edge, delay)?))
}

pub fn atree_coor_edge(params: &Params, _ctx: &BuildContext) -> Result<Assembled> {
    let delay = params.delay("delay")?;
    Ok(Assembled::all_routers(atree(AtreeVariant::CoordinatedEdge, delay)?))
}

pub fn atree_coor_edge_root_source(params: &Params, _ctx: &BuildContext) -> Result<Assembled> {
    let delay = params.delay("delay")?;
    Ok(Assembled::all_routers(atree(
        AtreeVariant::CoordinatedEdgeRootSource,
        delay,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::CandidatePolicy;
    use crate::topology::types::NodeId;

    fn finish(builder: TopologyBuilder) -> crate::topology::Topology {
        builder.finish(&CandidatePolicy::AllRouters).unwrap()
    }

    #[test]
    fn test_sinet_sizes() {
        let full = finish(sinet("SINET", 1.0, 1).unwrap());
        assert_eq!(full.routers().len(), 50);
        assert_eq!(full.receivers().len(), 50);
        assert_eq!(full.node_count(), 101);
        assert_eq!(full.graph().degree(&NodeId::Num(1)), 11 + 6 + 1);

        let edge = finish(sinet("SINET-EDGE", 1.0, 9).unwrap());
        assert_eq!(edge.receivers().len(), 42);
        assert_eq!(edge.icr_candidates().len(), 50);
    }

    #[test]
    fn test_atree_variants() {
        let plain = finish(atree(AtreeVariant::Plain, 1.0).unwrap());
        assert_eq!(plain.routers().len(), 25);
        assert!(plain.gateways().is_empty());
        assert_eq!(plain.receivers().len(), 18);

        let edge = finish(atree(AtreeVariant::Edge, 1.0).unwrap());
        assert_eq!(edge.gateways().len(), 7);
        assert_eq!(edge.routers().len(), 18);

        let coor = finish(atree(AtreeVariant::CoordinatedEdge, 1.0).unwrap());
        assert_eq!(coor.gateways().len(), 3);
        assert_eq!(coor.routers().len(), 22);

        let rooted = finish(atree(AtreeVariant::CoordinatedEdgeRootSource, 1.0).unwrap());
        assert!(!rooted.graph().contains(&NodeId::Num(0)));
        assert_eq!(rooted.sources().into_iter().collect::<Vec<_>>(), vec![NodeId::Num(1)]);
        assert_eq!(rooted.gateways().len(), 2);
        assert_eq!(rooted.node_count(), 25 + 18);
    }
}
