//! Families built from dataset files under the resource root.

use std::path::Path;

use log::debug;

use crate::error::{Result, TopologyError};
use crate::graph::Graph;
use crate::links::INTERNAL_LINK_DELAY;
use crate::parsers::{
    self, import_backbone, import_isp_latency, parse_adjacency_file, parse_cch_file,
    parse_gml_file, ConnectionList, ReceiverPlacement,
};
use crate::registry::{BuildContext, Params};
use crate::topology::builder::TopologyBuilder;
use crate::topology::types::{NodeId, Role};

use super::{annotate_uniform, Assembled};

/// Read a dataset graph, picking the reader from the file extension
///
/// `.gml` and `.cch` files use their own readers; anything else is read as
/// an adjacency list with `default_delay` for two-column lines.
pub fn load_graph(path: &Path, default_delay: f64) -> Result<Graph> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("gml") => parse_gml_file(path)?.to_graph(),
        Some("cch") => parse_cch_file(path),
        _ => parse_adjacency_file(path, default_delay),
    }
}

/// Tier of a Telstra node, from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Backbone,
    Gateway,
    Leaf,
}

fn telstra_tier(id: &NodeId) -> Option<Tier> {
    let name = id.to_string();
    if name.contains("bb") {
        Some(Tier::Backbone)
    } else if name.contains("gw") {
        Some(Tier::Gateway)
    } else if name.contains("leaf") {
        Some(Tier::Leaf)
    } else {
        None
    }
}

/// Telstra role layouts: which tiers route (the others are gateways)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelstraVariant {
    AllRoute,
    Edge,
    CoordinatedEdge,
}

impl TelstraVariant {
    fn name(self) -> &'static str {
        match self {
            TelstraVariant::AllRoute => "TELSTRA",
            TelstraVariant::Edge => "TELSTRA-EDGE",
            TelstraVariant::CoordinatedEdge => "TELSTRA-COOR-EDGE",
        }
    }

    fn role(self, tier: Tier) -> Role {
        match (self, tier) {
            (_, Tier::Leaf) => Role::Router,
            (TelstraVariant::AllRoute, _) => Role::Router,
            (TelstraVariant::CoordinatedEdge, Tier::Gateway) => Role::Router,
            _ => Role::Gateway,
        }
    }
}

fn telstra(variant: TelstraVariant, params: &Params, ctx: &BuildContext) -> Result<Assembled> {
    let name = variant.name();
    let delay = params.delay("delay")?;
    let mut graph = parse_adjacency_file(&ctx.resource(params.str("file")?), delay)?;

    let attachment = NodeId::parse(params.str("source_attachment")?);
    if !graph.contains(&attachment) {
        return Err(TopologyError::config(format!(
            "{}: source attachment {} is not in the dataset",
            name, attachment
        )));
    }

    let tiers: Vec<(NodeId, Option<Tier>)> =
        graph.node_ids().map(|id| (id.clone(), telstra_tier(id))).collect();
    let leaves: Vec<NodeId> = tiers
        .iter()
        .filter(|(_, t)| *t == Some(Tier::Leaf))
        .map(|(id, _)| id.clone())
        .collect();

    let offset = parsers::synthetic_offset(&graph)?;
    let mut receivers = Vec::with_capacity(leaves.len());
    for (i, leaf) in leaves.iter().enumerate() {
        let receiver = NodeId::Num(offset + i as u64);
        graph.add_edge(receiver.clone(), leaf.clone())?;
        graph.add_node(receiver.clone()).synthetic = true;
        receivers.push(receiver);
    }
    let source = NodeId::Num(2 * offset);
    graph.add_edge(source.clone(), attachment)?;
    graph.add_node(source.clone()).synthetic = true;
    annotate_uniform(&mut graph, delay)?;

    let mut builder = TopologyBuilder::from_graph(name, graph);
    // untiered nodes keep no role and fail validation with their ids
    for (id, tier) in tiers {
        if let Some(tier) = tier {
            builder.assign_role(id, variant.role(tier))?;
        }
    }
    builder.assign_roles(receivers, Role::Receiver)?;
    builder.assign_role(source, Role::Source)?;
    Ok(Assembled::all_routers(builder))
}

pub fn telstra_all(params: &Params, ctx: &BuildContext) -> Result<Assembled> {
    telstra(TelstraVariant::AllRoute, params, ctx)
}

pub fn telstra_edge(params: &Params, ctx: &BuildContext) -> Result<Assembled> {
    telstra(TelstraVariant::Edge, params, ctx)
}

pub fn telstra_coor_edge(params: &Params, ctx: &BuildContext) -> Result<Assembled> {
    telstra(TelstraVariant::CoordinatedEdge, params, ctx)
}

/// Where sources go on a random connection-list topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourcePlacement {
    /// One source on the first node with this degree, counted over the
    /// list's lines including repeats
    FirstWithDegree(usize),
    /// One source on every node
    Everywhere,
}

fn random(name: &str, placement: SourcePlacement, params: &Params, ctx: &BuildContext) -> Result<Assembled> {
    let delay = params.delay("delay")?;
    let list = ConnectionList::load(&ctx.resource(params.str("file")?))?;
    let mut graph = list.to_graph()?;
    let routers: Vec<NodeId> = graph.node_ids().cloned().collect();
    if routers.len() < 2 {
        return Err(TopologyError::malformed(format!("{}: connection list is empty", name)));
    }

    let attachments: Vec<NodeId> = match placement {
        SourcePlacement::FirstWithDegree(degree) => {
            let degrees = list.line_degrees();
            let hub = routers
                .iter()
                .find(|r| r.as_num().and_then(|n| degrees.get(&n)) == Some(&degree))
                .cloned()
                .ok_or_else(|| {
                    TopologyError::config(format!("{}: no node has degree {}", name, degree))
                })?;
            vec![hub]
        }
        SourcePlacement::Everywhere => routers.clone(),
    };

    let offset = parsers::synthetic_offset(&graph)?;
    let mut receivers = Vec::with_capacity(routers.len());
    for (i, router) in routers.iter().enumerate() {
        let receiver = NodeId::Num(offset + i as u64);
        graph.add_edge(receiver.clone(), router.clone())?;
        graph.add_node(receiver.clone()).synthetic = true;
        receivers.push(receiver);
    }
    let mut sources = Vec::with_capacity(attachments.len());
    for (i, router) in attachments.iter().enumerate() {
        let source = NodeId::Num(10 * offset + i as u64);
        graph.add_edge(source.clone(), router.clone())?;
        graph.add_node(source.clone()).synthetic = true;
        sources.push(source);
    }
    annotate_uniform(&mut graph, delay)?;
    debug!("{}: {} routers, {} sources", name, routers.len(), sources.len());

    let mut builder = TopologyBuilder::from_graph(name, graph);
    builder.assign_roles(routers, Role::Router)?;
    builder.assign_roles(receivers, Role::Receiver)?;
    builder.assign_roles(sources, Role::Source)?;
    Ok(Assembled::all_routers(builder))
}

/// Random connection list with a single source on a chosen-degree node
pub fn random_single_source(params: &Params, ctx: &BuildContext) -> Result<Assembled> {
    let degree = params.count("source_degree", 1)?;
    random("RANDOM", SourcePlacement::FirstWithDegree(degree), params, ctx)
}

pub fn random_750(params: &Params, ctx: &BuildContext) -> Result<Assembled> {
    random("RANDOM3", SourcePlacement::Everywhere, params, ctx)
}

pub fn random_1000(params: &Params, ctx: &BuildContext) -> Result<Assembled> {
    random("RANDOM4", SourcePlacement::Everywhere, params, ctx)
}

/// RocketFuel latency map of one AS
pub fn rocket_fuel(params: &Params, ctx: &BuildContext) -> Result<Assembled> {
    let asn = params.int("asn")?;
    let source_ratio = params.float("source_ratio")?;
    let external_delay = params.delay("external_delay_ms")?;
    let path = ctx
        .resource("rocketfuel-latency")
        .join(asn.to_string())
        .join("latencies.intra");
    let graph = parse_adjacency_file(&path, INTERNAL_LINK_DELAY)?;
    let builder = import_isp_latency(&format!("ROCKET_FUEL-{}", asn), &graph, source_ratio, external_delay)?;
    Ok(Assembled::all_routers(builder))
}

fn backbone_from_file(name: &str, params: &Params, ctx: &BuildContext) -> Result<Assembled> {
    let delay = params.delay("delay")?;
    let placement: ReceiverPlacement = params.str("receivers")?.parse()?;
    let graph = load_graph(&ctx.resource(params.str("file")?), delay)?;
    Ok(Assembled::all_routers(import_backbone(name, &graph, placement, delay)?))
}

pub fn geant(params: &Params, ctx: &BuildContext) -> Result<Assembled> {
    backbone_from_file("GEANT", params, ctx)
}

pub fn garr(params: &Params, ctx: &BuildContext) -> Result<Assembled> {
    backbone_from_file("GARR", params, ctx)
}

pub fn wide(params: &Params, ctx: &BuildContext) -> Result<Assembled> {
    backbone_from_file("WIDE", params, ctx)
}

pub fn tiscali(params: &Params, ctx: &BuildContext) -> Result<Assembled> {
    backbone_from_file("TISCALI", params, ctx)
}

/// Any backbone file the caller names
pub fn backbone(params: &Params, ctx: &BuildContext) -> Result<Assembled> {
    backbone_from_file("BACKBONE", params, ctx)
}
