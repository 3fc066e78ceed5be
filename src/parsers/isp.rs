//! ISP latency importer (RocketFuel `latencies.intra` maps).

use log::debug;

use crate::error::{Result, TopologyError};
use crate::graph::{Graph, Link};
use crate::links::{self, MIN_LATENCY_WEIGHT};
use crate::topology::builder::TopologyBuilder;
use crate::topology::types::{LinkType, NodeId, Role};

/// Attach synthetic sources and receivers to an intra-AS latency graph
///
/// # Arguments
/// * `name` - Topology name used in logs and errors
/// * `graph` - Parsed latency map, delays in milliseconds
/// * `source_ratio` - Sources per router, within `[0, 1]`
/// * `external_delay` - Delay of every source link in milliseconds
///
/// # Returns
/// A builder with every role assigned. The largest component's routers are
/// ranked by degree, ties kept in file order; `src_i` hangs off the i-th
/// ranked router and `rec_i` off every router. Weights follow delays.
pub fn import_isp_latency(
    name: &str,
    graph: &Graph,
    source_ratio: f64,
    external_delay: f64,
) -> Result<TopologyBuilder> {
    if !(0.0..=1.0).contains(&source_ratio) {
        return Err(TopologyError::config(format!(
            "{}: source_ratio must be within [0, 1], got {}",
            name, source_ratio
        )));
    }
    if !(external_delay.is_finite() && external_delay >= 0.0) {
        return Err(TopologyError::config(format!(
            "{}: external delay must be non-negative, got {}",
            name, external_delay
        )));
    }

    let mut graph = super::main_component(graph, name)?;
    let mut routers: Vec<NodeId> = graph.node_ids().cloned().collect();
    let n_sources = (source_ratio * routers.len() as f64).floor() as usize;
    if n_sources == 0 {
        return Err(TopologyError::config(format!(
            "{}: source_ratio {} yields no source for {} routers",
            name,
            source_ratio,
            routers.len()
        )));
    }

    // stable sort keeps file order among equal degrees
    routers.sort_by(|a, b| graph.degree(b).cmp(&graph.degree(a)));

    let mut sources = Vec::with_capacity(n_sources);
    for (i, router) in routers.iter().take(n_sources).enumerate() {
        let source = NodeId::Name(format!("src_{}", i));
        let link = Link {
            delay: external_delay,
            kind: LinkType::External,
            ..Link::default()
        };
        graph.add_link(source.clone(), router.clone(), link)?;
        graph.add_node(source.clone()).synthetic = true;
        sources.push(source);
    }

    let mut receivers = Vec::with_capacity(routers.len());
    for (i, router) in routers.iter().enumerate() {
        let receiver = NodeId::Name(format!("rec_{}", i));
        let link = Link {
            delay: 0.0,
            ..Link::default()
        };
        graph.add_link(receiver.clone(), router.clone(), link)?;
        graph.add_node(receiver.clone()).synthetic = true;
        receivers.push(receiver);
    }

    links::set_weights_from_delays(&mut graph, MIN_LATENCY_WEIGHT)?;
    debug!(
        "{}: attached {} sources and {} receivers to {} routers",
        name,
        sources.len(),
        receivers.len(),
        routers.len()
    );

    let mut builder = TopologyBuilder::from_graph(name, graph);
    builder.assign_roles(sources, Role::Source)?;
    builder.assign_roles(receivers, Role::Receiver)?;
    builder.assign_roles(routers, Role::Router)?;
    Ok(builder)
}
