//! Topology families.
//!
//! Each family assembles a graph, annotates its links and assigns roles,
//! then hands the builder back together with the candidate policy it uses
//! by default. The registry applies any policy override and finishes the
//! build, so validation always runs on the complete graph.

pub mod datasets;
pub mod fixed;
pub mod presets;
pub mod synthetic;

use crate::candidates::CandidatePolicy;
use crate::error::Result;
use crate::graph::Graph;
use crate::links::{self, DelayUnit, Links};
use crate::topology::builder::TopologyBuilder;

/// Unit weight and a constant delay on every link
pub(crate) fn annotate_uniform(graph: &mut Graph, delay_ms: f64) -> Result<()> {
    links::set_weights_constant(graph, 1.0, Links::All)?;
    links::set_delays_constant(graph, delay_ms, DelayUnit::Milliseconds, Links::All)
}

/// A fully assembled topology waiting for validation
#[derive(Debug, Clone)]
pub struct Assembled {
    pub builder: TopologyBuilder,
    pub policy: CandidatePolicy,
}

impl Assembled {
    /// Every router is a cache candidate
    pub fn all_routers(builder: TopologyBuilder) -> Self {
        Self::with_policy(builder, CandidatePolicy::AllRouters)
    }

    pub fn with_policy(builder: TopologyBuilder, policy: CandidatePolicy) -> Self {
        Self { builder, policy }
    }
}
