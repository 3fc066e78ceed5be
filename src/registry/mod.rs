//! # Topology Registry Module
//!
//! This module maps topology family names to the functions that build them.
//! Experiment configurations only ever name a family and a bag of
//! parameters; the registry turns that pair into a validated
//! [`Topology`].
//!
//! ## Registration
//!
//! Families are listed in one static table, [`FACTORIES`]. Each entry holds:
//!
//! - the family name as used in configuration files (`TREE`, `GARR_2`, ...)
//! - a one-line summary for `icntopo list`
//! - the declared parameters ([`ParamSpec`]) with types, aliases and defaults
//! - the build function
//!
//! The table is wrapped once in a [`Registry`] behind a `OnceLock` and is
//! read-only afterwards, so lookups are safe from any thread.
//!
//! ## Build Process
//!
//! 1. **Lookup**: Find the family, ignoring case
//! 2. **Parameter Resolution**: Match the raw bag to the declared parameters,
//!    filling defaults and rejecting unknown keys
//! 3. **Assembly**: Run the family's build function, which returns a
//!    builder with every node placed and every role assigned
//! 4. **Finishing**: Apply the caller's candidate policy if one was given,
//!    then validate roles and links and compute the candidate set
//!
//! ## Resource Files
//!
//! Dataset-backed families read their files relative to the resource root
//! carried by [`BuildContext`]:
//!
//! ```text
//! resources/topologies/
//! |-- telstra-link.txt
//! |-- random_1.json
//! |-- Geant2012.gml
//! |-- Garr201201.gml
//! |-- WideJpn.gml
//! |-- 3257.r0.cch
//! \-- rocketfuel-latency/<asn>/latencies.intra
//! ```
//!
//! ## Parameter Aliases
//!
//! Short names follow the usual notation (`k`, `h`, `n`, `m`); the
//! descriptive names (`branching_factor`, `router_count`, ...) are accepted
//! as aliases. Giving both spellings of one parameter is an error.

pub mod params;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::debug;
use serde::Deserialize;

use crate::candidates::CandidatePolicy;
use crate::error::{Result, TopologyError};
use crate::families::{datasets, fixed, presets, synthetic, Assembled};
use crate::topology::Topology;

// Re-export key types from params module for easier access
pub use params::{ParamDefault, ParamKind, ParamSpec, Params};

/// Default resource root, relative to the working directory
pub const DEFAULT_RESOURCE_ROOT: &str = "resources/topologies";

/// Everything a build function needs besides its parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    resource_root: PathBuf,
}

impl BuildContext {
    pub fn new(resource_root: impl Into<PathBuf>) -> Self {
        Self {
            resource_root: resource_root.into(),
        }
    }

    pub fn resource_root(&self) -> &Path {
        &self.resource_root
    }

    /// Path of a dataset file under the resource root
    pub fn resource(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.resource_root.join(relative)
    }
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new(DEFAULT_RESOURCE_ROOT)
    }
}

pub type BuildFn = fn(&Params, &BuildContext) -> Result<Assembled>;

/// One registered topology family
#[derive(Debug, Clone, Copy)]
pub struct Factory {
    pub name: &'static str,
    pub summary: &'static str,
    pub params: &'static [ParamSpec],
    pub build: BuildFn,
}

impl Factory {
    /// True for families that read nothing from the resource root
    pub fn is_synthetic(&self) -> bool {
        !self.params.iter().any(|p| p.name == "file" || p.name == "asn")
    }
}

use ParamDefault::{Float, Int, Required, Str};
use ParamKind::{Float as F, Int as I, Str as S};

const DELAY: ParamSpec = ParamSpec::new("delay", F, Float(1.0))
    .aliases(&["delay_ms"])
    .help("delay of every link (ms)");
const DELAY_INT: ParamSpec = ParamSpec::new("delay_int", F, Float(1.0))
    .aliases(&["internal_delay_ms"])
    .help("delay of router links (ms)");
const DELAY_EXT: ParamSpec = ParamSpec::new("delay_ext", F, Float(5.0))
    .aliases(&["external_delay_ms"])
    .help("delay of source links (ms)");
const K: ParamSpec = ParamSpec::new("k", I, Required)
    .aliases(&["branching_factor"])
    .help("branching factor");
const RECEIVERS: ParamSpec = ParamSpec::new("receivers", S, Str("all"))
    .help("receiver placement: all or leaves");

const fn file(default: &'static str) -> ParamSpec {
    ParamSpec::new("file", S, Str(default)).help("dataset file under the resource root")
}

const fn telstra_params() -> [ParamSpec; 3] {
    [
        file("telstra-link.txt"),
        ParamSpec::new("source_attachment", S, Str("bb-1784")).help("node the source hangs off"),
        DELAY,
    ]
}

const fn backbone_params(default: &'static str) -> [ParamSpec; 3] {
    [file(default), RECEIVERS, DELAY]
}

static PATH_PARAMS: [ParamSpec; 2] = [
    ParamSpec::new("n", I, Required).aliases(&["node_count"]).help("number of nodes (>= 3)"),
    DELAY,
];
static TREE_PARAMS: [ParamSpec; 3] = [
    K,
    ParamSpec::new("h", I, Required).aliases(&["height"]).help("tree height"),
    DELAY,
];
static TREE_EDGE_PARAMS: [ParamSpec; 3] = [
    K,
    ParamSpec::new("h", I, Int(0))
        .aliases(&["height"])
        .help("accepted for TREE compatibility, unused"),
    DELAY,
];
static RING_PARAMS: [ParamSpec; 3] = [
    ParamSpec::new("n", I, Required).aliases(&["router_count"]).help("number of routers (>= 3)"),
    DELAY_INT,
    DELAY_EXT,
];
static MESH_PARAMS: [ParamSpec; 4] = [
    ParamSpec::new("n", I, Required).aliases(&["router_count"]).help("number of routers (>= 2)"),
    ParamSpec::new("m", I, Required).aliases(&["source_count"]).help("number of sources (<= n)"),
    DELAY_INT,
    DELAY_EXT,
];
static DELAY_ONLY: [ParamSpec; 1] = [DELAY];
static TELSTRA_PARAMS: [ParamSpec; 3] = telstra_params();
static RANDOM_PARAMS: [ParamSpec; 3] = [
    file("random_1.json"),
    ParamSpec::new("source_degree", I, Int(20)).help("degree of the node the source hangs off"),
    DELAY,
];
static RANDOM3_PARAMS: [ParamSpec; 2] = [file("random_750.json"), DELAY];
static RANDOM4_PARAMS: [ParamSpec; 2] = [file("random_1000.json"), DELAY];
static ROCKET_FUEL_PARAMS: [ParamSpec; 3] = [
    ParamSpec::new("asn", I, Required).aliases(&["as_identifier"]).help("autonomous system number"),
    ParamSpec::new("source_ratio", F, Float(0.1)).help("fraction of routers with a source"),
    ParamSpec::new("external_delay_ms", F, Float(34.0))
        .aliases(&["ext_delay"])
        .help("delay of source links (ms)"),
];
static GEANT_PARAMS: [ParamSpec; 3] = backbone_params("Geant2012.gml");
static GARR_PARAMS: [ParamSpec; 3] = backbone_params("Garr201201.gml");
static WIDE_PARAMS: [ParamSpec; 3] = backbone_params("WideJpn.gml");
static TISCALI_PARAMS: [ParamSpec; 3] = backbone_params("3257.r0.cch");
static BACKBONE_PARAMS: [ParamSpec; 3] = [
    ParamSpec::new("file", S, Required).help("GML, cch or adjacency file under the resource root"),
    RECEIVERS,
    DELAY,
];
static GEANT_2_PARAMS: [ParamSpec; 1] = [file("Geant2012.gml")];
static GARR_2_PARAMS: [ParamSpec; 1] = [file("Garr201201.gml")];
static TISCALI_2_PARAMS: [ParamSpec; 1] = [file("3257.r0.cch")];

const fn factory(
    name: &'static str,
    summary: &'static str,
    params: &'static [ParamSpec],
    build: BuildFn,
) -> Factory {
    Factory {
        name,
        summary,
        params,
        build,
    }
}

/// Every registered topology family
pub static FACTORIES: &[Factory] = &[
    factory("PATH", "receiver, routers and source on a line", &PATH_PARAMS, synthetic::path),
    factory("TREE", "k-ary tree, source at the root", &TREE_PARAMS, synthetic::tree),
    factory("TREE-EDGE", "gateway chain fanning out to k edge routers", &TREE_EDGE_PARAMS, synthetic::tree_edge),
    factory("TREE-COOR-EDGE", "k-ary tree with gateways above the two lowest levels", &TREE_PARAMS, synthetic::tree_coor_edge),
    factory("RING", "ring of routers with one source", &RING_PARAMS, synthetic::ring),
    factory("MESH", "full mesh of routers with m sources", &MESH_PARAMS, synthetic::mesh),
    factory("SINET", "SINET backbone, receiver on every router", &DELAY_ONLY, fixed::sinet_full),
    factory("SINET-EDGE", "SINET backbone, receivers on spoke routers", &DELAY_ONLY, fixed::sinet_edge),
    factory("ATREE", "asymmetric three-tier tree", &DELAY_ONLY, fixed::atree_plain),
    factory("EATREE", "asymmetric tree, upper tiers as gateways", &DELAY_ONLY, fixed::atree_edge),
    factory("CEATREE", "asymmetric tree, top tiers as gateways", &DELAY_ONLY, fixed::atree_coor_edge),
    factory("NCEATREE", "asymmetric tree with the root as source", &DELAY_ONLY, fixed::atree_coor_edge_root_source),
    factory("TELSTRA", "Telstra link list, every tier routes", &TELSTRA_PARAMS, datasets::telstra_all),
    factory("TELSTRA-EDGE", "Telstra link list, only leaves route", &TELSTRA_PARAMS, datasets::telstra_edge),
    factory("TELSTRA-COOR-EDGE", "Telstra link list, gateways and leaves route", &TELSTRA_PARAMS, datasets::telstra_coor_edge),
    factory("RANDOM", "random connection list, single source", &RANDOM_PARAMS, datasets::random_single_source),
    factory("RANDOM3", "750-node connection list, source on every node", &RANDOM3_PARAMS, datasets::random_750),
    factory("RANDOM4", "1000-node connection list, source on every node", &RANDOM4_PARAMS, datasets::random_1000),
    factory("ROCKET_FUEL", "RocketFuel latency map of one AS", &ROCKET_FUEL_PARAMS, datasets::rocket_fuel),
    factory("GEANT", "GEANT backbone", &GEANT_PARAMS, datasets::geant),
    factory("GARR", "GARR backbone", &GARR_PARAMS, datasets::garr),
    factory("WIDE", "WIDE backbone", &WIDE_PARAMS, datasets::wide),
    factory("TISCALI", "Tiscali RocketFuel map as a backbone", &TISCALI_PARAMS, datasets::tiscali),
    factory("BACKBONE", "any backbone file", &BACKBONE_PARAMS, datasets::backbone),
    factory("GEANT_2", "GEANT with leaf receivers and central caches", &GEANT_2_PARAMS, presets::geant2),
    factory("GARR_2", "GARR with curated sources and receivers", &GARR_2_PARAMS, presets::garr2),
    factory("TISCALI_2", "Tiscali with leaves split into sources and receivers", &TISCALI_2_PARAMS, presets::tiscali2),
];

/// Read-only lookup over [`FACTORIES`]
#[derive(Debug)]
pub struct Registry {
    factories: BTreeMap<String, &'static Factory>,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

impl Registry {
    fn from_table(table: &'static [Factory]) -> Self {
        let factories = table
            .iter()
            .map(|f| (f.name.to_ascii_uppercase(), f))
            .collect();
        Self { factories }
    }

    /// The process-wide registry, built on first use
    pub fn global() -> &'static Registry {
        REGISTRY.get_or_init(|| Registry::from_table(FACTORIES))
    }

    /// Look up a family by name, ignoring case
    pub fn get(&self, name: &str) -> Result<&'static Factory> {
        self.factories
            .get(&name.trim().to_ascii_uppercase())
            .copied()
            .ok_or_else(|| TopologyError::UnknownTopology(name.to_string()))
    }

    /// Registered families in table order
    pub fn factories(&self) -> impl Iterator<Item = &'static Factory> {
        FACTORIES.iter()
    }

    /// Build and validate one topology
    ///
    /// # Arguments
    ///
    /// * `name` - Family name, case-insensitive
    /// * `raw` - Parameter bag; keys may use the declared aliases
    /// * `candidates` - Optional policy replacing the family's own
    /// * `ctx` - Where dataset files are read from
    ///
    /// # Returns
    ///
    /// The validated topology, or the first error met while resolving
    /// parameters, reading files or validating the result
    pub fn build(
        &self,
        name: &str,
        raw: &BTreeMap<String, serde_yaml::Value>,
        candidates: Option<&CandidatePolicy>,
        ctx: &BuildContext,
    ) -> Result<Topology> {
        let factory = self.get(name)?;
        let params = Params::resolve(factory.name, factory.params, raw)?;
        debug!("Building {} with {:?}", factory.name, params);

        let Assembled { builder, policy } = (factory.build)(&params, ctx)?;
        let policy = candidates.unwrap_or(&policy);
        builder.finish(policy)
    }

    /// Build the topology a [`TopologyRequest`] describes
    pub fn build_request(&self, request: &TopologyRequest, ctx: &BuildContext) -> Result<Topology> {
        self.build(&request.name, &request.params, request.candidates.as_ref(), ctx)
    }
}

/// A family name with its parameter bag, as written in experiment files
///
/// ```yaml
/// name: MESH
/// n: 6
/// m: 2
/// candidates:
///   policy: degree_threshold
///   min_degree: 3
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopologyRequest {
    pub name: String,
    #[serde(default)]
    pub candidates: Option<CandidatePolicy>,
    #[serde(flatten)]
    pub params: BTreeMap<String, serde_yaml::Value>,
}

impl TopologyRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            candidates: None,
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<serde_yaml::Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }
}
