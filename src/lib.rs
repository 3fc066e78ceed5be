//! # icntopo - Topology construction for ICN cache-placement simulations
//!
//! This library builds the network topologies that information-centric
//! networking experiments run on: which nodes originate content, which
//! request it, which forward it, and which routers may host a cache.
//!
//! ## Overview
//!
//! Every topology is an undirected graph where each node carries exactly one
//! role (source, receiver, router or gateway) and each link carries a
//! weight, a delay and an internal/external type. Topologies come from
//! named families: synthetic generators (paths, trees, rings, meshes),
//! fixed reference networks (SINET, an asymmetric tree) and importers for
//! real datasets (GML backbones, RocketFuel maps, latency lists, JSON
//! connection lists).
//!
//! ## Key Features
//!
//! - **Strict Two-Phase Build**: A `TopologyBuilder` assembles the graph;
//!   `finish()` validates it and freezes it into a `Topology`
//! - **Cache Candidate Policies**: All routers, degree threshold,
//!   betweenness percentile or curated lists
//! - **Source Isolation**: Links touching sources are external and heavily
//!   weighted, so shortest paths never transit a source
//! - **Static Registry**: One table maps family names to builders with
//!   typed, defaulted parameters
//! - **Deterministic**: The same inputs always give the same topology
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `graph`: Undirected attributed graph and the algorithms over it
//! - `topology`: Node ids, roles, the builder and the frozen topology
//! - `links`: Weight, delay and link-type annotation
//! - `candidates`: Cache candidate selection policies
//! - `parsers`: Dataset readers and real-topology importers
//! - `families`: Synthetic, fixed, dataset and preset topology families
//! - `registry`: Name to builder lookup and parameter resolution
//! - `config` / `config_loader`: YAML experiment files
//! - `error`: The error taxonomy shared by all of the above
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use icntopo::registry::{BuildContext, Registry, TopologyRequest};
//!
//! let request = TopologyRequest::new("TREE").param("k", 2).param("h", 3);
//! let topology = Registry::global().build_request(&request, &BuildContext::default())?;
//!
//! println!(
//!     "{} sources, {} receivers, {} cache candidates",
//!     topology.sources().len(),
//!     topology.receivers().len(),
//!     topology.icr_candidates().len()
//! );
//! # Ok::<(), icntopo::error::TopologyError>(())
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`error::Result`], failing fast with a
//! [`error::TopologyError`]. The binary and the config loader wrap these
//! with `color_eyre` context.

pub mod candidates;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod families;
pub mod graph;
pub mod links;
pub mod parsers;
pub mod registry;
pub mod topology;
