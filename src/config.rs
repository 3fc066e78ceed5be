//! Experiment configuration.
//!
//! An experiment file names one topology family, its parameters and,
//! optionally, a candidate policy that replaces the family's own.
//!
//! ```yaml
//! resources: resources/topologies
//! topology:
//!   name: TREE
//!   k: 2
//!   h: 5
//!   candidates:
//!     policy: top_percentile_betweenness
//!     fraction: 0.5
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::candidates::CandidatePolicy;
use crate::registry::{BuildContext, TopologyRequest, DEFAULT_RESOURCE_ROOT};

/// Top-level experiment file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Directory holding the dataset files
    #[serde(default)]
    pub resources: Option<PathBuf>,
    pub topology: TopologyRequest,
}

impl ExperimentConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.topology.name.trim().is_empty() {
            return Err(ValidationError::InvalidTopology(
                "topology name cannot be empty".to_string(),
            ));
        }

        if let Some(policy) = &self.topology.candidates {
            Self::validate_policy(policy)?;
        }

        if let Some(resources) = &self.resources {
            if resources.as_os_str().is_empty() {
                return Err(ValidationError::InvalidResources(
                    "resources path cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn validate_policy(policy: &CandidatePolicy) -> Result<(), ValidationError> {
        match policy {
            CandidatePolicy::TopPercentileBetweenness { fraction } => {
                if !(0.0..=1.0).contains(fraction) {
                    return Err(ValidationError::InvalidCandidates(format!(
                        "fraction must be within [0, 1], got {}",
                        fraction
                    )));
                }
            }
            // list members are checked against the routers at build time
            CandidatePolicy::ExplicitList { .. }
            | CandidatePolicy::AllRouters
            | CandidatePolicy::DegreeThreshold { .. } => {}
        }
        Ok(())
    }

    /// Resource root, falling back to the default directory
    pub fn resource_root(&self) -> &Path {
        self.resources
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_RESOURCE_ROOT))
    }

    pub fn build_context(&self) -> BuildContext {
        BuildContext::new(self.resource_root())
    }
}

/// Validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid topology configuration: {0}")]
    InvalidTopology(String),
    #[error("Invalid candidate policy: {0}")]
    InvalidCandidates(String),
    #[error("Invalid resources configuration: {0}")]
    InvalidResources(String),
}
