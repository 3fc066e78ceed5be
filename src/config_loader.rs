use crate::config::ExperimentConfig;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Load and parse an experiment configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<ExperimentConfig> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open config file {:?}", config_path))?;

    let config: ExperimentConfig = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse config file {:?}", config_path))?;

    config.validate()?;

    info!("Experiment uses topology family {}", config.topology.name);
    Ok(config)
}

/// Command-line settings that take precedence over the YAML file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub resources: Option<PathBuf>,
}

/// Apply CLI overrides to a loaded configuration
pub fn apply_overrides(config: &mut ExperimentConfig, overrides: &CliOverrides) -> Result<()> {
    if let Some(resources) = &overrides.resources {
        info!("Resource root overridden to {:?}", resources);
        config.resources = Some(resources.clone());
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}
