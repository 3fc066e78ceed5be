use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use icntopo::config_loader::{self, CliOverrides};
use icntopo::parsers::ConnectionList;
use icntopo::registry::{BuildContext, Factory, Params, Registry, DEFAULT_RESOURCE_ROOT};
use icntopo::topology::Topology;

/// Topology construction for ICN cache-placement simulations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Default log filter (RUST_LOG takes precedence)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Worker threads for parallel checks (0 = one per core)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    threads: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the topology an experiment file describes
    Build {
        /// Path to the experiment configuration YAML file
        #[arg(short, long)]
        config: PathBuf,

        /// Write a JSON snapshot of the topology here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the resource root from the config file
        #[arg(long)]
        resources: Option<PathBuf>,
    },
    /// List registered topology families and their parameters
    List,
    /// Build every family that needs no parameters and report the outcome
    Check {
        /// Directory holding the dataset files
        #[arg(long, default_value = DEFAULT_RESOURCE_ROOT)]
        resources: PathBuf,
    },
    /// Write a random connected connection list
    GenerateRandom {
        /// Number of nodes
        #[arg(short, long)]
        nodes: u64,

        /// Probability of a link between any two nodes
        #[arg(short = 'p', long, default_value = "0.1")]
        edge_probability: f64,

        /// Seed for the random generator
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();

    // Initialize logging with the requested default filter
    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level)).init();

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .wrap_err("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Build {
            config,
            output,
            resources,
        } => run_build(&config, output.as_deref(), resources),
        Commands::List => {
            list_families();
            Ok(())
        }
        Commands::Check { resources } => run_check(&resources),
        Commands::GenerateRandom {
            nodes,
            edge_probability,
            seed,
            output,
        } => run_generate_random(nodes, edge_probability, seed, &output),
    }
}

fn run_build(config_path: &Path, output: Option<&Path>, resources: Option<PathBuf>) -> Result<()> {
    let mut config = config_loader::load_config(config_path)?;
    config_loader::apply_overrides(&mut config, &CliOverrides { resources })?;

    let ctx = config.build_context();
    info!("Resource root: {:?}", ctx.resource_root());

    let topology = Registry::global()
        .build_request(&config.topology, &ctx)
        .wrap_err_with(|| format!("Failed to build topology '{}'", config.topology.name))?;
    print_summary(&topology);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&topology.snapshot())
            .wrap_err("Failed to serialize topology snapshot")?;
        fs::write(path, json)
            .wrap_err_with(|| format!("Failed to write snapshot '{}'", path.display()))?;
        info!("Wrote topology snapshot to {:?}", path);
    }
    Ok(())
}

fn print_summary(topology: &Topology) {
    println!("Topology: {}", topology.name());
    println!("  nodes:      {}", topology.node_count());
    println!("  links:      {}", topology.edge_count());
    println!("  sources:    {}", topology.sources().len());
    println!("  receivers:  {}", topology.receivers().len());
    println!("  routers:    {}", topology.routers().len());
    println!("  gateways:   {}", topology.gateways().len());
    println!("  candidates: {}", topology.icr_candidates().len());
}

fn list_families() {
    for factory in Registry::global().factories() {
        println!("{:<18} {}", factory.name, factory.summary);
        for param in factory.params {
            let aliases = if param.aliases.is_empty() {
                String::new()
            } else {
                format!(" (alias: {})", param.aliases.join(", "))
            };
            println!(
                "    {:<18} {:<7} default {:<18} {}{}",
                param.name,
                param.kind.to_string(),
                param.default.to_string(),
                param.help,
                aliases
            );
        }
    }
}

/// Outcome of building one family during `check`
enum CheckOutcome {
    Built { nodes: usize, candidates: usize },
    Skipped,
    Failed(String),
}

fn check_family(factory: &Factory, ctx: &BuildContext) -> CheckOutcome {
    if !Params::all_defaulted(factory.params) {
        return CheckOutcome::Skipped;
    }
    match Registry::global().build(factory.name, &BTreeMap::new(), None, ctx) {
        Ok(t) => CheckOutcome::Built {
            nodes: t.node_count(),
            candidates: t.icr_candidates().len(),
        },
        Err(e) => CheckOutcome::Failed(e.to_string()),
    }
}

fn run_check(resources: &Path) -> Result<()> {
    let ctx = BuildContext::new(resources);
    let factories: Vec<&Factory> = Registry::global().factories().collect();
    info!("Checking {} families against {:?}", factories.len(), resources);

    let outcomes: Vec<(&Factory, CheckOutcome)> = factories
        .par_iter()
        .map(|&f| (f, check_family(f, &ctx)))
        .collect();

    let mut failed = 0;
    for (factory, outcome) in &outcomes {
        match outcome {
            CheckOutcome::Built { nodes, candidates } => println!(
                "ok      {:<18} {} nodes, {} candidates",
                factory.name, nodes, candidates
            ),
            CheckOutcome::Skipped => println!("skipped {:<18} required parameters", factory.name),
            CheckOutcome::Failed(reason) => {
                failed += 1;
                warn!("{} failed: {}", factory.name, reason);
                println!("FAILED  {:<18} {}", factory.name, reason);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} families failed to build", failed, outcomes.len());
    }
    Ok(())
}

fn run_generate_random(nodes: u64, edge_probability: f64, seed: u64, output: &Path) -> Result<()> {
    let list = ConnectionList::random(nodes, edge_probability, seed)
        .wrap_err("Failed to generate random connection list")?;
    list.save(output)
        .wrap_err_with(|| format!("Failed to write '{}'", output.display()))?;
    info!(
        "Wrote {} connections between {} nodes to {:?}",
        list.connections.len(),
        nodes,
        output
    );
    Ok(())
}
