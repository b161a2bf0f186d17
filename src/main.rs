use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use parentscan::config;
use parentscan::orchestrator;
use parentscan::probe::ScanOptions;

/// Network parent-topology scanner for monitoring host configurations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the host inventory YAML file
    #[arg(short, long)]
    config: PathBuf,

    /// Path of the generated parents configuration file
    #[arg(short, long, default_value = "parents.mk")]
    output: PathBuf,

    /// Hosts to scan (default: all active and online inventory hosts)
    hosts: Vec<String>,

    /// Maximum number of traceroute processes to run in parallel
    #[arg(long)]
    procs: Option<usize>,

    /// Ping probes per gateway candidate (0 disables the check)
    #[arg(long)]
    ping_probes: Option<u32>,

    /// Also write per-host scan outcomes as JSON
    #[arg(long)]
    results: Option<PathBuf>,

    /// Re-raise per-host lookup errors instead of recording them
    #[arg(long)]
    debug: bool,

    /// Suppress per-host progress output
    #[arg(long)]
    silent: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Starting parent scan");
    info!("Inventory file: {:?}", args.config);
    info!("Output file: {:?}", args.output);

    let mut inventory = config::load_config(&args.config)?;

    // CLI overrides for the inventory's scan settings
    if let Some(procs) = args.procs {
        inventory.scan.max_processes = procs;
    }
    if let Some(ping_probes) = args.ping_probes {
        inventory.scan.ping_probes = ping_probes;
    }
    inventory.scan.validate()?;

    let opts = ScanOptions {
        debug: args.debug,
        silent: args.silent,
    };

    orchestrator::scan_parents(
        &inventory,
        &args.hosts,
        &args.output,
        args.results.as_deref(),
        &opts,
    )?;

    info!("Parent scan completed successfully");
    Ok(())
}
