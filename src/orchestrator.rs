//! Scan orchestration.
//!
//! Drives the whole run: precondition checks, chunking the host list,
//! folding chunk results into the topology, and writing the output
//! artifacts once at the end.

use crate::config::{Config, IpStack};
use crate::emitter;
use crate::gateway::GatewayResult;
use crate::probe::ping::PingProber;
use crate::probe::{self, ScanOptions};
use crate::resolver::{AddressResolver, InventoryResolver, ReverseNameCache};
use crate::topology::TopologyState;
use crate::utils;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::Serialize;
use std::io::Write as _;
use std::path::Path;

/// One host outcome in the optional JSON export
#[derive(Serialize)]
struct HostOutcome<'a> {
    host: &'a str,
    #[serde(flatten)]
    result: &'a GatewayResult,
}

/// Scan the given hosts (all active and online inventory hosts when the
/// list is empty) and write the parents configuration file.
pub fn scan_parents(
    config: &Config,
    hosts: &[String],
    output_path: &Path,
    results_path: Option<&Path>,
    opts: &ScanOptions,
) -> Result<()> {
    // Both fatal preconditions are checked before any process is spawned
    if utils::find_in_path("traceroute").is_none() {
        return Err(eyre!(
            "The program \"traceroute\" was not found.\n\
             The parent scan needs this program.\n\
             Please install it and try again."
        ));
    }
    emitter::check_output_file(output_path)?;

    let hosts: Vec<String> = if hosts.is_empty() {
        config.active_online_hosts()
    } else {
        hosts.to_vec()
    };

    let resolver = InventoryResolver::new(config);
    let prober = PingProber;
    let mut cache = ReverseNameCache::new();

    let monitoring_host = config.monitoring_host.as_deref();
    let monitoring_ip = monitoring_host.and_then(|monitoring| {
        if config.ip_stack(monitoring) == IpStack::NoIp {
            return None;
        }
        resolver.resolve(monitoring).ok()
    });

    let settings = &config.scan;
    if !opts.silent {
        print!(
            "Scanning for parents ({} processes)...",
            settings.max_processes
        );
        let _ = std::io::stdout().flush();
    }

    // Hosts with a manual parent are never probed
    let scannable: Vec<String> = hosts
        .into_iter()
        .filter(|host| {
            if config.manual_parents(host).is_empty() {
                true
            } else {
                log::debug!("{}: manual parent configured, skipping", host);
                false
            }
        })
        .collect();

    let mut topology = TopologyState::new();
    let mut outcomes: Vec<(String, GatewayResult)> = Vec::new();

    for chunk in scannable.chunks(settings.max_processes) {
        let results = probe::scan_chunk(
            config,
            &resolver,
            &prober,
            &mut cache,
            monitoring_host,
            monitoring_ip.as_deref(),
            chunk,
            settings,
            opts,
        )?;
        for (host, result) in &results {
            topology.record(monitoring_host, host, result);
        }
        outcomes.extend(results);
    }

    emitter::write_topology(output_path, &topology)?;
    if !opts.silent {
        println!();
    }
    println!("Wrote {}", output_path.display());

    if let Some(results_path) = results_path {
        let export: Vec<HostOutcome> = outcomes
            .iter()
            .map(|(host, result)| HostOutcome { host, result })
            .collect();
        std::fs::write(results_path, serde_json::to_string_pretty(&export)?)?;
        log::info!("Scan outcomes written to {:?}", results_path);
    }

    Ok(())
}
