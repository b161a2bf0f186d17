//! Traceroute child-process orchestration.
//!
//! Parallelism comes purely from operating-system child processes: a
//! whole chunk of traceroutes is spawned before any of them is awaited,
//! then each is drained in launch order. Outcomes are paired with their
//! host explicitly, never by completion order.

pub mod ping;
pub mod route;

use crate::config::{Config, IpStack, ScanSettings};
use crate::gateway::{self, Gateway, GatewayResult, ScanState, Selection};
use crate::resolver::{self, AddressResolver, ReverseNameCache};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use self::ping::ReachabilityProber;
use std::io::Write;
use std::process::{Child, Command, Stdio};

/// Runtime flags of a scan
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Re-raise per-host lookup and spawn errors instead of recording
    /// them as failed outcomes
    pub debug: bool,
    /// Suppress per-host progress marks and diagnostics
    pub silent: bool,
}

enum Launch {
    Spawned(Child),
    Error(String),
}

/// Scan one chunk of hosts and return an outcome per host.
///
/// Hosts whose traceroute produced no output at all are soft-skipped:
/// they are absent from the returned pairs (with `debug` set this is a
/// hard error instead, since it usually means traceroute is missing or
/// lacks privileges).
#[allow(clippy::too_many_arguments)]
pub fn scan_chunk(
    config: &Config,
    resolver: &dyn AddressResolver,
    prober: &dyn ReachabilityProber,
    cache: &mut ReverseNameCache,
    monitoring_host: Option<&str>,
    monitoring_ip: Option<&str>,
    hosts: &[String],
    settings: &ScanSettings,
    opts: &ScanOptions,
) -> Result<Vec<(String, GatewayResult)>> {
    // Launch the whole chunk before awaiting anything
    let mut launched: Vec<(String, Option<String>, Launch)> = Vec::with_capacity(hosts.len());
    for host in hosts {
        if config.ip_stack(host) == IpStack::NoIp {
            launched.push((
                host.clone(),
                None,
                Launch::Error("Configured to be a No-IP host".to_string()),
            ));
            continue;
        }

        let ip = match resolver.resolve(host) {
            Ok(ip) => ip,
            Err(e) => {
                if opts.debug {
                    return Err(e.into());
                }
                launched.push((host.clone(), None, Launch::Error(e.to_string())));
                continue;
            }
        };

        let mut command = Command::new("traceroute");
        command
            .arg("-w")
            .arg(settings.timeout.to_string())
            .arg("-q")
            .arg(settings.probes.to_string())
            .arg("-m")
            .arg(settings.max_ttl.to_string())
            .arg("-n")
            .arg(&ip)
            // Force non-localized output; the parser depends on it
            .env("LANG", "")
            .env("LC_ALL", "")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        log::debug!("Running {:?}", command);

        match command.spawn() {
            Ok(child) => launched.push((host.clone(), Some(ip), Launch::Spawned(child))),
            Err(e) => {
                if opts.debug {
                    return Err(eyre!("Failed to start traceroute for {}: {}", host, e));
                }
                launched.push((host.clone(), Some(ip), Launch::Error(e.to_string())));
            }
        }
    }

    // All children are running; drain them in launch order
    let mut results: Vec<(String, GatewayResult)> = Vec::with_capacity(launched.len());
    for (host, ip, launch) in launched {
        let output = match launch {
            Launch::Error(message) => {
                dot(opts.silent, '*');
                results.push((
                    host,
                    GatewayResult::new(None, ScanState::Failed, 0, message),
                ));
                continue;
            }
            Launch::Spawned(child) => child
                .wait_with_output()
                .map_err(|e| eyre!("Failed to read traceroute output for {}: {}", host, e))?,
        };

        if !output.stderr.is_empty() {
            log::debug!(
                "{}: traceroute stderr: {}",
                host,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        let lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|l| l.trim().to_string())
            .collect();

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1) & 0xff;
            dot(opts.silent, '*');
            results.push((
                host,
                GatewayResult::new(
                    None,
                    ScanState::Failed,
                    0,
                    format!("Traceroute failed with exit code {}", code),
                ),
            ));
            continue;
        }

        if lines.len() == 1 && lines[0].starts_with("ERROR:") {
            let message = lines[0]["ERROR:".len()..].trim().to_string();
            log::error!("{}: {}", host, message);
            dot(opts.silent, 'D');
            results.push((
                host,
                GatewayResult::new(None, ScanState::DnsError, 0, message),
            ));
            continue;
        }

        if lines.is_empty() {
            if opts.debug {
                return Err(eyre!(
                    "Cannot execute traceroute for {}. Is traceroute installed? Are you root?",
                    host
                ));
            }
            // Soft skip: no outcome is recorded for this host
            dot(opts.silent, '!');
            continue;
        }

        let routes = match route::parse_routes(&host, &lines, opts.silent) {
            Ok(routes) => routes,
            Err(error) => {
                dot(opts.silent, 'o');
                results.push((
                    host,
                    GatewayResult::new(None, ScanState::Garbled, 0, error),
                ));
                continue;
            }
        };

        // Every spawned child had a resolved address
        let host_ip = ip.as_deref().unwrap_or_default();
        let outcome = match gateway::select_gateway(
            &routes,
            host_ip,
            monitoring_host,
            monitoring_ip,
            settings.ping_probes,
            prober,
        ) {
            Selection::Root => {
                dot(opts.silent, 'N');
                GatewayResult::new(None, ScanState::Root, 0, "")
            }
            Selection::Direct {
                via_monitoring: true,
            } => {
                dot(opts.silent, 'L');
                let gw = Gateway {
                    existing_host: monitoring_host.map(str::to_string),
                    ip: monitoring_ip.unwrap_or_default().to_string(),
                    dns_name: None,
                };
                GatewayResult::new(Some(gw), ScanState::Direct, 0, "")
            }
            Selection::Direct {
                via_monitoring: false,
            } => {
                dot(opts.silent, 'o');
                GatewayResult::new(None, ScanState::Direct, 0, "")
            }
            Selection::NotFound { skipped } => {
                let error = "No usable routing information";
                if !opts.silent {
                    log::error!("{}: {}", host, error);
                }
                log::debug!(
                    "{}: rejected {} unreachable gateway candidates",
                    host,
                    skipped
                );
                dot(opts.silent, 'o');
                GatewayResult::new(None, ScanState::NotFound, 0, error)
            }
            Selection::Gateway {
                ip: gateway_ip,
                skipped,
            } => {
                cache.ensure_populated(config, resolver);
                let existing_host = cache.lookup(&gateway_ip).map(str::to_string);
                match &existing_host {
                    Some(name) => log::debug!("{}: gateway {} ({})", host, name, gateway_ip),
                    None => log::debug!("{}: gateway {}", host, gateway_ip),
                }
                let dns_name = resolver::ip_to_dnsname(&gateway_ip);
                dot(opts.silent, 'G');
                GatewayResult::new(
                    Some(Gateway {
                        existing_host,
                        ip: gateway_ip,
                        dns_name,
                    }),
                    ScanState::Gateway,
                    skipped,
                    "",
                )
            }
        };
        results.push((host, outcome));
    }

    Ok(results)
}

/// Single-character progress mark, one per drained host
fn dot(silent: bool, mark: char) {
    if !silent {
        print!("{}", mark);
        let _ = std::io::stdout().flush();
    }
}
