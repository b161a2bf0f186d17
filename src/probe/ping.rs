//! Ping-based reachability check for gateway candidates.

use std::process::{Command, Stdio};

/// Capability to check whether a candidate gateway answers pings
pub trait ReachabilityProber {
    fn is_reachable(&self, ip: &str, probes: u32) -> bool;
}

/// Prober invoking the system ping binary.
///
/// Probes are sent at a 0.2s interval with a 5-second overall deadline,
/// so a dead candidate costs at most 5 seconds per host.
pub struct PingProber;

impl ReachabilityProber for PingProber {
    fn is_reachable(&self, ip: &str, probes: u32) -> bool {
        Command::new("ping")
            .args(["-q", "-i", "0.2", "-l", "3"])
            .arg("-c")
            .arg(probes.to_string())
            .args(["-W", "5"])
            .arg(ip)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}
