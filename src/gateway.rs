//! Gateway selection over a parsed hop sequence.

use crate::probe::ping::ReachabilityProber;
use serde::Serialize;

/// Classification of a per-host scan outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    /// The scanned host is the monitoring station itself
    Root,
    /// Host is directly reachable from the monitoring station
    Direct,
    /// A usable gateway hop was selected
    Gateway,
    /// No hop survived the selection heuristics
    NotFound,
    /// traceroute reported a resolution error instead of a route
    DnsError,
    /// traceroute output could not be parsed
    Garbled,
    /// Address lookup or the traceroute process itself failed
    Failed,
}

/// Selected gateway candidate for one host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gateway {
    /// Name of a monitored host already covering this address, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_host: Option<String>,
    pub ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_name: Option<String>,
}

/// Authoritative per-host scan result
#[derive(Debug, Clone, Serialize)]
pub struct GatewayResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Gateway>,
    pub state: ScanState,
    /// Farther candidates rejected because they did not answer pings
    pub skipped_gateways: u32,
    pub message: String,
}

impl GatewayResult {
    pub fn new(
        gateway: Option<Gateway>,
        state: ScanState,
        skipped_gateways: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            state,
            skipped_gateways,
            message: message.into(),
        }
    }
}

/// Outcome of the hop-selection heuristics, before name resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Host address equals the monitoring address
    Root,
    /// Single hop; the monitoring host (when known) becomes the parent
    Direct { via_monitoring: bool },
    /// No hop survived
    NotFound { skipped: u32 },
    /// Selected gateway address
    Gateway { ip: String, skipped: u32 },
}

/// Pick the best gateway hop for a host.
///
/// A single-entry route means the host is directly reachable. Longer
/// routes are scanned from the farthest hop towards the monitoring
/// station, skipping unanswered hops and the host itself; with
/// `ping_probes > 0` each candidate must also answer pings, and every
/// rejected candidate increments the skip count.
pub fn select_gateway(
    routes: &[Option<String>],
    host_ip: &str,
    monitoring_host: Option<&str>,
    monitoring_ip: Option<&str>,
    ping_probes: u32,
    prober: &dyn ReachabilityProber,
) -> Selection {
    if routes.len() == 1 {
        // Whether the scanned host IS the monitoring station can only be
        // decided by comparing addresses; the inventory does not know
        // which of its hosts the scan runs on.
        if Some(host_ip) == monitoring_ip {
            return Selection::Root;
        }
        return Selection::Direct {
            via_monitoring: monitoring_host.is_some() && monitoring_ip.is_some(),
        };
    }

    let mut skipped = 0;
    for route in routes.iter().rev() {
        let Some(candidate) = route else {
            continue;
        };
        if candidate == host_ip {
            continue;
        }
        if ping_probes > 0 && !prober.is_reachable(candidate, ping_probes) {
            log::debug!("not using {}, not reachable", candidate);
            skipped += 1;
            continue;
        }
        return Selection::Gateway {
            ip: candidate.clone(),
            skipped,
        };
    }
    Selection::NotFound { skipped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Prober stub answering from a fixed set of reachable addresses
    struct StubProber {
        reachable: HashSet<String>,
    }

    impl StubProber {
        fn reaching(ips: &[&str]) -> Self {
            Self {
                reachable: ips.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    impl ReachabilityProber for StubProber {
        fn is_reachable(&self, ip: &str, _probes: u32) -> bool {
            self.reachable.contains(ip)
        }
    }

    fn hops(routes: &[&str]) -> Vec<Option<String>> {
        routes
            .iter()
            .map(|r| {
                if *r == "*" {
                    None
                } else {
                    Some(r.to_string())
                }
            })
            .collect()
    }

    #[test]
    fn test_single_hop_root() {
        let selection = select_gateway(
            &hops(&["10.0.0.1"]),
            "10.0.0.1",
            Some("monitor"),
            Some("10.0.0.1"),
            0,
            &StubProber::reaching(&[]),
        );
        assert_eq!(selection, Selection::Root);
    }

    #[test]
    fn test_single_hop_direct_via_monitoring() {
        let selection = select_gateway(
            &hops(&["10.0.0.5"]),
            "10.0.0.5",
            Some("monitor"),
            Some("10.0.0.1"),
            0,
            &StubProber::reaching(&[]),
        );
        assert_eq!(
            selection,
            Selection::Direct {
                via_monitoring: true
            }
        );
    }

    #[test]
    fn test_single_hop_direct_unknown_monitoring() {
        let selection = select_gateway(
            &hops(&["10.0.0.5"]),
            "10.0.0.5",
            None,
            None,
            0,
            &StubProber::reaching(&[]),
        );
        assert_eq!(
            selection,
            Selection::Direct {
                via_monitoring: false
            }
        );
    }

    #[test]
    fn test_farthest_non_self_hop_wins_without_ping() {
        let selection = select_gateway(
            &hops(&["10.0.0.254", "8.8.8.8"]),
            "8.8.8.8",
            None,
            None,
            0,
            &StubProber::reaching(&[]),
        );
        assert_eq!(
            selection,
            Selection::Gateway {
                ip: "10.0.0.254".to_string(),
                skipped: 0
            }
        );
    }

    #[test]
    fn test_unanswered_and_self_hops_skipped() {
        let selection = select_gateway(
            &hops(&["10.0.0.254", "*", "8.8.8.8"]),
            "8.8.8.8",
            None,
            None,
            0,
            &StubProber::reaching(&[]),
        );
        assert_eq!(
            selection,
            Selection::Gateway {
                ip: "10.0.0.254".to_string(),
                skipped: 0
            }
        );
    }

    #[test]
    fn test_all_hops_unusable() {
        let selection = select_gateway(
            &hops(&["*", "8.8.8.8", "*"]),
            "8.8.8.8",
            None,
            None,
            0,
            &StubProber::reaching(&[]),
        );
        assert_eq!(selection, Selection::NotFound { skipped: 0 });
    }

    #[test]
    fn test_unreachable_gateway_counted_and_skipped() {
        // Farthest candidate does not answer pings; the next nearer one
        // does and wins with a skip count of 1
        let selection = select_gateway(
            &hops(&["172.16.0.254", "10.0.0.254", "8.8.8.8"]),
            "8.8.8.8",
            None,
            None,
            5,
            &StubProber::reaching(&["172.16.0.254"]),
        );
        assert_eq!(
            selection,
            Selection::Gateway {
                ip: "172.16.0.254".to_string(),
                skipped: 1
            }
        );
    }

    #[test]
    fn test_no_reachable_gateway() {
        let selection = select_gateway(
            &hops(&["172.16.0.254", "10.0.0.254", "8.8.8.8"]),
            "8.8.8.8",
            None,
            None,
            5,
            &StubProber::reaching(&[]),
        );
        assert_eq!(selection, Selection::NotFound { skipped: 2 });
    }

    #[test]
    fn test_ping_disabled_takes_first_candidate_unconditionally() {
        let selection = select_gateway(
            &hops(&["172.16.0.254", "10.0.0.254", "8.8.8.8"]),
            "8.8.8.8",
            None,
            None,
            0,
            &StubProber::reaching(&[]),
        );
        assert_eq!(
            selection,
            Selection::Gateway {
                ip: "10.0.0.254".to_string(),
                skipped: 0
            }
        );
    }
}
