//! Aggregation of per-host scan results into a global topology.

use crate::gateway::GatewayResult;
use std::collections::{BTreeMap, HashSet};

/// Accumulated topology over a whole scan run.
///
/// Gateways that several hosts share are created once: the created-host
/// set is the dedup key, and the monitoring-host parent edge for a
/// synthetic gateway is added only when the gateway itself is new.
#[derive(Debug, Default)]
pub struct TopologyState {
    gateway_hosts: HashSet<String>,
    /// Synthetic host entries in `<name>|parent|ping` form
    pub parent_hosts: Vec<String>,
    /// Address of each synthetic gateway host
    pub parent_ips: BTreeMap<String, String>,
    /// Ordered (parent, children) edges
    pub parent_rules: Vec<(String, Vec<String>)>,
}

impl TopologyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one host's scan result into the topology.
    ///
    /// A gateway candidate without a matching monitored host becomes a
    /// synthetic host named after its DNS name, or `gw-<ip>` with the
    /// dots replaced by dashes. Hosts with no gateway at all fall back
    /// to the monitoring host as parent, when one is configured.
    pub fn record(&mut self, monitoring_host: Option<&str>, host: &str, result: &GatewayResult) {
        if let Some(gw) = &result.gateway {
            let gateway = match &gw.existing_host {
                Some(existing) => existing.clone(),
                None => {
                    // Artificial gateway host
                    let name = gw
                        .dns_name
                        .clone()
                        .unwrap_or_else(|| format!("gw-{}", gw.ip.replace('.', "-")));
                    if self.gateway_hosts.insert(name.clone()) {
                        self.parent_hosts.push(format!("{}|parent|ping", name));
                        self.parent_ips.insert(name.clone(), gw.ip.clone());
                        if let Some(monitoring) = monitoring_host {
                            // The monitoring host becomes a parent of
                            // every new gateway
                            self.parent_rules
                                .push((monitoring.to_string(), vec![name.clone()]));
                        }
                    }
                    name
                }
            };
            self.parent_rules.push((gateway, vec![host.to_string()]));
        } else if let Some(monitoring) = monitoring_host {
            // Hosts without a real parent get the monitoring host
            if host != monitoring {
                self.parent_rules
                    .push((monitoring.to_string(), vec![host.to_string()]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Gateway, ScanState};

    fn gateway_result(ip: &str, dns_name: Option<&str>, existing: Option<&str>) -> GatewayResult {
        GatewayResult::new(
            Some(Gateway {
                existing_host: existing.map(str::to_string),
                ip: ip.to_string(),
                dns_name: dns_name.map(str::to_string),
            }),
            ScanState::Gateway,
            0,
            "",
        )
    }

    #[test]
    fn test_synthetic_name_from_ip() {
        let mut topology = TopologyState::new();
        topology.record(
            Some("monitor"),
            "web01",
            &gateway_result("10.0.0.254", None, None),
        );

        assert_eq!(topology.parent_hosts, ["gw-10-0-0-254|parent|ping"]);
        assert_eq!(
            topology.parent_ips.get("gw-10-0-0-254").map(String::as_str),
            Some("10.0.0.254")
        );
        assert_eq!(
            topology.parent_rules,
            vec![
                ("monitor".to_string(), vec!["gw-10-0-0-254".to_string()]),
                ("gw-10-0-0-254".to_string(), vec!["web01".to_string()]),
            ]
        );
    }

    #[test]
    fn test_dns_name_preferred_over_synthetic() {
        let mut topology = TopologyState::new();
        topology.record(
            Some("monitor"),
            "web01",
            &gateway_result("10.0.0.254", Some("router.lan"), None),
        );

        assert_eq!(topology.parent_hosts, ["router.lan|parent|ping"]);
        assert_eq!(
            topology.parent_rules.last(),
            Some(&("router.lan".to_string(), vec!["web01".to_string()]))
        );
    }

    #[test]
    fn test_existing_host_creates_no_synthetic_entry() {
        let mut topology = TopologyState::new();
        topology.record(
            Some("monitor"),
            "web01",
            &gateway_result("10.0.0.254", None, Some("core-router")),
        );

        assert!(topology.parent_hosts.is_empty());
        assert!(topology.parent_ips.is_empty());
        assert_eq!(
            topology.parent_rules,
            vec![("core-router".to_string(), vec!["web01".to_string()])]
        );
    }

    #[test]
    fn test_shared_gateway_created_once() {
        let mut topology = TopologyState::new();
        let result = gateway_result("10.0.0.254", None, None);
        topology.record(Some("monitor"), "web01", &result);
        topology.record(Some("monitor"), "web02", &result);

        // One host entry, one IP entry, one monitoring edge; but one
        // parent edge per scanned host
        assert_eq!(topology.parent_hosts.len(), 1);
        assert_eq!(topology.parent_ips.len(), 1);
        let monitoring_edges = topology
            .parent_rules
            .iter()
            .filter(|(parent, children)| {
                parent == "monitor" && children == &vec!["gw-10-0-0-254".to_string()]
            })
            .count();
        assert_eq!(monitoring_edges, 1);
        let host_edges = topology
            .parent_rules
            .iter()
            .filter(|(parent, _)| parent == "gw-10-0-0-254")
            .count();
        assert_eq!(host_edges, 2);
    }

    #[test]
    fn test_no_gateway_falls_back_to_monitoring_host() {
        let mut topology = TopologyState::new();
        let result = GatewayResult::new(None, ScanState::NotFound, 0, "No usable routing information");
        topology.record(Some("monitor"), "web01", &result);

        assert_eq!(
            topology.parent_rules,
            vec![("monitor".to_string(), vec!["web01".to_string()])]
        );
    }

    #[test]
    fn test_monitoring_host_itself_gets_no_fallback_edge() {
        let mut topology = TopologyState::new();
        let result = GatewayResult::new(None, ScanState::Root, 0, "");
        topology.record(Some("monitor"), "monitor", &result);

        assert!(topology.parent_rules.is_empty());
    }

    #[test]
    fn test_no_monitoring_host_means_no_edge() {
        let mut topology = TopologyState::new();
        let result = GatewayResult::new(None, ScanState::Direct, 0, "");
        topology.record(None, "web01", &result);

        assert!(topology.parent_rules.is_empty());
    }
}
