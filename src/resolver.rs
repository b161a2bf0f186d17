//! Host address resolution and the reverse address-to-name index.
//!
//! Gateway IPs found by traceroute are mapped back to known monitored
//! hosts through a reverse index built from the same resolver the scan
//! uses. The index deliberately does not use reverse DNS: we want the
//! name of a matching inventory host, not whatever DNS calls the address.

use crate::config::{Config, IpStack};
use std::collections::HashMap;
use std::net::IpAddr;

/// Error raised when a host cannot be resolved to an IPv4 address
#[derive(Debug, thiserror::Error)]
#[error("Failed to lookup IPv4 address of '{host}': {reason}")]
pub struct LookupError {
    pub host: String,
    pub reason: String,
}

/// Capability to resolve a host identifier to its IPv4 address
pub trait AddressResolver {
    fn resolve(&self, host: &str) -> Result<String, LookupError>;
}

/// Resolver backed by the inventory snapshot, with a DNS fallback for
/// hosts that have no configured address
pub struct InventoryResolver {
    configured: HashMap<String, String>,
}

impl InventoryResolver {
    pub fn new(config: &Config) -> Self {
        let configured = config
            .hosts
            .iter()
            .filter_map(|h| h.address.clone().map(|addr| (h.name.clone(), addr)))
            .collect();
        Self { configured }
    }
}

impl AddressResolver for InventoryResolver {
    fn resolve(&self, host: &str) -> Result<String, LookupError> {
        if let Some(addr) = self.configured.get(host) {
            return Ok(addr.clone());
        }

        let addrs = dns_lookup::lookup_host(host).map_err(|e| LookupError {
            host: host.to_string(),
            reason: e.to_string(),
        })?;
        addrs
            .into_iter()
            .find(|addr| addr.is_ipv4())
            .map(|addr| addr.to_string())
            .ok_or_else(|| LookupError {
                host: host.to_string(),
                reason: "no IPv4 address".to_string(),
            })
    }
}

/// Reverse address-to-host index, populated at most once per scan
#[derive(Debug, Default)]
pub struct ReverseNameCache {
    entries: Option<HashMap<String, String>>,
}

impl ReverseNameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the index if it has not been populated yet.
    ///
    /// Every active and online host that is not a No-IP host is resolved
    /// once; individual lookup failures only leave that host out of the
    /// index. Repeated calls are no-ops.
    pub fn ensure_populated(&mut self, config: &Config, resolver: &dyn AddressResolver) {
        if self.entries.is_some() {
            return;
        }

        let mut entries = HashMap::new();
        for host in &config.hosts {
            if !host.active || !host.online || host.ip_stack == IpStack::NoIp {
                continue;
            }
            match resolver.resolve(&host.name) {
                Ok(ip) => {
                    entries.insert(ip, host.name.clone());
                }
                Err(e) => {
                    log::debug!("{}", e);
                }
            }
        }
        log::debug!("Reverse name cache populated with {} entries", entries.len());
        self.entries = Some(entries);
    }

    /// Host name a gateway address belongs to, if any.
    ///
    /// Returns None until the cache has been populated.
    pub fn lookup(&self, ip: &str) -> Option<&str> {
        self.entries.as_ref()?.get(ip).map(String::as_str)
    }
}

/// DNS name of a gateway address via reverse DNS.
///
/// Any failure, including an address the system cannot parse, yields None.
pub fn ip_to_dnsname(ip: &str) -> Option<String> {
    let addr: IpAddr = ip.parse().ok()?;
    dns_lookup::lookup_addr(&addr).ok()
}
