use serde::{Deserialize, Serialize};
use std::path::Path;

/// IP stack configuration of a monitored host
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IpStack {
    /// Host has an IPv4 stack and can be probed
    V4,
    /// Host is configured without any IP stack and is skipped for
    /// address-based operations
    NoIp,
}

impl Default for IpStack {
    fn default() -> Self {
        IpStack::V4
    }
}

/// Tunables for the traceroute and ping child processes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Seconds traceroute waits for each probe reply (-w)
    #[serde(default = "default_timeout")]
    pub timeout: u32,
    /// Probes traceroute sends per hop (-q)
    #[serde(default = "default_probes")]
    pub probes: u32,
    /// Maximum hop count traceroute explores (-m)
    #[serde(default = "default_max_ttl")]
    pub max_ttl: u32,
    /// Ping probes per gateway candidate; 0 disables the reachability check
    #[serde(default = "default_ping_probes")]
    pub ping_probes: u32,
    /// Maximum number of traceroute processes running at the same time
    #[serde(default = "default_max_processes")]
    pub max_processes: usize,
}

fn default_timeout() -> u32 {
    8
}

fn default_probes() -> u32 {
    2
}

fn default_max_ttl() -> u32 {
    10
}

fn default_ping_probes() -> u32 {
    5
}

fn default_max_processes() -> usize {
    20
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            probes: default_probes(),
            max_ttl: default_max_ttl(),
            ping_probes: default_ping_probes(),
            max_processes: default_max_processes(),
        }
    }
}

impl ScanSettings {
    /// Validate the settings
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout == 0 {
            return Err(ValidationError::InvalidSettings(
                "timeout must be at least 1 second".to_string(),
            ));
        }
        if self.probes == 0 {
            return Err(ValidationError::InvalidSettings(
                "probes must be at least 1".to_string(),
            ));
        }
        if self.max_ttl == 0 {
            return Err(ValidationError::InvalidSettings(
                "max_ttl must be at least 1".to_string(),
            ));
        }
        if self.max_processes == 0 {
            return Err(ValidationError::InvalidSettings(
                "max_processes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One monitored host in the inventory snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostEntry {
    pub name: String,
    /// Configured IPv4 address; hosts without one are resolved via DNS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default = "default_true")]
    pub online: bool,
    #[serde(default)]
    pub ip_stack: IpStack,
    /// Manually configured parents; hosts with any are never scanned
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// Inventory snapshot driving a parent scan
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Host the monitoring station itself is known as, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitoring_host: Option<String>,
    #[serde(default)]
    pub scan: ScanSettings,
    pub hosts: Vec<HostEntry>,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.scan.validate()?;

        let mut seen = std::collections::HashSet::new();
        for host in &self.hosts {
            if host.name.is_empty() {
                return Err(ValidationError::InvalidHost(
                    "host name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(host.name.as_str()) {
                return Err(ValidationError::DuplicateHost(host.name.clone()));
            }
        }
        Ok(())
    }

    /// Look up an inventory entry by host name
    pub fn host(&self, name: &str) -> Option<&HostEntry> {
        self.hosts.iter().find(|h| h.name == name)
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.host(name).map(|h| h.active).unwrap_or(false)
    }

    pub fn is_online(&self, name: &str) -> bool {
        self.host(name).map(|h| h.online).unwrap_or(false)
    }

    /// IP stack of a host; hosts not in the inventory default to IPv4
    pub fn ip_stack(&self, name: &str) -> IpStack {
        self.host(name).map(|h| h.ip_stack).unwrap_or_default()
    }

    /// Manually configured parents of a host
    pub fn manual_parents(&self, name: &str) -> &[String] {
        self.host(name).map(|h| h.parents.as_slice()).unwrap_or(&[])
    }

    /// All hosts eligible for scanning when no explicit list is given,
    /// sorted by name
    pub fn active_online_hosts(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .hosts
            .iter()
            .filter(|h| h.active && h.online)
            .map(|h| h.name.clone())
            .collect();
        names.sort();
        names
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid scan settings: {0}")]
    InvalidSettings(String),
    #[error("Invalid host entry: {0}")]
    InvalidHost(String),
    #[error("Duplicate host name: {0}")]
    DuplicateHost(String),
}

/// Load and parse an inventory from a YAML file
pub fn load_config(config_path: &Path) -> color_eyre::Result<Config> {
    log::info!("Loading inventory from: {:?}", config_path);

    let file = std::fs::File::open(config_path)?;
    let config: Config = serde_yaml::from_reader(file)?;
    config.validate()?;

    log::info!("Loaded {} hosts", config.hosts.len());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_full_inventory_parsing() {
        let yaml = r#"
monitoring_host: monitor
scan:
  timeout: 4
  ping_probes: 0
hosts:
  - name: monitor
    address: 10.0.0.1
  - name: web01
    address: 10.1.0.10
    parents: ["core-router"]
  - name: printer
    ip_stack: no_ip
  - name: standby
    online: false
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.monitoring_host.as_deref(), Some("monitor"));
        assert_eq!(config.scan.timeout, 4);
        assert_eq!(config.scan.ping_probes, 0);
        // Unset settings fall back to the defaults
        assert_eq!(config.scan.probes, 2);
        assert_eq!(config.scan.max_ttl, 10);
        assert_eq!(config.scan.max_processes, 20);

        assert_eq!(config.manual_parents("web01"), ["core-router"]);
        assert_eq!(config.ip_stack("printer"), IpStack::NoIp);
        assert!(!config.is_online("standby"));
        assert!(config.is_active("web01"));
    }

    #[test]
    fn test_default_settings() {
        let settings = ScanSettings::default();
        assert_eq!(settings.timeout, 8);
        assert_eq!(settings.probes, 2);
        assert_eq!(settings.max_ttl, 10);
        assert_eq!(settings.ping_probes, 5);
        assert_eq!(settings.max_processes, 20);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_active_online_hosts_sorted() {
        let yaml = r#"
hosts:
  - name: zeta
  - name: alpha
  - name: offline
    online: false
  - name: inactive
    active: false
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.active_online_hosts(), ["alpha", "zeta"]);
    }

    #[test]
    fn test_duplicate_host_rejected() {
        let yaml = r#"
hosts:
  - name: web01
  - name: web01
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::DuplicateHost(_))
        ));
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = ScanSettings::default();
        settings.max_processes = 0;
        assert!(settings.validate().is_err());

        let mut settings = ScanSettings::default();
        settings.timeout = 0;
        assert!(settings.validate().is_err());

        // ping_probes = 0 is valid: it disables the reachability check
        let mut settings = ScanSettings::default();
        settings.ping_probes = 0;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_config_file() {
        let yaml = r#"
monitoring_host: monitor
hosts:
  - name: monitor
    address: 10.0.0.1
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.hosts.len(), 1);
    }
}
