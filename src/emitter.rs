//! Serialization of the aggregated topology into the parents
//! configuration file.

use crate::topology::TopologyState;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fmt::Write as _;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// First-line marker of files this tool generated. Files without it are
/// never overwritten.
pub const BANNER_PREFIX: &str = "# Automatically created by parentscan at";

/// Refuse to touch an existing output file that was not generated by a
/// previous scan run.
pub fn check_output_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let file = fs::File::open(path)?;
    let mut first_line = String::new();
    BufReader::new(file).read_line(&mut first_line)?;

    if !first_line.starts_with(BANNER_PREFIX) {
        return Err(eyre!(
            "{} seems to be created manually.\n\n\
             The parent scan would overwrite this file.\n\
             Please rename it to keep the configuration or delete \
             the file and try again.",
            path.display()
        ));
    }
    Ok(())
}

/// Write the topology as one buffered write.
///
/// The file holds three sections the configuration loader appends to its
/// global collections: synthetic host entries, their addresses, and the
/// parent edges.
pub fn write_topology(path: &Path, topology: &TopologyState) -> Result<()> {
    let mut out = String::new();

    writeln!(
        out,
        "{} {}\n",
        BANNER_PREFIX,
        chrono::Local::now().format("%a %b %e %H:%M:%S %Y")
    )?;
    writeln!(out, "# Do not edit this file. If you want to convert an")?;
    writeln!(out, "# artificial gateway host into a permanent one, then")?;
    writeln!(out, "# move its definition into another *.mk file")?;

    writeln!(out, "# Parents which are not listed in your all_hosts:")?;
    writeln!(out, "all_hosts += {}\n", format_host_list(&topology.parent_hosts))?;

    writeln!(out, "# IP addresses of parents not listed in all_hosts:")?;
    writeln!(out, "ipaddresses.update({})\n", format_ip_map(topology))?;

    writeln!(out, "# Parent definitions")?;
    writeln!(out, "parents += {}\n", format_rules(&topology.parent_rules))?;

    fs::write(path, out)?;
    Ok(())
}

fn format_host_list(hosts: &[String]) -> String {
    let entries: Vec<String> = hosts.iter().map(|h| format!("'{}'", h)).collect();
    format!("[{}]", entries.join(", "))
}

fn format_ip_map(topology: &TopologyState) -> String {
    let entries: Vec<String> = topology
        .parent_ips
        .iter()
        .map(|(name, ip)| format!("'{}': '{}'", name, ip))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

fn format_rules(rules: &[(String, Vec<String>)]) -> String {
    let entries: Vec<String> = rules
        .iter()
        .map(|(parent, children)| {
            let children: Vec<String> = children.iter().map(|c| format!("'{}'", c)).collect();
            format!("('{}', [{}])", parent, children.join(", "))
        })
        .collect();
    format!("[{}]", entries.join(", "))
}
