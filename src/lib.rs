//! # Parentscan - Network parent-topology scanner
//!
//! This library discovers the monitoring "parent" of each monitored
//! host: the last reachable router or gateway between the monitoring
//! station and the host, as seen from the station.
//!
//! ## Overview
//!
//! For every host in an inventory snapshot, parentscan runs the system
//! traceroute utility, parses the hop sequence, and selects the most
//! distant usable hop as the host's gateway. Candidate gateways can be
//! verified with ping before being accepted. Gateways shared by several
//! hosts are deduplicated into synthetic host definitions, and the
//! resulting parent relationships are written as a configuration
//! fragment a monitoring system can merge into its host configuration.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `config`: inventory snapshot, scan settings, YAML parsing
//! - `resolver`: host address resolution and the reverse name cache
//! - `probe`: traceroute child-process orchestration and output parsing
//! - `gateway`: per-host result model and gateway selection heuristics
//! - `topology`: aggregation of per-host results into a global topology
//! - `emitter`: parents configuration file output
//! - `utils`: external binary lookup
//! - `orchestrator`: high-level orchestration of a whole scan run
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use parentscan::{config, orchestrator, probe::ScanOptions};
//!
//! let inventory = config::load_config("inventory.yaml".as_ref())?;
//! orchestrator::scan_parents(
//!     &inventory,
//!     &[],
//!     "parents.mk".as_ref(),
//!     None,
//!     &ScanOptions::default(),
//! )?;
//! # Ok::<(), color_eyre::eyre::Report>(())
//! ```
//!
//! ## Error Handling
//!
//! Fatal preconditions (missing traceroute binary, a hand-edited output
//! file) abort the run before anything is written. Per-host problems are
//! captured as tagged outcomes and never abort the batch; with the debug
//! flag set, per-host lookup errors are re-raised instead to aid
//! interactive debugging.

pub mod config;
pub mod emitter;
pub mod gateway;
pub mod orchestrator;
pub mod probe;
pub mod resolver;
pub mod topology;
pub mod utils;
