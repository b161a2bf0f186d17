//! Shared utilities: external binary lookup.

pub mod binary;

pub use binary::find_in_path;
