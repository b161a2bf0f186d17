//! External binary lookup.
//!
//! The scan shells out to traceroute and ping; their presence is checked
//! on the executable search path before any process is launched.

use std::env;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Locate an executable on the search path.
///
/// Returns the first PATH entry containing an executable regular file of
/// the given name.
pub fn find_in_path(binary: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(binary))
        .find(|candidate| is_executable(candidate))
}

/// Check that a path is a regular file with any execute bit set
fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
