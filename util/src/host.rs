//! Host platform (linux for example) utility functions

use std::path::PathBuf;

use uname;

/// Retrieve uname information.
pub fn get_uname() -> std::io::Result<uname::Info> {
    uname::uname()
}

/// Get the root directory of the software from the `CATCAR_SW_ROOT`
/// environment variable.
///
/// Parameter and session paths are resolved relative to this directory.
pub fn get_catcar_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var("CATCAR_SW_ROOT").map(PathBuf::from)
}
