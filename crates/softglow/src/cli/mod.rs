//! Subcommand implementations.

pub mod config;
pub mod enhance;

use std::path::{Path, PathBuf};

use softglow_core::Config;

/// Expand `~` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}

/// Load from an explicit path when given, otherwise from the default location.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    match explicit {
        Some(path) => Ok(Config::load_from(&expand_path(path))?),
        None => Ok(Config::load()?),
    }
}
