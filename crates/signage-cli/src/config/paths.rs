//! Config file location.
//!
//! Lookup order: `--dir`, then `$XDG_CONFIG_HOME/signage`, then
//! `$HOME/.config/signage`. A relative or empty `XDG_CONFIG_HOME` is ignored.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Result, bail};

/// Directory name under the user config directory.
const APP_DIR: &str = "signage";

/// Config file name.
const CONFIG_FILE: &str = "config.toml";

/// Resolves the config file path from `--dir` and the environment.
///
/// # Errors
///
/// Returns an error if `dir` is `None` and neither `XDG_CONFIG_HOME` nor
/// `HOME` is usable.
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    config_path_from(
        dir,
        std::env::var_os("XDG_CONFIG_HOME"),
        std::env::var_os("HOME"),
    )
}

/// Resolves the config file path from explicit inputs.
fn config_path_from(
    dir: Option<&PathBuf>,
    xdg_config_home: Option<OsString>,
    home: Option<OsString>,
) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(CONFIG_FILE));
    }

    let xdg = xdg_config_home
        .map(PathBuf::from)
        .filter(|p| p.is_absolute());
    if let Some(base) = xdg {
        return Ok(base.join(APP_DIR).join(CONFIG_FILE));
    }

    let Some(home) = home.filter(|h| !h.is_empty()) else {
        bail!("cannot locate config: pass --dir or set XDG_CONFIG_HOME or HOME");
    };
    Ok(PathBuf::from(home)
        .join(".config")
        .join(APP_DIR)
        .join(CONFIG_FILE))
}
