// src/config.rs

//! Configuration loading utilities.

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "storefront.toml";

/// Load and validate configuration.
///
/// A missing file yields the defaults; a file that exists but does not parse
/// is an error.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config = if path.exists() {
        log::info!("Loading configuration from {}", path.display());
        Config::load(path)?
    } else {
        log::info!("No config at {}, using defaults", path.display());
        Config::default()
    };
    config.validate()?;
    Ok(config)
}
