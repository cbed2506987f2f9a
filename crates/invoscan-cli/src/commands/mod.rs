pub mod config;
pub mod extract;
pub mod rules;
pub mod serve;

use std::path::{Path, PathBuf};

use invoscan_core::InvoscanConfig;
use tracing::debug;

/// `<config dir>/invoscan/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invoscan")
        .join("config.json")
}

/// The config file in use: `--config` if given, else the default location.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the configuration. A missing default file means defaults; a missing
/// explicit file is an error.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<InvoscanConfig> {
    let path = config_path(explicit);
    if explicit.is_some() || path.exists() {
        debug!("Loading configuration from {}", path.display());
        return read_config(&path);
    }
    Ok(InvoscanConfig::default())
}

fn read_config(path: &Path) -> anyhow::Result<InvoscanConfig> {
    InvoscanConfig::from_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))
}
