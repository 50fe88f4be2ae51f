mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    load_first_existing(&DEFAULT_PATHS)
}

const DEFAULT_PATHS: [&str; 3] = [
    "./framestore.toml",
    "./config.toml",
    "~/.config/framestore/config.toml",
];

/// Load the first candidate that exists, or defaults when none do
fn load_first_existing(candidates: &[&str]) -> Result<Config> {
    for path_str in candidates {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.server.body_limit_bytes == 0 {
        anyhow::bail!("Server body_limit_bytes cannot be 0");
    }

    if config.storage.dir.as_os_str().is_empty() {
        anyhow::bail!("Storage directory cannot be empty");
    }

    Ok(())
}
