//! ripexec configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::resolver::{Layout, ResolverConfig};

/// Main ripexec configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Install layout; detected from the environment when unset
    pub layout: Option<Layout>,

    /// Root of the install tree holding `vendor/ripgrep`
    #[serde(rename = "install-root")]
    pub install_root: Option<PathBuf>,

    /// Explicit ripgrep executable, bypassing resolution
    pub binary: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .ripexec.yml
        let local_config = PathBuf::from(".ripexec.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/ripexec/ripexec.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("ripexec").join("ripexec.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Resolver inputs, filling unset values from the running process
    pub fn resolver_config(&self) -> ResolverConfig {
        let mut resolver = ResolverConfig::from_env();
        if let Some(layout) = self.layout {
            resolver.layout = layout;
        }
        resolver.install_root = self.install_root.clone();
        resolver.binary = self.binary.clone();
        resolver
    }
}
