//! Infrastructure implementation of the `ConfigStore` port.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::HvConfig;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "HVDRIVER_CONFIG";

/// Production implementation of `ConfigStore` that reads a YAML file on disk.
#[derive(Debug, Default)]
pub struct YamlConfigStore {
    path: Option<PathBuf>,
}

impl YamlConfigStore {
    /// Use `$HVDRIVER_CONFIG` or `~/.hvdriver/config.yaml`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit file (for testing).
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<HvConfig> {
        let path = self.path()?;
        if !path.exists() {
            tracing::debug!(config = %path.display(), "no config file, using defaults");
            return Ok(HvConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        if let Some(val) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(val));
        }
        Ok(hvdriver_dir()?.join("config.yaml"))
    }
}

/// `~/.hvdriver`
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn hvdriver_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))
        .map(|h| h.join(".hvdriver"))
}

/// Install directory for drivers: the configured one or `~/.hvdriver/bin`.
///
/// # Errors
///
/// Returns an error if no directory is configured and the home directory
/// cannot be determined.
pub fn install_dir(config: &HvConfig) -> Result<PathBuf> {
    match &config.install_dir {
        Some(dir) => Ok(dir.clone()),
        None => Ok(hvdriver_dir()?.join("bin")),
    }
}
