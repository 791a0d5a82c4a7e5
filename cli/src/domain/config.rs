//! Domain types and validators for the driver registry configuration.
//!
//! Pure functions only — no I/O, no filesystem access.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::version::parse_version;

// ── Constants ────────────────────────────────────────────────────────────────

/// The KVM2 machine driver, the one driver the built-in registry can fetch.
pub const KVM2_DRIVER: &str = "docker-machine-driver-kvm2";

/// Fixed download location of the KVM2 driver.
pub const KVM2_DOWNLOAD_URL: &str =
    "https://storage.googleapis.com/minikube/releases/latest/docker-machine-driver-kvm2";

/// Oldest KVM2 driver release accepted without reinstalling.
pub const KVM2_MINIMUM_VERSION: Version = Version::new(1, 0, 0);

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.hvdriver/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HvConfig {
    /// Directory drivers are installed into. Defaults to `~/.hvdriver/bin`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<PathBuf>,
    /// Extra or overriding registry entries, keyed by driver executable name.
    pub drivers: BTreeMap<String, DriverEntry>,
}

/// A registry entry as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverEntry {
    /// Download location of the driver binary.
    pub url: String,
    /// Oldest acceptable version; a leading `v` is allowed.
    pub minimum_version: String,
}

// ── Registry ─────────────────────────────────────────────────────────────────

/// Where to fetch a driver and which version it must at least report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverSpec {
    pub url: String,
    pub minimum_version: Version,
}

/// Maps driver identity to its [`DriverSpec`]. Only registered drivers are
/// ever fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriverRegistry {
    drivers: BTreeMap<String, DriverSpec>,
}

impl DriverRegistry {
    /// A registry with no drivers.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The registry shipped with the binary: the KVM2 driver only.
    #[must_use]
    pub fn builtin() -> Self {
        Self::empty().with_driver(
            KVM2_DRIVER,
            DriverSpec {
                url: KVM2_DOWNLOAD_URL.to_string(),
                minimum_version: KVM2_MINIMUM_VERSION,
            },
        )
    }

    /// Add or replace an entry.
    #[must_use]
    pub fn with_driver(mut self, name: &str, spec: DriverSpec) -> Self {
        self.drivers.insert(name.to_string(), spec);
        self
    }

    /// Built-in registry with the config file's entries merged over it.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry has a non-HTTPS URL or an invalid version.
    pub fn from_config(config: &HvConfig) -> Result<Self> {
        let mut registry = Self::builtin();
        for (name, entry) in &config.drivers {
            registry = registry.with_driver(name, validate_entry(name, entry)?);
        }
        Ok(registry)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DriverSpec> {
        self.drivers.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DriverSpec)> {
        self.drivers.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a config entry and converts it into a [`DriverSpec`].
///
/// # Errors
///
/// Returns an error if the URL is not `https://` or the version is malformed.
pub fn validate_entry(name: &str, entry: &DriverEntry) -> Result<DriverSpec> {
    if !entry.url.starts_with("https://") {
        return Err(ConfigError::InsecureUrl {
            driver: name.to_string(),
            url: entry.url.clone(),
        }
        .into());
    }
    let minimum_version =
        parse_version(&entry.minimum_version).map_err(|source| ConfigError::InvalidVersion {
            driver: name.to_string(),
            version: entry.minimum_version.clone(),
            source,
        })?;
    Ok(DriverSpec {
        url: entry.url.clone(),
        minimum_version,
    })
}

// ── Unit tests ───────────────────────────────────────────────────────────────
