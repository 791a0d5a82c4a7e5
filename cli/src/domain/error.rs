//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator. Callers recover the typed cause with
//! `anyhow::Error::downcast_ref`.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ── Driver errors ─────────────────────────────────────────────────────────────

/// Failures raised while reconciling a driver binary or provisioning a machine.
///
/// A missing driver, a driver without `version` support, and an already
/// present disk image are not errors and never produce one of these.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot locate '{program}': {reason}")]
    LookupFailure { program: String, reason: String },

    #[error("can't parse driver version '{token}' reported by {driver}")]
    ProbeParseFailure {
        driver: String,
        token: String,
        #[source]
        source: semver::Error,
    },

    #[error("can't download driver {driver} from: {url}")]
    FetchFailure {
        driver: String,
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("chmod error on {} (driver {driver} from: {url})", path.display())]
    PermissionFailure {
        driver: String,
        url: String,
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("{step} {}", path.display())]
    DiskCreateFailure {
        step: DiskStep,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("chown {}", path.display())]
    OwnershipFailure {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// Sub-step of raw disk creation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskStep {
    MakeImage,
    Open,
    Write,
    Close,
    Resize,
    Chmod,
    Commit,
}

impl fmt::Display for DiskStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MakeImage => "make disk image",
            Self::Open => "open",
            Self::Write => "write",
            Self::Close => "close",
            Self::Resize => "resize",
            Self::Chmod => "chmod",
            Self::Commit => "commit",
        })
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to the driver registry configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid download URL for {driver}: {url}\n\nDriver binaries must be fetched over https://")]
    InsecureUrl { driver: String, url: String },

    #[error("Invalid minimum version for {driver}: {version}")]
    InvalidVersion {
        driver: String,
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("Invalid machine name '{0}': must be non-empty and contain no path separators")]
    InvalidMachineName(String),
}
