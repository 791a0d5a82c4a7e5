//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.
//!
//! Every port is synchronous: reconciliation and provisioning run step by step
//! on the calling thread.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;

use crate::domain::{HvConfig, MachineStore};

// ── Process and host ports ───────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
pub trait CommandRunner {
    /// Run a program to completion and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned. A non-zero exit is
    /// reported through `Output::status`, not as an error.
    fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
}

/// The host capabilities the reconciler needs: resolving executables and
/// mutating the install directory.
pub trait DriverHost {
    /// Resolve `name` on the execution path. Names containing a path
    /// separator are checked as given.
    fn look_path(&self, name: &str) -> Option<PathBuf>;
    /// Remove a file. A missing file is not an error.
    fn remove_file(&self, path: &Path) -> Result<()>;
    /// Set the permission bits of `path`.
    fn set_mode(&self, path: &Path, mode: u32) -> Result<()>;
}

// ── Transfer ports ───────────────────────────────────────────────────────────

/// Receives byte progress from a [`Fetcher`].
pub trait ProgressSink {
    /// The transfer started; `total` is the expected length when known.
    fn start(&self, total: Option<u64>);
    /// `bytes` more bytes arrived.
    fn advance(&self, bytes: u64);
    /// The transfer ended (successfully or not).
    fn finish(&self);
}

/// Places a single remote file at a local path.
pub trait Fetcher {
    /// Download `url` to `destination`, reporting progress to `progress`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer or the local write fails.
    fn fetch(&self, url: &str, destination: &Path, progress: &dyn ProgressSink) -> Result<()>;
}

// ── Provisioning ports ───────────────────────────────────────────────────────

/// Stages the boot ISO into a machine's store directory. Idempotent.
pub trait IsoStager {
    /// Make the ISO referenced by `boot_url` available inside the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the ISO cannot be copied or downloaded.
    fn copy_iso_to_machine_dir(&self, boot_url: &str, machine: &MachineStore) -> Result<()>;
}

/// Produces an SSH key pair at `path` and `path.pub`.
pub trait SshKeyGenerator {
    /// Generate the key pair unless a private key already exists at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if key generation fails.
    fn generate_key_pair(&self, path: &Path) -> Result<()>;
}

/// Creates raw disk images.
pub trait RawDiskWriter {
    /// Whether a disk image is already present at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if existence cannot be determined.
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Build an image seeded with the key at `public_key` and sized to
    /// exactly `size_bytes`. Never overwrites an existing file.
    ///
    /// # Errors
    ///
    /// Returns a `DriverError::DiskCreateFailure` naming the failed sub-step.
    fn create(&self, public_key: &Path, disk_path: &Path, size_bytes: u64) -> Result<()>;
}

/// File ownership operations used after the disk build.
pub trait Chowner {
    /// Effective `(uid, gid)` of the current process.
    fn effective_ids(&self) -> (u32, u32);
    /// Direct children of `dir` (not recursive).
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    fn list_children(&self, dir: &Path) -> Result<Vec<PathBuf>>;
    /// Change the owner and group of `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the ownership change is refused.
    fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<()>;
}

// ── VM driver port ───────────────────────────────────────────────────────────

/// The slice of a VM driver the restart fallback needs.
pub trait VmDriver {
    /// Start the VM.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to start the VM.
    fn start(&self) -> Result<()>;

    /// Stop the VM.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to stop the VM.
    fn stop(&self) -> Result<()>;

    /// Restart the VM. The default stops and then starts; a failed stop is
    /// returned as-is and start is never attempted. Drivers with a native
    /// restart override this.
    ///
    /// # Errors
    ///
    /// Returns the stop or start error.
    fn restart(&self) -> Result<()> {
        self.stop()?;
        self.start()
    }
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts loading the driver registry configuration.
pub trait ConfigStore {
    /// Load the configuration, returning defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<HvConfig>;
    /// Location of the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    fn path(&self) -> Result<PathBuf>;
}
