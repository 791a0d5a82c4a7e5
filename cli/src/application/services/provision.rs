//! Application service — boot disk provisioning for a new machine.
//!
//! Stages the boot ISO, generates the SSH key pair, builds the raw disk once
//! and normalizes ownership of the store directory.
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::ports::{
    Chowner, IsoStager, ProgressReporter, RawDiskWriter, SshKeyGenerator,
};
use crate::domain::MachineStore;
use crate::domain::error::DriverError;
use crate::domain::machine::disk_size_bytes;

/// Collaborators used by [`provision_disk`].
pub struct ProvisionContext<'a, S, K, D, C> {
    pub stager: &'a S,
    pub keygen: &'a K,
    pub disks: &'a D,
    pub chowner: &'a C,
    pub reporter: &'a dyn ProgressReporter,
}

/// Result of a provisioning call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProvisionOutcome {
    /// The raw disk was built by this call.
    Created { disk_path: PathBuf },
    /// A disk image was already there and was left untouched.
    AlreadyPresent { disk_path: PathBuf },
}

/// Provision the boot disk of `machine`.
///
/// Safe to call repeatedly: once the raw disk exists, later calls only
/// re-run the idempotent ISO and key steps.
///
/// # Errors
///
/// Returns the first failing step's error, wrapped with the step name.
pub fn provision_disk<S, K, D, C>(
    ctx: &ProvisionContext<'_, S, K, D, C>,
    machine: &MachineStore,
    boot_url: &str,
    size_mb: u64,
) -> Result<ProvisionOutcome>
where
    S: IsoStager,
    K: SshKeyGenerator,
    D: RawDiskWriter,
    C: Chowner,
{
    tracing::info!(
        store = %machine.store_path().display(),
        "making disk image using store path"
    );
    ctx.stager
        .copy_iso_to_machine_dir(boot_url, machine)
        .context("copy iso to machine dir")?;

    let key_path = machine.ssh_key_path();
    ctx.reporter
        .step(&format!("Creating ssh key: {}...", key_path.display()));
    ctx.keygen
        .generate_key_pair(&key_path)
        .context("generate ssh key")?;

    let disk_path = machine.disk_path();
    let present = ctx
        .disks
        .exists(&disk_path)
        .with_context(|| format!("check raw disk image {}", disk_path.display()))?;
    if present {
        tracing::info!(disk = %disk_path.display(), "raw disk image already present");
        return Ok(ProvisionOutcome::AlreadyPresent { disk_path });
    }

    ctx.reporter
        .step(&format!("Creating raw disk image: {}...", disk_path.display()));
    ctx.disks
        .create(
            &machine.public_key_path(),
            &disk_path,
            disk_size_bytes(size_mb),
        )
        .with_context(|| format!("create raw disk image {}", disk_path.display()))?;

    fix_permissions(ctx.chowner, machine.store_path())
        .with_context(|| format!("fixing permissions on {}", machine.store_path().display()))?;

    ctx.reporter
        .success(&format!("Raw disk image ready: {}", disk_path.display()));
    Ok(ProvisionOutcome::Created { disk_path })
}

/// Chown `dir` and each of its direct children to the effective uid/gid.
///
/// The disk build may run under different credentials than the process that
/// later serves these files. Not recursive beyond one level.
///
/// # Errors
///
/// Returns `DriverError::OwnershipFailure` naming the first path that could
/// not be chowned, or an error if the directory cannot be listed.
pub fn fix_permissions(chowner: &impl Chowner, dir: &Path) -> Result<()> {
    tracing::info!(dir = %dir.display(), "fixing permissions");
    let (uid, gid) = chowner.effective_ids();

    chown_one(chowner, dir, uid, gid)?;
    let children = chowner
        .list_children(dir)
        .with_context(|| format!("read dir {}", dir.display()))?;
    for child in &children {
        chown_one(chowner, child, uid, gid)?;
    }
    Ok(())
}

fn chown_one(chowner: &impl Chowner, path: &Path, uid: u32, gid: u32) -> Result<()> {
    chowner
        .chown(path, uid, gid)
        .map_err(|source| DriverError::OwnershipFailure {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(())
}
