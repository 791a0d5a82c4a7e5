//! Raw disk image creation — implements `RawDiskWriter`.
//!
//! The image is assembled in a temporary file next to its destination and
//! linked into place without clobbering, so the destination path never holds
//! a partially written image.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::RawDiskWriter;
use crate::domain::error::{DiskStep, DriverError};
use crate::domain::machine::make_disk_image;

/// Mode of a committed disk image.
const DISK_MODE: u32 = 0o644;

/// Production `RawDiskWriter` writing to the local filesystem.
#[derive(Debug, Default)]
pub struct LocalRawDisk;

impl RawDiskWriter for LocalRawDisk {
    fn exists(&self, path: &Path) -> Result<bool> {
        path.try_exists()
            .with_context(|| format!("checking {}", path.display()))
    }

    fn create(&self, public_key: &Path, disk_path: &Path, size_bytes: u64) -> Result<()> {
        create_raw_disk_image(public_key, disk_path, size_bytes)?;
        Ok(())
    }
}

/// Build the raw disk at `disk_path` from the key at `public_key`.
///
/// # Errors
///
/// Returns `DriverError::DiskCreateFailure` naming the sub-step that failed.
/// An existing file at `disk_path` fails the `commit` step and is left intact.
pub fn create_raw_disk_image(
    public_key: &Path,
    disk_path: &Path,
    size_bytes: u64,
) -> Result<(), DriverError> {
    let fail = |step| {
        move |source| DriverError::DiskCreateFailure {
            step,
            path: disk_path.to_path_buf(),
            source,
        }
    };

    let key = std::fs::read(public_key).map_err(fail(DiskStep::MakeImage))?;
    let image = make_disk_image(&key).map_err(fail(DiskStep::MakeImage))?;

    let dir = disk_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staged = tempfile::Builder::new()
        .prefix(".rawdisk-")
        .tempfile_in(dir)
        .map_err(fail(DiskStep::Open))?;

    staged
        .as_file_mut()
        .write_all(&image)
        .map_err(fail(DiskStep::Write))?;
    staged
        .as_file()
        .sync_all()
        .map_err(fail(DiskStep::Close))?;
    staged
        .as_file()
        .set_len(size_bytes)
        .map_err(fail(DiskStep::Resize))?;
    apply_disk_mode(staged.path(), disk_path)?;

    staged
        .persist_noclobber(disk_path)
        .map_err(|e| fail(DiskStep::Commit)(e.error))?;

    tracing::debug!(disk = %disk_path.display(), size_bytes, "raw disk image written");
    Ok(())
}

/// Give the staged image its final mode; failures name `disk_path`.
fn apply_disk_mode(staged: &Path, disk_path: &Path) -> Result<(), DriverError> {
    set_mode(staged, DISK_MODE).map_err(|source| DriverError::DiskCreateFailure {
        step: DiskStep::Chmod,
        path: disk_path.to_path_buf(),
        source,
    })
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}
