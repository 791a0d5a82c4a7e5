//! Machine store layout and the raw disk container.
//!
//! Path arithmetic and in-memory archive building only; nothing here touches
//! the filesystem.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use anyhow::Result;

use crate::domain::error::ConfigError;

/// File name of the machine's private SSH key inside the store directory.
pub const SSH_KEY_NAME: &str = "id_rsa";

/// Suffix appended to the private key path to locate the public half.
pub const PUBLIC_KEY_SUFFIX: &str = ".pub";

/// Extension of the raw disk image file.
pub const RAW_DISK_EXTENSION: &str = "rawdisk";

/// Disk sizes are declared in decimal megabytes.
pub const BYTES_PER_MB: u64 = 1_000_000;

/// First archive entry; the guest automount script formats a disk carrying it.
pub const FORMAT_MARKER: &str = "boot2docker, please format-me";

/// Per-VM directory holding keys, the raw disk image and staged boot media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineStore {
    store_path: PathBuf,
    machine_name: String,
}

impl MachineStore {
    /// Describe the store for `machine_name` rooted at `store_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the machine name is empty or is not a single
    /// path component.
    pub fn new(store_path: impl Into<PathBuf>, machine_name: &str) -> Result<Self> {
        let mut components = Path::new(machine_name).components();
        let single = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single || machine_name.contains(['/', '\\']) {
            return Err(ConfigError::InvalidMachineName(machine_name.to_string()).into());
        }
        Ok(Self {
            store_path: store_path.into(),
            machine_name: machine_name.to_string(),
        })
    }

    #[must_use]
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    #[must_use]
    pub fn machine_name(&self) -> &str {
        &self.machine_name
    }

    /// `<store>/id_rsa`
    #[must_use]
    pub fn ssh_key_path(&self) -> PathBuf {
        self.store_path.join(SSH_KEY_NAME)
    }

    /// `<store>/id_rsa.pub`
    #[must_use]
    pub fn public_key_path(&self) -> PathBuf {
        public_key_path(&self.ssh_key_path())
    }

    /// `<store>/<machine-name>.rawdisk`
    #[must_use]
    pub fn disk_path(&self) -> PathBuf {
        self.store_path
            .join(format!("{}.{RAW_DISK_EXTENSION}", self.machine_name))
    }
}

/// Public key location for a private key: the same path with `.pub` appended.
#[must_use]
pub fn public_key_path(private_key: &Path) -> PathBuf {
    let mut s = OsString::from(private_key.as_os_str());
    s.push(PUBLIC_KEY_SUFFIX);
    PathBuf::from(s)
}

/// Final image length for a declared size in megabytes.
#[must_use]
pub fn disk_size_bytes(size_mb: u64) -> u64 {
    size_mb.saturating_mul(BYTES_PER_MB)
}

/// Build the tar container written at the start of a raw disk.
///
/// Layout: the format marker, a `.ssh` directory (0700) and the public key
/// as both `.ssh/authorized_keys` and `.ssh/authorized_keys2` (0644).
///
/// # Errors
///
/// Returns an error if the archive cannot be assembled.
pub fn make_disk_image(public_key: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut builder = tar::Builder::new(Vec::new());

    append_file(&mut builder, FORMAT_MARKER, FORMAT_MARKER.as_bytes(), 0o644)?;

    let mut dir = tar::Header::new_gnu();
    dir.set_entry_type(tar::EntryType::Directory);
    dir.set_mode(0o700);
    dir.set_size(0);
    builder.append_data(&mut dir, ".ssh", std::io::empty())?;

    append_file(&mut builder, ".ssh/authorized_keys", public_key, 0o644)?;
    append_file(&mut builder, ".ssh/authorized_keys2", public_key, 0o644)?;

    builder.into_inner()
}

fn append_file(
    builder: &mut tar::Builder<Vec<u8>>,
    name: &str,
    data: &[u8],
    mode: u32,
) -> std::io::Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_mode(mode);
    header.set_size(data.len() as u64);
    builder.append_data(&mut header, name, data)
}
