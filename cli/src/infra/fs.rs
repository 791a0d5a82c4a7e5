//! Filesystem infrastructure — implements `DriverHost` and `Chowner`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::{Chowner, DriverHost};

/// Production filesystem implementation of the host ports.
#[derive(Debug, Default)]
pub struct LocalFs {
    search_path: Option<OsString>,
}

impl LocalFs {
    /// Resolve executables against the process `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve executables against `search_path` instead of `PATH` (for testing).
    #[must_use]
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }
}

impl DriverHost for LocalFs {
    fn look_path(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }
        if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
            let candidate = PathBuf::from(name);
            return is_executable(&candidate).then_some(candidate);
        }
        let search_path = self
            .search_path
            .clone()
            .or_else(|| std::env::var_os("PATH"))?;
        std::env::split_paths(&search_path)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable(candidate))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other.with_context(|| format!("removing file {}", path.display())),
        }
    }

    fn set_mode(&self, path: &Path, mode: u32) -> Result<()> {
        set_permissions(path, mode)
    }
}

#[cfg(unix)]
impl Chowner for LocalFs {
    fn effective_ids(&self) -> (u32, u32) {
        (
            nix::unistd::geteuid().as_raw(),
            nix::unistd::getegid().as_raw(),
        )
    }

    fn list_children(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::read_dir(dir)
            .with_context(|| format!("reading directory {}", dir.display()))?
            .map(|entry| {
                entry
                    .map(|e| e.path())
                    .with_context(|| format!("reading directory {}", dir.display()))
            })
            .collect()
    }

    fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        std::os::unix::fs::chown(path, Some(uid), Some(gid))
            .with_context(|| format!("chown {uid}:{gid} {}", path.display()))
    }
}

#[cfg(not(unix))]
impl Chowner for LocalFs {
    fn effective_ids(&self) -> (u32, u32) {
        (0, 0)
    }

    fn list_children(&self, _dir: &Path) -> Result<Vec<PathBuf>> {
        Ok(Vec::new())
    }

    fn chown(&self, _path: &Path, _uid: u32, _gid: u32) -> Result<()> {
        Ok(())
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(unix)]
fn set_permissions(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .with_context(|| format!("setting permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn set_permissions(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
