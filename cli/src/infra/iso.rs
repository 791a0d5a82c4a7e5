//! Boot ISO staging — implements `IsoStager`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::{Fetcher, IsoStager, ProgressSink};
use crate::domain::MachineStore;

/// ISO file name used when the boot URL does not end in a usable name.
pub const DEFAULT_ISO_NAME: &str = "boot2docker.iso";

/// Stages the boot ISO into the store: local paths and `file://` URLs are
/// copied, anything else is downloaded. An ISO already in the store is kept.
pub struct CachedIsoStager<'a, F> {
    fetcher: &'a F,
    progress: &'a dyn ProgressSink,
}

impl<'a, F: Fetcher> CachedIsoStager<'a, F> {
    #[must_use]
    pub fn new(fetcher: &'a F, progress: &'a dyn ProgressSink) -> Self {
        Self { fetcher, progress }
    }
}

impl<F: Fetcher> IsoStager for CachedIsoStager<'_, F> {
    fn copy_iso_to_machine_dir(&self, boot_url: &str, machine: &MachineStore) -> Result<()> {
        let target = machine.store_path().join(iso_name(boot_url));
        if target.exists() {
            tracing::debug!(iso = %target.display(), "boot ISO already staged");
            return Ok(());
        }

        std::fs::create_dir_all(machine.store_path())
            .with_context(|| format!("creating directory {}", machine.store_path().display()))?;

        if let Some(local) = local_source(boot_url) {
            tracing::info!(from = %local.display(), to = %target.display(), "copying boot ISO");
            std::fs::copy(&local, &target).with_context(|| {
                format!("copying {} to {}", local.display(), target.display())
            })?;
            return Ok(());
        }

        tracing::info!(url = boot_url, to = %target.display(), "downloading boot ISO");
        self.fetcher.fetch(boot_url, &target, self.progress)
    }
}

/// File name the ISO gets inside the store.
#[must_use]
pub fn iso_name(boot_url: &str) -> String {
    let trimmed = boot_url.split(['?', '#']).next().unwrap_or(boot_url);
    trimmed
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| Path::new(name).extension().is_some_and(|ext| ext.eq_ignore_ascii_case("iso")))
        .map_or_else(|| DEFAULT_ISO_NAME.to_string(), ToString::to_string)
}

fn local_source(boot_url: &str) -> Option<PathBuf> {
    if let Some(path) = boot_url.strip_prefix("file://") {
        return Some(PathBuf::from(path));
    }
    if boot_url.contains("://") {
        return None;
    }
    Some(PathBuf::from(boot_url))
}
