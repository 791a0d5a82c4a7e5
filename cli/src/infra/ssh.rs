//! SSH key generation — implements `SshKeyGenerator` via `ssh-keygen`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, SshKeyGenerator};
use crate::domain::error::DriverError;
use crate::domain::machine::public_key_path;

/// Key generation program.
pub const SSH_KEYGEN: &str = "ssh-keygen";

/// Generates an unencrypted RSA key pair by shelling out to `ssh-keygen`.
pub struct SshKeygen<'a, R> {
    runner: &'a R,
}

impl<'a, R: CommandRunner> SshKeygen<'a, R> {
    #[must_use]
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> SshKeyGenerator for SshKeygen<'_, R> {
    fn generate_key_pair(&self, path: &Path) -> Result<()> {
        if path.exists() {
            tracing::debug!(key = %path.display(), "ssh key already present");
            return Ok(());
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }

        let key = path.to_string_lossy().into_owned();
        let output = self
            .runner
            .run(
                SSH_KEYGEN,
                &["-t", "rsa", "-b", "2048", "-N", "", "-q", "-f", key.as_str()],
            )
            .map_err(|e| match e.downcast_ref::<std::io::Error>() {
                Some(io) if io.kind() == std::io::ErrorKind::NotFound => {
                    DriverError::LookupFailure {
                        program: SSH_KEYGEN.to_string(),
                        reason: "not found on PATH".to_string(),
                    }
                    .into()
                }
                _ => e,
            })?;

        anyhow::ensure!(
            output.status.success(),
            "{SSH_KEYGEN} failed ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        anyhow::ensure!(
            public_key_path(path).exists(),
            "{SSH_KEYGEN} did not write {}",
            public_key_path(path).display()
        );
        Ok(())
    }
}
