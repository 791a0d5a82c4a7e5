//! Application service — driver version reconciliation.
//!
//! Probes the locally installed driver, compares its version with the
//! required minimum and, when needed, installs the registered replacement.
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use semver::Version;
use serde::Serialize;

use crate::application::ports::{
    CommandRunner, DriverHost, Fetcher, ProgressReporter, ProgressSink,
};
use crate::domain::DriverRegistry;
use crate::domain::error::DriverError;
use crate::domain::version::{
    Decision, InstallReason, InstalledDriverProbe, LabeledLine, VersionFormat, decide,
};

/// Mode given to an installed driver binary.
pub const DRIVER_MODE: u32 = 0o777;

/// Subcommand every driver answers with its version.
pub const VERSION_SUBCOMMAND: &str = "version";

// ── Public types ──────────────────────────────────────────────────────────────

/// Everything the reconciler may touch, passed in explicitly.
pub struct ReconcileContext<'a, H, R, F> {
    /// Executable lookup and install-directory mutations.
    pub host: &'a H,
    /// Runs the driver's `version` subcommand.
    pub runner: &'a R,
    /// Downloads replacement binaries.
    pub fetcher: &'a F,
    /// Receives download progress.
    pub progress: &'a dyn ProgressSink,
    /// Receives user-facing step messages.
    pub reporter: &'a dyn ProgressReporter,
}

/// Result of a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// The installed driver already satisfies the minimum.
    UpToDate { version: Version },
    /// A replacement was fetched to `path`.
    Installed { path: PathBuf, reason: InstallReason },
    /// An install was due but the driver is not in the registry.
    Unregistered { reason: InstallReason },
}

// ── Probe ─────────────────────────────────────────────────────────────────────

/// Query the local driver using the `version: vX.Y.Z` output format.
///
/// # Errors
///
/// Returns `DriverError::ProbeParseFailure` if the driver reports a version
/// token that is not a valid semantic version.
pub fn probe_driver(
    host: &impl DriverHost,
    runner: &impl CommandRunner,
    driver: &str,
) -> Result<InstalledDriverProbe> {
    probe_driver_with(host, runner, &LabeledLine, driver)
}

/// Query the local driver, extracting its version with `format`.
///
/// A driver that cannot be found, fails to run `version`, or prints no
/// version is reported as such rather than as an error.
///
/// # Errors
///
/// Returns `DriverError::ProbeParseFailure` if the extracted token is not a
/// valid semantic version.
pub fn probe_driver_with(
    host: &impl DriverHost,
    runner: &impl CommandRunner,
    format: &dyn VersionFormat,
    driver: &str,
) -> Result<InstalledDriverProbe> {
    let Some(path) = host.look_path(driver) else {
        tracing::debug!(driver, "driver not found on PATH");
        return Ok(InstalledDriverProbe::NotFound);
    };

    let program = path.to_string_lossy();
    let output = match runner.run(&program, &[VERSION_SUBCOMMAND]) {
        Ok(o) if o.status.success() => o,
        Ok(o) => {
            tracing::debug!(driver, status = %o.status, "driver does not support 'version'");
            return Ok(InstalledDriverProbe::NoVersionSupport);
        }
        Err(e) => {
            tracing::debug!(driver, error = %format!("{e:#}"), "driver could not be run");
            return Ok(InstalledDriverProbe::NoVersionSupport);
        }
    };

    let text = combined_output(&output.stdout, &output.stderr);
    let Some(token) = format.extract(&text) else {
        tracing::debug!(driver, "driver printed no version");
        return Ok(InstalledDriverProbe::NoVersionSupport);
    };

    let version = Version::parse(&token).map_err(|source| DriverError::ProbeParseFailure {
        driver: driver.to_string(),
        token: token.clone(),
        source,
    })?;
    tracing::debug!(driver, %version, "probed driver version");
    Ok(InstalledDriverProbe::VersionKnown(version))
}

/// Stdout followed by stderr, kept on separate lines.
fn combined_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(stdout).into_owned();
    if !stderr.is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&String::from_utf8_lossy(stderr));
    }
    text
}

// ── Reconcile ─────────────────────────────────────────────────────────────────

/// Install `driver` into `destination` if it is missing or older than
/// `minimum`; otherwise leave it alone.
///
/// Only drivers present in `registry` are ever fetched; for any other name a
/// due install is skipped and reported as [`ReconcileOutcome::Unregistered`].
///
/// # Errors
///
/// Returns an error if the probed version is malformed, the download fails,
/// or the installed binary cannot be made executable.
pub fn reconcile_driver<H, R, F>(
    ctx: &ReconcileContext<'_, H, R, F>,
    registry: &DriverRegistry,
    driver: &str,
    destination: &Path,
    minimum: &Version,
) -> Result<ReconcileOutcome>
where
    H: DriverHost,
    R: CommandRunner,
    F: Fetcher,
{
    let probe = probe_driver(ctx.host, ctx.runner, driver)?;
    match decide(probe, minimum) {
        Decision::Keep(version) => {
            tracing::info!(driver, %version, %minimum, "driver is up to date");
            Ok(ReconcileOutcome::UpToDate { version })
        }
        Decision::Install(reason) => install(ctx, registry, driver, destination, reason),
    }
}

fn install<H, R, F>(
    ctx: &ReconcileContext<'_, H, R, F>,
    registry: &DriverRegistry,
    driver: &str,
    destination: &Path,
    reason: InstallReason,
) -> Result<ReconcileOutcome>
where
    H: DriverHost,
    R: CommandRunner,
    F: Fetcher,
{
    let Some(spec) = registry.get(driver) else {
        tracing::debug!(driver, ?reason, "driver not in registry, not installing");
        return Ok(ReconcileOutcome::Unregistered { reason });
    };

    ctx.reporter.step(&format!("Downloading driver {driver}:"));
    tracing::info!(driver, url = %spec.url, ?reason, "installing driver");

    let target = destination.join(driver);
    let permission_failure = |source| DriverError::PermissionFailure {
        driver: driver.to_string(),
        url: spec.url.clone(),
        path: target.clone(),
        source,
    };

    ctx.host.remove_file(&target).map_err(permission_failure)?;

    ctx.fetcher
        .fetch(&spec.url, &target, ctx.progress)
        .map_err(|source| DriverError::FetchFailure {
            driver: driver.to_string(),
            url: spec.url.clone(),
            source,
        })?;

    ctx.host
        .set_mode(&target, DRIVER_MODE)
        .map_err(permission_failure)?;

    ctx.reporter
        .success(&format!("Installed {driver} to {}", target.display()));
    Ok(ReconcileOutcome::Installed {
        path: target,
        reason,
    })
}
