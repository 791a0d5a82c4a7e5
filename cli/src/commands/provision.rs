//! `hvdriver provision` — build the boot disk of a machine.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::provision::{
    ProvisionContext, ProvisionOutcome, provision_disk,
};
use crate::domain::MachineStore;
use crate::infra::command_runner::StdCommandRunner;
use crate::infra::disk::LocalRawDisk;
use crate::infra::fetch::HttpFetcher;
use crate::infra::fs::LocalFs;
use crate::infra::iso::CachedIsoStager;
use crate::infra::ssh::SshKeygen;
use crate::output::json;

/// Disk size used when `--disk-size-mb` is not given.
pub const DEFAULT_DISK_SIZE_MB: u64 = 20_000;

/// Arguments for the provision command.
#[derive(Args)]
pub struct ProvisionArgs {
    /// Machine store directory
    #[arg(long, value_name = "DIR")]
    pub store_path: PathBuf,

    /// Machine name; the disk is written to <STORE>/<NAME>.rawdisk
    #[arg(long, value_name = "NAME")]
    pub machine_name: String,

    /// Boot ISO location (https URL, file:// URL, or local path)
    #[arg(long, value_name = "URL")]
    pub boot_url: String,

    /// Raw disk size in megabytes (1 MB = 1,000,000 bytes)
    #[arg(long, value_name = "MB", default_value_t = DEFAULT_DISK_SIZE_MB)]
    pub disk_size_mb: u64,
}

/// Run the provision command.
///
/// # Errors
///
/// Returns an error if any provisioning step fails.
pub fn run(app: &AppContext, args: &ProvisionArgs) -> Result<()> {
    let machine = MachineStore::new(&args.store_path, &args.machine_name)?;

    let runner = StdCommandRunner;
    let fetcher = HttpFetcher::new();
    let progress = app.progress("boot ISO");
    let reporter = app.reporter();
    let stager = CachedIsoStager::new(&fetcher, progress.as_ref());
    let keygen = SshKeygen::new(&runner);
    let fs = LocalFs::new();
    let ctx = ProvisionContext {
        stager: &stager,
        keygen: &keygen,
        disks: &LocalRawDisk,
        chowner: &fs,
        reporter: reporter.as_ref(),
    };

    let outcome = provision_disk(&ctx, &machine, &args.boot_url, args.disk_size_mb)?;

    if app.is_json() {
        return json::print(&outcome);
    }
    match &outcome {
        ProvisionOutcome::Created { disk_path } => app
            .output
            .success(&format!("Created {}", disk_path.display())),
        ProvisionOutcome::AlreadyPresent { disk_path } => app
            .output
            .info(&format!("{} already exists", disk_path.display())),
    }
    Ok(())
}
