//! `hvdriver reconcile` — make sure a driver binary meets its minimum version.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use semver::Version;

use crate::app::AppContext;
use crate::application::services::reconcile::{
    ReconcileContext, ReconcileOutcome, reconcile_driver,
};
use crate::domain::config::KVM2_DRIVER;
use crate::domain::version::parse_version;
use crate::infra::command_runner::StdCommandRunner;
use crate::infra::config::install_dir;
use crate::infra::fetch::HttpFetcher;
use crate::infra::fs::LocalFs;
use crate::output::json;

/// Arguments for the reconcile command.
#[derive(Args)]
pub struct ReconcileArgs {
    /// Driver executable name
    #[arg(default_value = KVM2_DRIVER)]
    pub driver: String,

    /// Install directory [default: config `install_dir` or ~/.hvdriver/bin]
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Oldest acceptable version [default: the registry entry's minimum]
    #[arg(long, value_name = "VERSION", value_parser = parse_version)]
    pub min_version: Option<Version>,
}

/// Run the reconcile command.
///
/// # Errors
///
/// Returns an error if the config is invalid, the installed driver reports a
/// malformed version, or installing the replacement fails.
pub fn run(app: &AppContext, args: &ReconcileArgs) -> Result<()> {
    let (config, registry) = app.load_registry()?;
    let destination = match &args.dest {
        Some(dir) => dir.clone(),
        None => install_dir(&config)?,
    };
    // Unregistered drivers can never be fetched, so any version is kept.
    let minimum = args
        .min_version
        .clone()
        .or_else(|| registry.get(&args.driver).map(|s| s.minimum_version.clone()))
        .unwrap_or_else(|| Version::new(0, 0, 0));

    let host = LocalFs::new();
    let runner = StdCommandRunner;
    let fetcher = HttpFetcher::new();
    let progress = app.progress(&args.driver);
    let reporter = app.reporter();
    let ctx = ReconcileContext {
        host: &host,
        runner: &runner,
        fetcher: &fetcher,
        progress: progress.as_ref(),
        reporter: reporter.as_ref(),
    };

    let outcome = reconcile_driver(&ctx, &registry, &args.driver, &destination, &minimum)?;

    if app.is_json() {
        return json::print(&outcome);
    }
    match &outcome {
        ReconcileOutcome::UpToDate { version } => app
            .output
            .success(&format!("{} {version} satisfies >= {minimum}", args.driver)),
        ReconcileOutcome::Installed { .. } => {}
        ReconcileOutcome::Unregistered { .. } => app.output.warn(&format!(
            "{} needs installing but has no registry entry; skipped",
            args.driver
        )),
    }
    Ok(())
}
