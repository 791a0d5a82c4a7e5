//! `hvdriver probe` — report what is installed for a driver.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::application::services::reconcile::probe_driver;
use crate::domain::InstalledDriverProbe;
use crate::domain::config::KVM2_DRIVER;
use crate::infra::command_runner::StdCommandRunner;
use crate::infra::fs::LocalFs;
use crate::output::json;

/// Arguments for the probe command.
#[derive(Args)]
pub struct ProbeArgs {
    /// Driver executable name
    #[arg(default_value = KVM2_DRIVER)]
    pub driver: String,
}

#[derive(Serialize)]
struct ProbeReport<'a> {
    driver: &'a str,
    #[serde(flatten)]
    probe: &'a InstalledDriverProbe,
}

/// Run the probe command.
///
/// # Errors
///
/// Returns an error if the driver reports a malformed version.
pub fn run(app: &AppContext, args: &ProbeArgs) -> Result<()> {
    let probe = probe_driver(&LocalFs::new(), &StdCommandRunner, &args.driver)?;

    if app.is_json() {
        return json::print(&ProbeReport {
            driver: &args.driver,
            probe: &probe,
        });
    }
    let status = match &probe {
        InstalledDriverProbe::NotFound => "not found".to_string(),
        InstalledDriverProbe::NoVersionSupport => "installed, reports no version".to_string(),
        InstalledDriverProbe::VersionKnown(v) => format!("version {v}"),
    };
    app.output.kv(&args.driver, &status);
    Ok(())
}
