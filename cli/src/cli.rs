//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, OutputFlags};
use crate::commands;

/// Keep hypervisor machine drivers current and provision their boot disks
#[derive(Parser)]
#[command(
    name = "hvdriver",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Log debug detail to stderr (overridden by HVDRIVER_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Install or update a driver if it is missing or too old
    Reconcile(commands::reconcile::ReconcileArgs),

    /// Show the installed version of a driver
    Probe(commands::probe::ProbeArgs),

    /// Build the raw boot disk of a machine
    Provision(commands::provision::ProvisionArgs),

    /// List registered drivers
    Drivers,

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub fn run(self) -> Result<()> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose: _,
            command,
        } = self;
        let app = AppContext::new(&OutputFlags {
            no_color,
            quiet,
            json,
        });
        match command {
            Command::Reconcile(args) => commands::reconcile::run(&app, &args),
            Command::Probe(args) => commands::probe::run(&app, &args),
            Command::Provision(args) => commands::provision::run(&app, &args),
            Command::Drivers => commands::drivers::run(&app),
            Command::Version => {
                commands::version::run(json);
                Ok(())
            }
        }
    }
}
