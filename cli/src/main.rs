//! hvdriver - keeps hypervisor machine drivers current and builds boot disks

use clap::Parser;
use hvdriver::cli::Cli;
use hvdriver::output::json;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "HVDRIVER_LOG";

fn init_tracing(verbose: bool) {
    let default = if verbose { "hvdriver=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;

    if let Err(e) = cli.run() {
        let message = format!("{e:#}");
        match json::format_error(&message, json::error_code(&e)) {
            Ok(obj) if json_mode => println!("{obj}"),
            _ => eprintln!("Error: {message}"),
        }
        std::process::exit(1);
    }
}
