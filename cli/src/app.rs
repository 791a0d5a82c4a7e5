//! Application context — unified state passed to every command handler.
//!
//! Constructed once in `Cli::run()` from the global flags, so handlers never
//! rebuild output state or re-read the environment themselves.

use anyhow::Result;

use crate::application::ports::{ConfigStore, ProgressReporter, ProgressSink};
use crate::domain::{DriverRegistry, HvConfig};
use crate::infra::config::YamlConfigStore;
use crate::output::OutputContext;
use crate::output::progress::{BarProgress, SilentProgress};
use crate::output::reporter::{SilentReporter, TerminalReporter};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags passed from the top-level CLI.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Source of the driver registry configuration.
    pub config: YamlConfigStore,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &OutputFlags) -> Self {
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            mode,
            config: YamlConfigStore::new(),
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Step reporter for application services. Silent in JSON mode.
    #[must_use]
    pub fn reporter(&self) -> Box<dyn ProgressReporter + '_> {
        match self.mode {
            OutputMode::Human => Box::new(TerminalReporter::new(&self.output)),
            OutputMode::Json => Box::new(SilentReporter),
        }
    }

    /// Download progress sink labelled `label`.
    #[must_use]
    pub fn progress(&self, label: &str) -> Box<dyn ProgressSink> {
        if self.is_json() || !self.output.show_progress() {
            Box::new(SilentProgress)
        } else {
            Box::new(BarProgress::new(label))
        }
    }

    /// Load the config file and build the registry from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be parsed or holds an
    /// invalid registry entry.
    pub fn load_registry(&self) -> Result<(HvConfig, DriverRegistry)> {
        let config = self.config.load()?;
        let registry = DriverRegistry::from_config(&config)?;
        Ok((config, registry))
    }
}
