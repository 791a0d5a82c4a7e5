//! Human-readable terminal output for the driver and disk commands.
//!
//! JSON output lives in [`json`]; step reporting during long operations in
//! [`reporter`].

pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::{OwoColorize as _, Style};
pub use styles::Styles;

/// Styling and verbosity shared by the command handlers.
pub struct OutputContext {
    pub styles: Styles,
    /// Suppress everything except errors.
    pub quiet: bool,
}

impl OutputContext {
    /// Colors are used only when stdout is a terminal and neither `--no-color`
    /// nor `NO_COLOR` asks otherwise.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let mut styles = Styles::default();
        if !no_color && std::env::var_os("NO_COLOR").is_none() && Term::stdout().is_term() {
            styles.colorize();
        }
        Self { styles, quiet }
    }

    /// Download bars go to stderr, so only its terminal state matters.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        !self.quiet && Term::stderr().is_term()
    }

    pub fn success(&self, msg: &str) {
        self.emit(&marked("✓", self.styles.success, msg));
    }

    pub fn warn(&self, msg: &str) {
        self.emit(&marked("⚠", self.styles.warning, msg));
    }

    pub fn info(&self, msg: &str) {
        self.emit(&marked("ℹ", self.styles.info, msg));
    }

    pub fn header(&self, msg: &str) {
        self.emit(&format!("  {}", msg.style(self.styles.header)));
    }

    /// A driver or disk attribute, key dimmed.
    pub fn kv(&self, key: &str, value: &str) {
        self.emit(&format!("  {}  {value}", key.style(self.styles.dim)));
    }

    fn emit(&self, line: &str) {
        if !self.quiet {
            println!("{line}");
        }
    }
}

/// Indented line led by a styled status marker.
fn marked(marker: &str, style: Style, msg: &str) -> String {
    format!("  {} {msg}", marker.style(style))
}
