//! Colors for terminal output. Every style is plain until [`Styles::colorize`].

use owo_colors::Style;

#[derive(Default, Clone)]
pub struct Styles {
    /// Driver kept or installed, disk ready.
    pub success: Style,
    /// Driver outdated or unregistered.
    pub warning: Style,
    pub info: Style,
    /// Reporter steps such as "Fetching driver...".
    pub step: Style,
    /// Keys in `kv` listings.
    pub dim: Style,
    pub header: Style,
}

impl Styles {
    pub fn colorize(&mut self) {
        *self = Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            info: Style::new().blue(),
            step: Style::new().cyan(),
            dim: Style::new().dimmed(),
            header: Style::new().bold().cyan(),
        };
    }
}
