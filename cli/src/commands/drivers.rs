//! `hvdriver drivers` — list the driver registry.

use anyhow::Result;
use serde::Serialize;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::output::json;

#[derive(Serialize)]
struct DriverRow<'a> {
    name: &'a str,
    url: &'a str,
    minimum_version: String,
}

/// Run the drivers command.
///
/// # Errors
///
/// Returns an error if the config file is unreadable or invalid.
pub fn run(app: &AppContext) -> Result<()> {
    let (_, registry) = app.load_registry()?;
    let rows: Vec<DriverRow<'_>> = registry
        .iter()
        .map(|(name, spec)| DriverRow {
            name,
            url: &spec.url,
            minimum_version: spec.minimum_version.to_string(),
        })
        .collect();

    if app.is_json() {
        return json::print(&rows);
    }

    app.output.header("Registered drivers");
    for row in &rows {
        app.output
            .kv(row.name, &format!(">= {}  {}", row.minimum_version, row.url));
    }
    if let Ok(path) = app.config.path() {
        app.output.info(&format!("config: {}", path.display()));
    }
    Ok(())
}
