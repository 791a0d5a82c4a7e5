//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one pretty-printed document to
//! stdout: the command's result on success, an error object on failure.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::error::DriverError;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Stable machine-readable code for a failure.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<DriverError>() {
        Some(DriverError::LookupFailure { .. }) => "lookup_failure",
        Some(DriverError::ProbeParseFailure { .. }) => "probe_parse_failure",
        Some(DriverError::FetchFailure { .. }) => "fetch_failure",
        Some(DriverError::PermissionFailure { .. }) => "permission_failure",
        Some(DriverError::DiskCreateFailure { .. }) => "disk_create_failure",
        Some(DriverError::OwnershipFailure { .. }) => "ownership_failure",
        None => "error",
    }
}

/// Print `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{text}");
    Ok(())
}
