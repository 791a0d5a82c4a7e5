//! Driver version extraction and the install decision.
//!
//! Pure functions only — no I/O, no process execution. The probe itself
//! (locating and running the binary) lives in the application layer.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;
use serde::Serialize;

/// Prefix drivers print in front of their semantic version, e.g. `v1.2.3`.
pub const VERSION_PREFIX: &str = "v";

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static VERSION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"version:(.*)").expect("valid version regex"));

// ── Extraction ───────────────────────────────────────────────────────────────

/// A probe output format that knows where a driver prints its version.
pub trait VersionFormat {
    /// Return the version token found in `output`, or `None` when the output
    /// carries no version at all.
    fn extract(&self, output: &str) -> Option<String>;
}

/// The `version: vX.Y.Z` / `commit: <hash>` format printed by machine drivers.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabeledLine;

impl VersionFormat for LabeledLine {
    fn extract(&self, output: &str) -> Option<String> {
        let token = extract_driver_version(output);
        (!token.is_empty()).then_some(token)
    }
}

/// Extract the driver version from `version` subcommand output.
///
/// Drivers print:
///
/// ```text
/// version: vX.Y.Z
/// commit: XXXX
/// ```
///
/// Returns `X.Y.Z` (prefix stripped), or an empty string if no `version:`
/// line is present.
#[must_use]
pub fn extract_driver_version(output: &str) -> String {
    VERSION_LINE
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| strip_prefix(m.as_str().trim()).to_string())
        .unwrap_or_default()
}

/// Parse a user-supplied version, accepting an optional `v` prefix.
///
/// # Errors
///
/// Returns an error if the remainder is not a valid semantic version.
pub fn parse_version(input: &str) -> Result<Version, semver::Error> {
    Version::parse(strip_prefix(input.trim()))
}

fn strip_prefix(token: &str) -> &str {
    token.strip_prefix(VERSION_PREFIX).unwrap_or(token)
}

// ── Probe result and decision ────────────────────────────────────────────────

/// What querying the local driver binary revealed. Never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "version", rename_all = "snake_case")]
pub enum InstalledDriverProbe {
    /// No executable with that name is resolvable on `PATH`.
    NotFound,
    /// The binary exists but `version` failed or printed no version.
    NoVersionSupport,
    /// The binary reported a well-formed version.
    VersionKnown(Version),
}

/// Why a driver needs to be (re)installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum InstallReason {
    NotFound,
    NoVersionSupport,
    Outdated { found: Version, required: Version },
}

/// Outcome of comparing a probe against the required minimum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The installed driver satisfies the minimum; leave it alone.
    Keep(Version),
    /// Fetch and install a replacement.
    Install(InstallReason),
}

/// Decide whether the probed driver must be replaced.
#[must_use]
pub fn decide(probe: InstalledDriverProbe, minimum: &Version) -> Decision {
    match probe {
        InstalledDriverProbe::NotFound => Decision::Install(InstallReason::NotFound),
        InstalledDriverProbe::NoVersionSupport => {
            Decision::Install(InstallReason::NoVersionSupport)
        }
        InstalledDriverProbe::VersionKnown(found) => {
            if precedes(&found, minimum) {
                Decision::Install(InstallReason::Outdated {
                    found,
                    required: minimum.clone(),
                })
            } else {
                Decision::Keep(found)
            }
        }
    }
}

/// Semantic-version precedence: major, minor, patch, then pre-release.
/// Build metadata does not take part.
#[must_use]
pub fn precedes(a: &Version, b: &Version) -> bool {
    (a.major, a.minor, a.patch)
        .cmp(&(b.major, b.minor, b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
        == Ordering::Less
}

// ── Unit tests ───────────────────────────────────────────────────────────────
