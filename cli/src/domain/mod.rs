//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod machine;
pub mod version;

pub use config::{DriverRegistry, DriverSpec, HvConfig};
pub use error::{ConfigError, DiskStep, DriverError};
pub use machine::MachineStore;
pub use version::{Decision, InstallReason, InstalledDriverProbe, VersionFormat};
