//! Command implementations

pub mod drivers;
pub mod probe;
pub mod provision;
pub mod reconcile;
pub mod version;
