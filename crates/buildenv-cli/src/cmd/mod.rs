//! Subcommand implementations

pub mod descriptor;
pub mod provision;
