//! Core library for buildenv.
//!
//! Provisions pre-built third-party libraries for a compiler/target
//! configuration: resolve a [`BuildDescriptor`](buildenv_schema::BuildDescriptor),
//! list candidate packages from the artifact repository, pick the matching
//! one, then download and extract it under a destination root.
//!
//! Libraries that are simply unavailable (not listed, no matching build) are
//! skipped with a warning. A library that matched but failed to download or
//! extract fails the whole run.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod io;
pub mod matcher;
pub mod provision;
pub mod reporter;
pub mod repository;

pub use config::ProvisionConfig;
pub use descriptor::CompilerTarget;
pub use error::{ExtractError, ProvisionError, RepositoryError};
pub use provision::{DownloadResult, Provisioner};
pub use reporter::{NullReporter, Reporter};
pub use repository::{ConanRepository, PackageSource};

/// User Agent string for core operations
pub const USER_AGENT: &str = concat!("buildenv-core/", env!("CARGO_PKG_VERSION"));
