//! Shared data model for buildenv.
//!
//! These types describe what a compilation asks for ([`LibraryRequest`]),
//! what the artifact repository offers ([`CandidatePackage`]), and the key
//! both are matched on ([`BuildDescriptor`]).

pub mod arch;
pub mod descriptor;
pub mod package;
pub mod types;

// Re-exports
pub use arch::*;
pub use descriptor::{Attribute, BuildDescriptor};
pub use package::{CandidatePackage, CompilerSettings, PackageSettings};
pub use types::*;

/// Compiler setting value marking a compiler-agnostic, shared-library package.
pub const SHARED_COMPILER: &str = "cshared";
