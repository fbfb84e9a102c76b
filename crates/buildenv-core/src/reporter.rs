//! Reporter trait for dependency injection
//!
//! This trait allows provisioning logic to report progress and status without
//! being coupled to a specific console or build-log presentation.

use std::time::Duration;

use buildenv_schema::{LibraryId, Version};

/// Receives per-library progress from a provisioning run.
pub trait Reporter: Send + Sync {
    /// Indicates a new phase has started (e.g. "Listing", "Downloading").
    fn section(&self, title: &str);

    /// The repository has nothing usable for this library; it is skipped.
    fn unavailable(&self, name: &LibraryId, version: &Version, reason: &str);

    /// Candidates exist but none matches the build descriptor.
    fn no_match(&self, name: &LibraryId, version: &Version);

    /// A matched package is being fetched from `url`.
    fn downloading(&self, name: &LibraryId, version: &Version, url: &str);

    /// Marks a library as provisioned.
    fn done(&self, name: &LibraryId, version: &Version, elapsed: Duration);

    /// Marks a library download or extraction as failed.
    fn failed(&self, name: &LibraryId, version: &Version, reason: &str);

    /// Display a final summary of the run.
    fn summary(&self, count: usize, elapsed_secs: f64);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title);
    }
    fn unavailable(&self, name: &LibraryId, version: &Version, reason: &str) {
        (**self).unavailable(name, version, reason);
    }
    fn no_match(&self, name: &LibraryId, version: &Version) {
        (**self).no_match(name, version);
    }
    fn downloading(&self, name: &LibraryId, version: &Version, url: &str) {
        (**self).downloading(name, version, url);
    }
    fn done(&self, name: &LibraryId, version: &Version, elapsed: Duration) {
        (**self).done(name, version, elapsed);
    }
    fn failed(&self, name: &LibraryId, version: &Version, reason: &str) {
        (**self).failed(name, version, reason);
    }
    fn summary(&self, count: usize, elapsed_secs: f64) {
        (**self).summary(count, elapsed_secs);
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn unavailable(&self, _: &LibraryId, _: &Version, _: &str) {}
    fn no_match(&self, _: &LibraryId, _: &Version) {}
    fn downloading(&self, _: &LibraryId, _: &Version, _: &str) {}
    fn done(&self, _: &LibraryId, _: &Version, _: Duration) {}
    fn failed(&self, _: &LibraryId, _: &Version, _: &str) {}
    fn summary(&self, _: usize, _: f64) {}
}
