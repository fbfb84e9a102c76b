use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Logical identifier of a library (e.g. `fmt`, `boost`).
///
/// Also names the library's subdirectory under the destination root, so it
/// is stored exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LibraryId(String);

impl LibraryId {
    /// Create a new library id.
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Return the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<std::path::Path> for LibraryId {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

impl AsRef<str> for LibraryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LibraryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for LibraryId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Borrow<str> for LibraryId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for LibraryId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<&str> for LibraryId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for LibraryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A library version string, stored as-is (`1.2.11`, `trunk`, `autodetect`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// Create a new version from the given string (stored as-is).
    pub fn new(v: &str) -> Self {
        Self(v.to_string())
    }

    /// Return the version string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for Version {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Version {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Opaque content hash identifying one pre-built package in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageHash(String);

impl PackageHash {
    /// Wrap a repository package hash.
    pub fn new(hash: &str) -> Self {
        Self(hash.to_string())
    }

    /// Return the hash as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PackageHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<&str> for PackageHash {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<&str> for PackageHash {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PackageHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One library a compilation asks for.
///
/// The repository may know a library under a different name or version than
/// the one the compilation uses; `lookup_name` / `lookup_version` carry that
/// override while `id` keeps naming the on-disk subdirectory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryRequest {
    /// Logical library id.
    pub id: LibraryId,
    /// Requested version.
    pub version: Version,
    /// Name to query the repository with, if it differs from `id`.
    pub lookup_name: Option<String>,
    /// Version to query the repository with, if it differs from `version`.
    pub lookup_version: Option<String>,
    /// Headers for this library ship as a package.
    pub packaged_headers: bool,
    /// The library has binaries that must be linked.
    pub has_binaries_to_link: bool,
}

impl LibraryRequest {
    /// Create a request with no lookup override and no artifact needs.
    pub fn new(id: impl Into<LibraryId>, version: impl Into<Version>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            lookup_name: None,
            lookup_version: None,
            packaged_headers: false,
            has_binaries_to_link: false,
        }
    }

    /// Set the repository lookup name.
    pub fn with_lookup_name(mut self, name: impl Into<String>) -> Self {
        self.lookup_name = Some(name.into());
        self
    }

    /// Set the repository lookup version.
    pub fn with_lookup_version(mut self, version: impl Into<String>) -> Self {
        self.lookup_version = Some(version.into());
        self
    }

    /// Mark the library as shipping packaged headers.
    pub fn with_packaged_headers(mut self, packaged: bool) -> Self {
        self.packaged_headers = packaged;
        self
    }

    /// Mark the library as having binaries to link.
    pub fn with_binaries_to_link(mut self, binaries: bool) -> Self {
        self.has_binaries_to_link = binaries;
        self
    }

    /// Name used against the repository.
    pub fn lookup_id(&self) -> &str {
        self.lookup_name.as_deref().unwrap_or(self.id.as_str())
    }

    /// Version used against the repository.
    pub fn lookup_version(&self) -> &str {
        self.lookup_version
            .as_deref()
            .unwrap_or(self.version.as_str())
    }

    /// Whether an artifact has to be fetched for this library at all.
    pub fn needs_provisioning(&self) -> bool {
        self.packaged_headers || self.has_binaries_to_link
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_defaults_to_id_and_version() {
        let req = LibraryRequest::new("fmt", "10.1.1");
        assert_eq!(req.lookup_id(), "fmt");
        assert_eq!(req.lookup_version(), "10.1.1");
    }

    #[test]
    fn test_lookup_override() {
        let req = LibraryRequest::new("boost", "1.84")
            .with_lookup_name("boost_bin")
            .with_lookup_version("1.84.0");
        assert_eq!(req.lookup_id(), "boost_bin");
        assert_eq!(req.lookup_version(), "1.84.0");
        assert_eq!(req.id, "boost");
    }

    #[test]
    fn test_needs_provisioning() {
        let header_only = LibraryRequest::new("catch2", "3.0");
        assert!(!header_only.needs_provisioning());
        assert!(header_only.clone().with_packaged_headers(true).needs_provisioning());
        assert!(header_only.with_binaries_to_link(true).needs_provisioning());
    }
}
