//! Library manifest (`libs.toml`).
//!
//! ```toml
//! [libraries.fmt]
//! version = "10.1.1"
//! staticliblink = ["fmt"]
//!
//! [libraries.boost]
//! version = "1.84.0"
//! lookupname = "boost_bin"
//! lookupversion = "184"
//! packagedheaders = true
//! ```
//!
//! Table order is kept, so libraries are requested in the order they appear.

use std::path::Path;

use anyhow::{Context, Result};
use buildenv_schema::LibraryRequest;
use serde::Deserialize;

/// Version value meaning "whatever the system provides"; never provisioned.
pub const AUTODETECT_VERSION: &str = "autodetect";

/// One `[libraries.<id>]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryEntry {
    pub version: String,
    #[serde(default)]
    pub lookupname: Option<String>,
    #[serde(default)]
    pub lookupversion: Option<String>,
    #[serde(default)]
    pub packagedheaders: bool,
    #[serde(default)]
    pub staticliblink: Vec<String>,
    #[serde(default)]
    pub liblink: Vec<String>,
    #[serde(default)]
    pub libpath: Vec<String>,
}

impl LibraryEntry {
    /// Whether the library ships binaries the compilation has to link.
    ///
    /// A library with an explicit `libpath` is linked from there instead.
    pub fn has_binaries_to_link(&self) -> bool {
        self.libpath.is_empty()
            && (!self.staticliblink.is_empty() || !self.liblink.is_empty())
            && self.version != AUTODETECT_VERSION
    }

    /// Request for library `id`.
    pub fn to_request(&self, id: &str) -> LibraryRequest {
        let mut request = LibraryRequest::new(id, self.version.as_str())
            .with_packaged_headers(self.packagedheaders)
            .with_binaries_to_link(self.has_binaries_to_link());
        if let Some(name) = &self.lookupname {
            request = request.with_lookup_name(name);
        }
        if let Some(version) = &self.lookupversion {
            request = request.with_lookup_version(version);
        }
        request
    }
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    libraries: toml::Table,
}

/// Parsed library manifest, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryManifest {
    pub libraries: Vec<(String, LibraryEntry)>,
}

impl LibraryManifest {
    /// Parse a manifest from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawManifest = toml::from_str(content).context("Invalid library manifest")?;

        let libraries = raw
            .libraries
            .into_iter()
            .map(|(id, value)| {
                let entry: LibraryEntry = value
                    .try_into()
                    .with_context(|| format!("Invalid entry for library '{id}'"))?;
                Ok((id, entry))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { libraries })
    }

    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("In {}", path.display()))
    }

    /// Provisioning requests for every library, in manifest order.
    pub fn requests(&self) -> Vec<LibraryRequest> {
        self.libraries
            .iter()
            .map(|(id, entry)| entry.to_request(id))
            .collect()
    }
}
