//! Repository-side package records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::SHARED_COMPILER;
use crate::descriptor::{Attribute, BuildDescriptor};
use crate::types::PackageHash;

/// Settings a package was built with, keyed like [`BuildDescriptor`] attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageSettings(BTreeMap<String, String>);

impl PackageSettings {
    /// Create an empty settings map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Setting value by raw key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Setting value for a descriptor attribute.
    pub fn attribute(&self, attribute: Attribute) -> Option<&str> {
        self.get(attribute.key())
    }

    /// Set a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// The compiler triple of these settings.
    pub fn compiler_settings(&self) -> CompilerSettings<'_> {
        match self.attribute(Attribute::Compiler) {
            Some(SHARED_COMPILER) => CompilerSettings::SharedAny,
            name => CompilerSettings::Specific {
                name,
                version: self.attribute(Attribute::CompilerVersion),
                libcxx: self.attribute(Attribute::CompilerLibcxx),
            },
        }
    }
}

impl From<&BuildDescriptor> for PackageSettings {
    fn from(descriptor: &BuildDescriptor) -> Self {
        Self(
            descriptor
                .attributes()
                .map(|(a, v)| (a.key().to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PackageSettings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Compiler portion of a package's settings.
///
/// Packages built as compiler-agnostic shared libraries are published with
/// `compiler = "cshared"`; they satisfy any compiler, version and standard
/// library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerSettings<'a> {
    /// Built by one compiler. Missing settings are `None` and match nothing.
    Specific {
        /// `compiler`
        name: Option<&'a str>,
        /// `compiler.version`
        version: Option<&'a str>,
        /// `compiler.libcxx`
        libcxx: Option<&'a str>,
    },
    /// Usable with any compiler configuration.
    SharedAny,
}

impl CompilerSettings<'_> {
    /// Whether these settings satisfy the descriptor's compiler triple.
    pub fn accepts(&self, descriptor: &BuildDescriptor) -> bool {
        match *self {
            Self::SharedAny => true,
            Self::Specific {
                name,
                version,
                libcxx,
            } => {
                name == Some(descriptor.compiler.as_str())
                    && version == Some(descriptor.compiler_version.as_str())
                    && libcxx == Some(descriptor.compiler_libcxx.as_str())
            }
        }
    }
}

/// A pre-built package the repository offers for one library/version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePackage {
    /// Content hash of the package.
    pub hash: PackageHash,
    /// Settings the package was built with.
    pub settings: PackageSettings,
}

impl CandidatePackage {
    /// Create a candidate from its hash and settings.
    pub fn new(hash: impl Into<PackageHash>, settings: PackageSettings) -> Self {
        Self {
            hash: hash.into(),
            settings,
        }
    }
}
