//! The build descriptor: the normalized key packages are matched on.

use serde::{Deserialize, Serialize};

/// One attribute of a [`BuildDescriptor`], named by its repository settings key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// `os`
    Os,
    /// `build_type`
    BuildType,
    /// `compiler`
    Compiler,
    /// `compiler.version`
    CompilerVersion,
    /// `compiler.libcxx`
    CompilerLibcxx,
    /// `arch`
    Arch,
    /// `stdver`
    StdVer,
    /// `flagcollection`
    FlagCollection,
}

impl Attribute {
    /// Every attribute, in descriptor order.
    pub const ALL: [Self; 8] = [
        Self::Os,
        Self::BuildType,
        Self::Compiler,
        Self::CompilerVersion,
        Self::CompilerLibcxx,
        Self::Arch,
        Self::StdVer,
        Self::FlagCollection,
    ];

    /// Settings key as published by the repository.
    pub fn key(self) -> &'static str {
        match self {
            Self::Os => "os",
            Self::BuildType => "build_type",
            Self::Compiler => "compiler",
            Self::CompilerVersion => "compiler.version",
            Self::CompilerLibcxx => "compiler.libcxx",
            Self::Arch => "arch",
            Self::StdVer => "stdver",
            Self::FlagCollection => "flagcollection",
        }
    }

    /// Attributes covered by the compiler settings triple.
    pub fn is_compiler(self) -> bool {
        matches!(
            self,
            Self::Compiler | Self::CompilerVersion | Self::CompilerLibcxx
        )
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Normalized description of a compiler/target build configuration.
///
/// Every attribute is always present; an empty string is a valid value and
/// only matches an empty setting.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildDescriptor {
    /// Operating system (`Linux`).
    pub os: String,
    /// Build type (`Debug`, `Release`).
    pub build_type: String,
    /// Compiler family (`gcc`, `clang`).
    pub compiler: String,
    /// Compiler version or compiler id.
    #[serde(rename = "compiler.version")]
    pub compiler_version: String,
    /// C++ standard library variant (`libstdc++`, `libc++`).
    #[serde(rename = "compiler.libcxx")]
    pub compiler_libcxx: String,
    /// Target architecture.
    pub arch: String,
    /// Language standard version.
    pub stdver: String,
    /// Extra flag collection.
    pub flagcollection: String,
}

impl BuildDescriptor {
    /// Value of one attribute.
    pub fn get(&self, attribute: Attribute) -> &str {
        match attribute {
            Attribute::Os => &self.os,
            Attribute::BuildType => &self.build_type,
            Attribute::Compiler => &self.compiler,
            Attribute::CompilerVersion => &self.compiler_version,
            Attribute::CompilerLibcxx => &self.compiler_libcxx,
            Attribute::Arch => &self.arch,
            Attribute::StdVer => &self.stdver,
            Attribute::FlagCollection => &self.flagcollection,
        }
    }

    /// All attributes with their values, in descriptor order.
    pub fn attributes(&self) -> impl Iterator<Item = (Attribute, &str)> + '_ {
        Attribute::ALL.into_iter().map(|a| (a, self.get(a)))
    }
}
