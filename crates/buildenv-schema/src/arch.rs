/// Target architecture in the repository's settings vocabulary.
///
/// Packages are published with conan-style architecture names (`x86`,
/// `x86_64`, `armv7`, `armv8`). Compiler flags and target triples use a
/// wider set of aliases, so everything is funneled through [`TargetArch::parse`]
/// before it lands in a build descriptor.
///
/// # Example
///
/// ```
/// use buildenv_schema::TargetArch;
///
/// assert_eq!(TargetArch::parse("amd64"), TargetArch::X86_64);
/// assert_eq!(TargetArch::from_triple("aarch64-linux-gnu").as_str(), "armv8");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetArch {
    /// 32-bit x86 (`-m32`, `i686`)
    X86,
    /// 64-bit x86
    X86_64,
    /// 32-bit ARM
    Armv7,
    /// 64-bit ARM (`aarch64`, `arm64`)
    Armv8,
    /// Any architecture without a normalized name; passed through verbatim.
    Other(String),
}

impl TargetArch {
    /// Normalize an architecture name or alias.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "x86" | "i386" | "i486" | "i586" | "i686" => Self::X86,
            "x86_64" | "amd64" | "x64" => Self::X86_64,
            "armv7" | "armv7a" | "armv7l" | "armv7hf" | "arm" => Self::Armv7,
            "armv8" | "aarch64" | "arm64" => Self::Armv8,
            _ => Self::Other(s.to_string()),
        }
    }

    /// Architecture of a target triple such as `x86_64-pc-linux-gnu`.
    pub fn from_triple(triple: &str) -> Self {
        Self::parse(triple.split('-').next().unwrap_or(triple))
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
            Self::Armv7 => "armv7",
            Self::Armv8 => "armv8",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for TargetArch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TargetArch {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
