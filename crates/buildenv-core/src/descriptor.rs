//! Build descriptor resolution.
//!
//! Turns a compiler/target identity into the [`BuildDescriptor`] packages are
//! matched against. Resolution never fails: anything that cannot be
//! determined becomes an empty string.

use buildenv_schema::{BuildDescriptor, TargetArch};

/// Operating system recorded when the target does not name one.
pub const DEFAULT_OS: &str = "Linux";

/// Build type recorded when the target does not name one.
pub const DEFAULT_BUILD_TYPE: &str = "Debug";

/// Compiler/target identity of one compilation, plus the values the
/// compiler property store knows about it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerTarget {
    /// Compiler family (`gcc`, `clang`, ...).
    pub compiler_type: String,
    /// Compiler id, used as the compiler version (`g112`, `clang1600`).
    pub compiler_id: String,
    /// Options passed to the compiler for this compilation.
    pub options: Vec<String>,
    /// Architecture the compiler targets without flags.
    pub default_arch: Option<String>,
    /// Standard library the compiler uses without `-stdlib=`.
    pub default_libcxx: Option<String>,
    /// Language standard version.
    pub stdver: Option<String>,
    /// Extra flag collection.
    pub flag_collection: Option<String>,
    /// Operating system; defaults to [`DEFAULT_OS`].
    pub os: Option<String>,
    /// Build type; defaults to [`DEFAULT_BUILD_TYPE`].
    pub build_type: Option<String>,
}

impl CompilerTarget {
    /// Identity for a compiler family and id with no options.
    pub fn new(compiler_type: impl Into<String>, compiler_id: impl Into<String>) -> Self {
        Self {
            compiler_type: compiler_type.into(),
            compiler_id: compiler_id.into(),
            ..Self::default()
        }
    }

    /// Replace the compiler options.
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// Resolve the build descriptor for a compilation.
pub fn resolve(target: &CompilerTarget) -> BuildDescriptor {
    BuildDescriptor {
        os: target.os.clone().unwrap_or_else(|| DEFAULT_OS.to_string()),
        build_type: target
            .build_type
            .clone()
            .unwrap_or_else(|| DEFAULT_BUILD_TYPE.to_string()),
        compiler: target.compiler_type.clone(),
        compiler_version: target.compiler_id.clone(),
        compiler_libcxx: libcxx(target),
        arch: arch(target),
        stdver: target.stdver.clone().unwrap_or_default(),
        flagcollection: target.flag_collection.clone().unwrap_or_default(),
    }
}

fn libcxx(target: &CompilerTarget) -> String {
    target
        .options
        .iter()
        .rev()
        .find_map(|o| o.strip_prefix("-stdlib="))
        .map(str::to_string)
        .or_else(|| target.default_libcxx.clone())
        .unwrap_or_default()
}

fn arch(target: &CompilerTarget) -> String {
    let mut selected = None;
    let mut options = target.options.iter();

    // Last flag wins, as it does on the compiler command line.
    while let Some(option) = options.next() {
        match option.as_str() {
            "-m32" => selected = Some(TargetArch::X86),
            "-m64" => selected = Some(TargetArch::X86_64),
            "-target" | "--target" => {
                if let Some(triple) = options.next() {
                    selected = Some(TargetArch::from_triple(triple));
                }
            }
            other => {
                if let Some(triple) = other.strip_prefix("--target=") {
                    selected = Some(TargetArch::from_triple(triple));
                }
            }
        }
    }

    selected
        .or_else(|| target.default_arch.as_deref().map(TargetArch::parse))
        .map(|a| a.as_str().to_string())
        .unwrap_or_default()
}
