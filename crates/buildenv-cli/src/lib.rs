//! buildenv - provision pre-built libraries for a compiler target
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Reads a library manifest, works out the build descriptor of a compiler
//! invocation and fetches every matching package from a conan-compatible
//! artifact repository into a destination directory.

pub mod cmd;
pub mod manifest;
pub mod ui;

use std::path::PathBuf;

use buildenv_core::CompilerTarget;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "buildenv")]
#[command(author, version, about = "buildenv - provision pre-built libraries")]
pub struct Cli {
    /// Base URL of the artifact repository
    #[arg(long, global = true, env = "BUILDENV_CONAN_HOST")]
    pub host: Option<String>,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download and extract the packages a compilation needs
    Provision {
        /// Library manifest (TOML)
        #[arg(long, short)]
        manifest: PathBuf,
        /// Existing directory to extract into
        #[arg(long, short)]
        dest: PathBuf,
        /// The compilation links a binary
        #[arg(long)]
        binary: bool,
        /// Only provision when the compilation links a binary
        #[arg(long)]
        only_on_static_link: bool,
        /// Extract every file directly into the destination directory
        #[arg(long)]
        extract_all_to_root: bool,
        /// Seconds a request may go without receiving data
        #[arg(long)]
        timeout: Option<u64>,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Print the build descriptor packages are matched against
    Descriptor {
        #[command(flatten)]
        target: TargetArgs,
    },
}

/// Compiler invocation to provision for.
#[derive(Debug, Clone, Default, Args)]
pub struct TargetArgs {
    /// Compiler family (gcc, clang, ...)
    #[arg(long, default_value = "")]
    pub compiler_type: String,
    /// Compiler id, used as the compiler version (e.g. g112)
    #[arg(long, default_value = "")]
    pub compiler_id: String,
    /// Compiler option; repeat for several (e.g. --option=-m32)
    #[arg(long = "option", allow_hyphen_values = true)]
    pub options: Vec<String>,
    /// Architecture the compiler targets by default
    #[arg(long)]
    pub arch: Option<String>,
    /// Standard library the compiler uses by default
    #[arg(long)]
    pub libcxx: Option<String>,
    /// Language standard version
    #[arg(long)]
    pub stdver: Option<String>,
    /// Extra flag collection
    #[arg(long)]
    pub flag_collection: Option<String>,
    /// Operating system (default: Linux)
    #[arg(long)]
    pub os: Option<String>,
    /// Build type (default: Debug)
    #[arg(long)]
    pub build_type: Option<String>,
}

impl From<TargetArgs> for CompilerTarget {
    fn from(args: TargetArgs) -> Self {
        Self {
            compiler_type: args.compiler_type,
            compiler_id: args.compiler_id,
            options: args.options,
            default_arch: args.arch,
            default_libcxx: args.libcxx,
            stdver: args.stdver,
            flag_collection: args.flag_collection,
            os: args.os,
            build_type: args.build_type,
        }
    }
}
