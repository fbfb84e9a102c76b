//! buildenv - provision pre-built libraries

use anyhow::Result;
use buildenv_core::CompilerTarget;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use buildenv_cli::cmd;
use buildenv_cli::cmd::provision::ProvisionArgs;
use buildenv_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Provision {
            manifest,
            dest,
            binary,
            only_on_static_link,
            extract_all_to_root,
            timeout,
            target,
        } => {
            let config = cmd::provision::config_from(
                cli.host,
                only_on_static_link,
                extract_all_to_root,
                timeout,
            );
            let args = ProvisionArgs {
                manifest: &manifest,
                dest: &dest,
                target: CompilerTarget::from(target),
                needs_binary: binary,
                quiet: cli.quiet,
            };
            cmd::provision::provision(config, args).await
        }
        Commands::Descriptor { target } => {
            cmd::descriptor::descriptor(&CompilerTarget::from(target))
        }
    }
}
