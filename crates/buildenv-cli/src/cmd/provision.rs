use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use buildenv_core::{CompilerTarget, ProvisionConfig, Provisioner};

use crate::manifest::LibraryManifest;
use crate::ui::ConsoleReporter;

/// Options of one `buildenv provision` run.
#[derive(Debug, Clone)]
pub struct ProvisionArgs<'a> {
    pub manifest: &'a Path,
    pub dest: &'a Path,
    pub target: CompilerTarget,
    pub needs_binary: bool,
    pub quiet: bool,
}

/// Provision every library in the manifest into `dest`.
pub async fn provision(config: ProvisionConfig, args: ProvisionArgs<'_>) -> Result<()> {
    if !args.dest.is_dir() {
        bail!("Destination {} is not a directory", args.dest.display());
    }

    let manifest = LibraryManifest::load(args.manifest)?;
    let requests = manifest.requests();

    if config.host.is_none() {
        tracing::warn!("No repository host configured (--host or BUILDENV_CONAN_HOST)");
    }

    let reporter = Arc::new(ConsoleReporter::new(args.quiet));
    let provisioner = Provisioner::new(config, reporter)?;

    let results = provisioner
        .provision(&args.target, args.dest, &requests, args.needs_binary)
        .await
        .context("Provisioning failed")?;

    for result in &results {
        tracing::debug!(
            "{}: {} files from {} ({} skipped)",
            result.step,
            result.files_written,
            result.package_url,
            result.entries_skipped
        );
    }

    Ok(())
}

/// Environment configuration with command-line overrides applied.
pub fn config_from(
    host: Option<String>,
    only_on_static_link: bool,
    extract_all_to_root: bool,
    timeout: Option<u64>,
) -> ProvisionConfig {
    let mut config = ProvisionConfig::from_env();
    if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
        config.host = Some(host);
    }
    config.only_on_static_link |= only_on_static_link;
    config.extract_all_to_root |= extract_all_to_root;
    if let Some(secs) = timeout {
        config.request_timeout = Duration::from_secs(secs);
    }
    config
}
