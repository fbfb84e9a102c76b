//! Library provisioning.
//!
//! This module provides the top-level provisioning flow:
//!
//! - Resolving the build descriptor for the compilation
//! - Listing candidate packages for every requested library (concurrently)
//! - Selecting the package that matches the descriptor
//! - Downloading and extracting matched packages (concurrently)
//!
//! Unavailability is tolerated: a library the repository does not list, or
//! lists without a matching build, is skipped with a warning. Once a package
//! has matched, failing to resolve or extract it fails the whole run.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use buildenv_schema::{LibraryId, LibraryRequest, PackageHash};
use futures::future::join_all;
use reqwest::Client;

use crate::config::ProvisionConfig;
use crate::descriptor::{self, CompilerTarget};
use crate::error::ProvisionError;
use crate::io::download::FetchRequest;
use crate::matcher;
use crate::reporter::Reporter;
use crate::repository::{ConanRepository, PackageSource};

/// One successfully provisioned library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    /// Library the package was provisioned for.
    pub library: LibraryId,
    /// Human-readable step label, e.g. `Download fmt 10.1.1`.
    pub step: String,
    /// URL the archive was fetched from.
    pub package_url: String,
    /// Time spent downloading and extracting.
    pub elapsed: Duration,
    /// Files written by the extraction.
    pub files_written: usize,
    /// Archive entries that were rejected.
    pub entries_skipped: usize,
}

/// Provisions libraries from an artifact repository into a build tree.
#[derive(Clone)]
pub struct Provisioner {
    config: ProvisionConfig,
    client: Client,
    source: Option<Arc<dyn PackageSource>>,
    reporter: Arc<dyn Reporter>,
}

impl fmt::Debug for Provisioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provisioner")
            .field("config", &self.config)
            .field("source", &self.source.as_ref().map(|s| s.host().to_string()))
            .finish_non_exhaustive()
    }
}

impl Provisioner {
    /// Create a provisioner talking to the repository named by `config.host`.
    ///
    /// Without a host the provisioner is valid but every run is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Client`] if the HTTP client cannot be built.
    pub fn new(config: ProvisionConfig, reporter: Arc<dyn Reporter>) -> Result<Self, ProvisionError> {
        let client = config.build_client().map_err(ProvisionError::Client)?;
        let source = config.host.as_deref().map(|host| {
            Arc::new(ConanRepository::new(client.clone(), host)) as Arc<dyn PackageSource>
        });

        Ok(Self {
            config,
            client,
            source,
            reporter,
        })
    }

    /// Create a provisioner over an explicit package source.
    pub fn with_source(
        config: ProvisionConfig,
        client: Client,
        source: Arc<dyn PackageSource>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            config,
            client,
            source: Some(source),
            reporter,
        }
    }

    /// The configuration this provisioner was built with.
    pub fn config(&self) -> &ProvisionConfig {
        &self.config
    }

    /// Provision `requests` for the compilation described by `target` into
    /// `destination_root`.
    ///
    /// `needs_binary` tells whether the compilation links a binary; with
    /// `only_on_static_link` configured, nothing is provisioned otherwise.
    /// Results arrive in no particular order.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failed library (in request order) if any
    /// matched package could not be resolved or extracted. Every other
    /// download is allowed to finish first; no partial results are returned.
    pub async fn provision(
        &self,
        target: &CompilerTarget,
        destination_root: &Path,
        requests: &[LibraryRequest],
        needs_binary: bool,
    ) -> Result<Vec<DownloadResult>, ProvisionError> {
        let Some(source) = self.source.as_deref() else {
            tracing::debug!("No package repository configured, skipping provisioning");
            return Ok(Vec::new());
        };
        if self.config.only_on_static_link && !needs_binary {
            tracing::debug!("Provisioning only runs for binary links, skipping");
            return Ok(Vec::new());
        }

        let wanted: Vec<&LibraryRequest> =
            requests.iter().filter(|r| r.needs_provisioning()).collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let start_time = Instant::now();
        let descriptor = descriptor::resolve(target);
        tracing::debug!(?descriptor, "Resolved build descriptor");

        // Phase 1: list candidates for every library at once
        self.reporter.section("Listing");
        let listings = join_all(wanted.iter().map(|req| async move {
            let listing = source
                .list_candidates(req.lookup_id(), req.lookup_version())
                .await;
            (*req, listing)
        }))
        .await;

        // Phase 2: match; unavailable libraries drop out here
        let mut matched: Vec<(&LibraryRequest, PackageHash)> = Vec::new();
        for (req, listing) in listings {
            let candidates = match listing {
                Ok(candidates) => candidates,
                Err(e) => {
                    tracing::warn!(
                        "Library {} {} is not available: {e}",
                        req.lookup_id(),
                        req.lookup_version()
                    );
                    self.reporter
                        .unavailable(&req.id, &req.version, &e.to_string());
                    continue;
                }
            };

            match matcher::select(&descriptor, &candidates) {
                Some(hash) => {
                    tracing::debug!("{} matched package {hash}", req.id);
                    matched.push((req, hash));
                }
                None => {
                    tracing::warn!(
                        "No build of {} {} matches {} {} on {}",
                        req.lookup_id(),
                        req.lookup_version(),
                        descriptor.compiler,
                        descriptor.compiler_version,
                        descriptor.arch
                    );
                    self.reporter.no_match(&req.id, &req.version);
                }
            }
        }

        // Phase 3: download and extract every match at once
        self.reporter.section("Downloading");
        let outcomes = join_all(
            matched
                .iter()
                .map(|(req, hash)| self.download(source, req, hash, destination_root)),
        )
        .await;

        let mut results = Vec::with_capacity(outcomes.len());
        let mut first_error = None;
        for outcome in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!("{e}");
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        self.reporter
            .summary(results.len(), start_time.elapsed().as_secs_f64());
        Ok(results)
    }

    async fn download(
        &self,
        source: &dyn PackageSource,
        req: &LibraryRequest,
        hash: &PackageHash,
        destination_root: &Path,
    ) -> Result<DownloadResult, ProvisionError> {
        let name = req.lookup_id();
        let version = req.lookup_version();

        let url = match source.resolve_download_url(name, version, hash).await {
            Ok(url) => url,
            Err(e) => {
                self.reporter.failed(&req.id, &req.version, &e.to_string());
                return Err(ProvisionError::Repository {
                    library: req.id.clone(),
                    source: e,
                });
            }
        };

        self.reporter.downloading(&req.id, &req.version, &url);
        let outcome = FetchRequest::new(&self.client, &url, destination_root, &req.id)
            .with_flatten(self.config.extract_all_to_root)
            .execute()
            .await
            .inspect_err(|e| self.reporter.failed(&req.id, &req.version, &e.to_string()))?;

        tracing::info!(
            "Provisioned {} ({} files) in {:.2}s",
            req.id,
            outcome.summary.files_written,
            outcome.elapsed.as_secs_f64()
        );
        self.reporter.done(&req.id, &req.version, outcome.elapsed);

        Ok(DownloadResult {
            library: req.id.clone(),
            step: format!("Download {name} {version}"),
            package_url: url,
            elapsed: outcome.elapsed,
            files_written: outcome.summary.files_written,
            entries_skipped: outcome.summary.entries_skipped,
        })
    }
}
