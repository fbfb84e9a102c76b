//! Artifact repository client.
//!
//! Speaks the conan v1 REST layout, where libraries are published with the
//! library name and version doubling as user and channel:
//!
//! ```text
//! GET {host}/v1/conans/{name}/{version}/{name}/{version}/search
//! GET {host}/v1/conans/{name}/{version}/{name}/{version}/packages/{hash}/download_urls
//! ```

use async_trait::async_trait;
use buildenv_schema::{CandidatePackage, PackageHash, PackageSettings};
use reqwest::Client;
use serde_json::{Map, Value};

use crate::error::RepositoryError;

/// Key of the package archive in a `download_urls` response.
pub const PACKAGE_ARCHIVE_KEY: &str = "conan_package.tgz";

/// A remote source of pre-built packages.
#[async_trait]
pub trait PackageSource: Send + Sync {
    /// Base URL of this source, for diagnostics.
    fn host(&self) -> &str;

    /// Candidate packages for one library/version, in repository order.
    async fn list_candidates(
        &self,
        name: &str,
        version: &str,
    ) -> Result<Vec<CandidatePackage>, RepositoryError>;

    /// Archive URL for one package hash.
    async fn resolve_download_url(
        &self,
        name: &str,
        version: &str,
        hash: &PackageHash,
    ) -> Result<String, RepositoryError>;
}

/// Client for a conan-compatible artifact repository.
#[derive(Debug, Clone)]
pub struct ConanRepository {
    client: Client,
    host: String,
}

impl ConanRepository {
    /// Create a client for the repository at `host`.
    pub fn new(client: Client, host: &str) -> Self {
        Self {
            client,
            host: host.trim_end_matches('/').to_string(),
        }
    }

    fn reference_url(&self, name: &str, version: &str) -> String {
        format!("{}/v1/conans/{name}/{version}/{name}/{version}", self.host)
    }

    async fn get_object(&self, url: &str) -> Result<Map<String, Value>, RepositoryError> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl PackageSource for ConanRepository {
    fn host(&self) -> &str {
        &self.host
    }

    /// Lists the packages built for `name`/`version`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] on HTTP 404, [`RepositoryError::Http`]
    /// for any other failed request, and [`RepositoryError::Decode`] if the body
    /// is not a JSON object.
    async fn list_candidates(
        &self,
        name: &str,
        version: &str,
    ) -> Result<Vec<CandidatePackage>, RepositoryError> {
        let url = format!("{}/search", self.reference_url(name, version));
        tracing::debug!("Listing packages: {url}");

        let resp = self.client.get(&url).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound {
                name: name.to_string(),
                version: version.to_string(),
            });
        }
        let body = resp.error_for_status()?.text().await?;
        let builds: Map<String, Value> = serde_json::from_str(&body)?;

        let candidates: Vec<CandidatePackage> = builds
            .into_iter()
            .map(|(hash, record)| {
                let settings = record.get("settings").map(settings_from).unwrap_or_default();
                CandidatePackage::new(hash, settings)
            })
            .collect();

        tracing::debug!("{} packages for {name}/{version}", candidates.len());
        Ok(candidates)
    }

    /// Resolves the archive URL of a package.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::MissingDownloadUrl`] if the response has no
    /// [`PACKAGE_ARCHIVE_KEY`] entry, or an HTTP/decode error if the request fails.
    async fn resolve_download_url(
        &self,
        name: &str,
        version: &str,
        hash: &PackageHash,
    ) -> Result<String, RepositoryError> {
        let url = format!(
            "{}/packages/{hash}/download_urls",
            self.reference_url(name, version)
        );
        let urls = self.get_object(&url).await?;

        urls.get(PACKAGE_ARCHIVE_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RepositoryError::MissingDownloadUrl {
                name: name.to_string(),
                version: version.to_string(),
                hash: hash.clone(),
            })
    }
}

/// Settings object of a search record. Scalar values are kept as strings;
/// nested values carry no matching information and are dropped.
fn settings_from(value: &Value) -> PackageSettings {
    value
        .as_object()
        .into_iter()
        .flatten()
        .filter_map(|(key, v)| match v {
            Value::String(s) => Some((key.clone(), s.clone())),
            Value::Number(n) => Some((key.clone(), n.to_string())),
            Value::Bool(b) => Some((key.clone(), b.to_string())),
            _ => None,
        })
        .collect()
}
