//! Domain-specific errors for provisioning operations

use buildenv_schema::{LibraryId, PackageHash};
use thiserror::Error;

/// Failures talking to the artifact repository.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("{name}/{version} not found in repository")]
    NotFound { name: String, version: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed repository response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No download URL for package {hash} of {name}/{version}")]
    MissingDownloadUrl {
        name: String,
        version: String,
        hash: PackageHash,
    },
}

impl RepositoryError {
    /// The repository does not know this library/version.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A download or extraction failed part-way; files already written are kept.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to download {library}: {source}")]
    Http {
        library: LibraryId,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to extract {library}: {source}")]
    Io {
        library: LibraryId,
        #[source]
        source: std::io::Error,
    },

    #[error("Destination root for {library} does not exist: {path}")]
    MissingRoot {
        library: LibraryId,
        path: std::path::PathBuf,
    },
}

impl ExtractError {
    /// Library whose extraction failed.
    pub fn library(&self) -> &LibraryId {
        match self {
            Self::Http { library, .. }
            | Self::Io { library, .. }
            | Self::MissingRoot { library, .. } => library,
        }
    }
}

/// A provisioning run could not complete.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Failed to resolve download for {library}: {source}")]
    Repository {
        library: LibraryId,
        #[source]
        source: RepositoryError,
    },

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ProvisionError {
    /// Library that caused the failure, if any.
    pub fn library(&self) -> Option<&LibraryId> {
        match self {
            Self::Repository { library, .. } => Some(library),
            Self::Extract(e) => Some(e.library()),
            Self::Client(_) => None,
        }
    }
}
