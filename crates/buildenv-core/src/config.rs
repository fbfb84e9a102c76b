//! Provisioning configuration.

use std::time::Duration;

/// Default idle timeout: how long a request may go without receiving data.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Immutable configuration handed to a [`Provisioner`](crate::Provisioner).
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// Base URL of the artifact repository. `None` disables provisioning.
    pub host: Option<String>,
    /// Only provision when the compilation links a binary.
    pub only_on_static_link: bool,
    /// Extract every archive entry directly into the destination root,
    /// dropping directory structure and the per-library subdirectory.
    pub extract_all_to_root: bool,
    /// Longest wait for the next bytes of a response. Slow archive downloads
    /// that keep making progress are not cut off; stalled ones fail.
    pub request_timeout: Duration,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            host: None,
            only_on_static_link: false,
            extract_all_to_root: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ProvisionConfig {
    /// Configuration for a repository at `host` with default settings.
    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// - `BUILDENV_CONAN_HOST`: repository base URL (unset or empty disables provisioning)
    /// - `BUILDENV_ONLY_ON_STATIC_LINK`: `1`/`true` to provision only for binary links
    /// - `BUILDENV_EXTRACT_ALL_TO_ROOT`: `1`/`true` to flatten archives into the root
    /// - `BUILDENV_TIMEOUT_SECS`: idle read timeout in seconds
    pub fn from_env() -> Self {
        let flag = |name: &str| {
            std::env::var(name)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false)
        };

        Self {
            host: std::env::var("BUILDENV_CONAN_HOST")
                .ok()
                .filter(|h| !h.trim().is_empty()),
            only_on_static_link: flag("BUILDENV_ONLY_ON_STATIC_LINK"),
            extract_all_to_root: flag("BUILDENV_EXTRACT_ALL_TO_ROOT"),
            request_timeout: std::env::var("BUILDENV_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs),
        }
    }

    /// Build the HTTP client used for repository queries and archive fetches.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn build_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(self.request_timeout)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disabled() {
        let config = ProvisionConfig::default();
        assert!(config.host.is_none());
        assert!(!config.only_on_static_link);
        assert!(!config.extract_all_to_root);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_with_host() {
        let config = ProvisionConfig::with_host("https://conan.example.com");
        assert_eq!(config.host.as_deref(), Some("https://conan.example.com"));
    }

    #[test]
    fn test_build_client() {
        assert!(ProvisionConfig::default().build_client().is_ok());
    }
}
