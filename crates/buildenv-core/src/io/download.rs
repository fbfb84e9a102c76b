//! Streaming download-and-extract pipeline.
//!
//! The archive is never written to disk as a whole: response bytes flow
//! through a gzip decoder straight into the tar reader, one entry at a time.

use std::path::Path;
use std::time::{Duration, Instant};

use buildenv_schema::LibraryId;
use futures::TryStreamExt;
use reqwest::Client;
use tokio_util::io::StreamReader;

use crate::error::ExtractError;
use crate::io::extract::{ExtractSummary, extract_tar_gz};

/// Request for a fetch-and-extract operation
#[derive(Debug)]
pub struct FetchRequest<'a> {
    pub client: &'a Client,
    pub url: &'a str,
    pub destination_root: &'a Path,
    pub library: &'a LibraryId,
    pub flatten: bool,
}

impl<'a> FetchRequest<'a> {
    pub fn new(
        client: &'a Client,
        url: &'a str,
        destination_root: &'a Path,
        library: &'a LibraryId,
    ) -> Self {
        Self {
            client,
            url,
            destination_root,
            library,
            flatten: false,
        }
    }

    /// Extract every file directly into the destination root.
    pub fn with_flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    /// Execute the download and extraction
    pub async fn execute(self) -> Result<FetchOutcome, ExtractError> {
        fetch_and_extract(self).await
    }
}

/// Result of a completed fetch-and-extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Wall-clock time from request start to end of archive.
    pub elapsed: Duration,
    /// What the extraction wrote.
    pub summary: ExtractSummary,
}

/// Download a gzip tar archive and extract it while it streams in.
///
/// # Errors
///
/// Returns [`ExtractError::Http`] if the request fails or the server answers
/// with a non-success status, and any error from
/// [`extract_tar_gz`](crate::io::extract::extract_tar_gz).
pub async fn fetch_and_extract(req: FetchRequest<'_>) -> Result<FetchOutcome, ExtractError> {
    let library = req.library;
    let http_err = |source| ExtractError::Http {
        library: library.clone(),
        source,
    };

    let start = Instant::now();
    tracing::debug!("Fetching {library} from {}", req.url);

    let response = req
        .client
        .get(req.url)
        .send()
        .await
        .map_err(http_err)?
        .error_for_status()
        .map_err(http_err)?;

    let stream = response.bytes_stream().map_err(std::io::Error::other);
    let reader = StreamReader::new(stream);

    let summary = extract_tar_gz(reader, req.destination_root, library, req.flatten).await?;

    Ok(FetchOutcome {
        elapsed: start.elapsed(),
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProvisionConfig;
    use mockito::Server;
    use std::io::Write;
    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn fixture() -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, data) in [("include/foo.h", "int foo();\n"), ("lib/libfoo.a", "!<arch>\n")] {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, path, data.as_bytes()).unwrap();
        }
        let tar = builder.into_inner().unwrap();
        let mut gz = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::fast());
        gz.write_all(&tar).unwrap();
        gz.finish().unwrap()
    }

    #[tokio::test]
    async fn test_fetch_and_extract() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/files/conan_package.tgz")
            .with_status(200)
            .with_body(fixture())
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let client = Client::new();
        let url = format!("{}/files/conan_package.tgz", server.url());
        let library = LibraryId::new("mylib");

        let outcome = FetchRequest::new(&client, &url, dir.path(), &library)
            .execute()
            .await
            .unwrap();

        assert_eq!(outcome.summary.files_written, 2);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("mylib/include/foo.h")).unwrap(),
            "int foo();\n"
        );
        assert!(dir.path().join("mylib/lib/libfoo.a").exists());
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/files/conan_package.tgz")
            .with_status(403)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let client = Client::new();
        let url = format!("{}/files/conan_package.tgz", server.url());
        let library = LibraryId::new("mylib");

        let err = FetchRequest::new(&client, &url, dir.path(), &library)
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Http { .. }));
        assert!(!dir.path().join("mylib").exists());
    }

    #[tokio::test]
    async fn test_fetch_truncated_archive() {
        let mut server = Server::new_async().await;
        let mut body = fixture();
        body.truncate(body.len() / 2);
        let _m = server
            .mock("GET", "/files/conan_package.tgz")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let client = Client::new();
        let url = format!("{}/files/conan_package.tgz", server.url());
        let library = LibraryId::new("mylib");

        let err = FetchRequest::new(&client, &url, dir.path(), &library)
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }

    /// Serve `body` once, sending it in `chunks` pieces `interval` apart.
    /// With `stall_after`, stop sending after that many pieces and hold the
    /// connection open.
    async fn trickle_server(
        body: Vec<u8>,
        chunks: usize,
        interval: Duration,
        stall_after: Option<usize>,
    ) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    return;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();

            for (i, chunk) in body.chunks(body.len().div_ceil(chunks)).enumerate() {
                if stall_after == Some(i) {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    return;
                }
                tokio::time::sleep(interval).await;
                socket.write_all(chunk).await.unwrap();
                socket.flush().await.unwrap();
            }
        });

        format!("http://{addr}/conan_package.tgz")
    }

    fn short_timeout_client() -> Client {
        let config = ProvisionConfig {
            request_timeout: Duration::from_secs(1),
            ..ProvisionConfig::default()
        };
        config.build_client().unwrap()
    }

    #[tokio::test]
    async fn test_slow_download_outlasting_timeout_succeeds() {
        // 12 pieces 200ms apart: 2.4s in total, never 1s without data
        let url = trickle_server(fixture(), 12, Duration::from_millis(200), None).await;

        let dir = tempdir().unwrap();
        let client = short_timeout_client();
        let library = LibraryId::new("slowlib");

        let outcome = FetchRequest::new(&client, &url, dir.path(), &library)
            .execute()
            .await
            .unwrap();

        assert!(outcome.elapsed > Duration::from_secs(1));
        assert_eq!(outcome.summary.files_written, 2);
        assert!(dir.path().join("slowlib/include/foo.h").exists());
    }

    #[tokio::test]
    async fn test_stalled_download_times_out() {
        let url = trickle_server(fixture(), 4, Duration::from_millis(50), Some(2)).await;

        let dir = tempdir().unwrap();
        let client = short_timeout_client();
        let library = LibraryId::new("stuck");

        let err = FetchRequest::new(&client, &url, dir.path(), &library)
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }), "{err}");
    }
}
