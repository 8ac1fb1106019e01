//! Single-asset download to disk
//!
//! A download never returns an error: every network, status, or filesystem
//! problem is folded into [`DownloadOutcome::Failed`] for the caller to count.
//! Bodies are written to a sibling `.part` file which is renamed over the
//! destination once fully written and synced.

use crate::harvest::{DownloadOutcome, DownloadResult, SkipReason};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use url::Url;

/// Fetches one remote resource and stores it at a given path
#[derive(Debug, Clone)]
pub struct AssetDownloader {
    client: Client,
}

impl AssetDownloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Downloads `source_url` to `destination_path`
    ///
    /// | Condition | Outcome |
    /// |-----------|---------|
    /// | empty URL | `Skipped(EmptyUrl)`, no request sent |
    /// | unparsable URL | `Failed` |
    /// | non-HTTP(S) scheme | `Failed`, no request sent |
    /// | network error or non-2xx | `Failed` |
    /// | write/rename error | `Failed`, temporary file removed |
    /// | otherwise | `Saved`, destination created or overwritten |
    pub async fn download(&self, source_url: &str, destination_path: &Path) -> DownloadResult {
        let outcome = self.fetch_to_disk(source_url, destination_path).await;
        DownloadResult {
            destination_path: destination_path.to_path_buf(),
            outcome,
        }
    }

    async fn fetch_to_disk(&self, source_url: &str, destination_path: &Path) -> DownloadOutcome {
        let source_url = source_url.trim();
        if source_url.is_empty() {
            return DownloadOutcome::Skipped(SkipReason::EmptyUrl);
        }

        let url = match Url::parse(source_url) {
            Ok(url) => url,
            Err(e) => return DownloadOutcome::Failed(format!("invalid URL: {}", e)),
        };
        if url.scheme() != "http" && url.scheme() != "https" {
            return DownloadOutcome::Failed(format!("unsupported scheme: {}", url.scheme()));
        }

        let body = match self.fetch(url).await {
            Ok(body) => body,
            Err(e) => return DownloadOutcome::Failed(e),
        };

        match write_atomically(destination_path, &body).await {
            Ok(()) => DownloadOutcome::Saved {
                bytes: body.len() as u64,
            },
            Err(e) => DownloadOutcome::Failed(format!(
                "failed to write {}: {}",
                destination_path.display(),
                e
            )),
        }
    }

    async fn fetch(&self, url: Url) -> Result<Vec<u8>, String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                "request timeout".to_string()
            } else if e.is_connect() {
                format!("connection failed: {}", e)
            } else {
                e.to_string()
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| e.to_string())?;
        Ok(body.to_vec())
    }
}

/// Path of the temporary file used while writing `destination`
fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

async fn write_atomically(destination: &Path, body: &[u8]) -> std::io::Result<()> {
    let partial = partial_path(destination);

    let result = async {
        let mut file = tokio::fs::File::create(&partial).await?;
        file.write_all(body).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&partial, destination).await
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(&partial).await;
    }
    result
}
