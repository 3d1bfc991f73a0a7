use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("PUT {destination} for {file} failed: {source}")]
    Transport {
        file: PathBuf,
        destination: String,
        source: reqwest::Error,
    },
    #[error("PUT {destination} for {file} returned {status}")]
    Status {
        status: u16,
        file: PathBuf,
        destination: String,
    },
    #[error("no HTTP client registered for rendition {0}")]
    UnknownRendition(String),
}

/// Pushes a local file to the origin.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UploadPort: Send + Sync {
    /// PUT `local_path` to `remote_url` with the client owned by `rendition`.
    /// Returns the HTTP status of a successful upload.
    async fn put_file(
        &self,
        rendition: &str,
        local_path: &Path,
        remote_url: &str,
    ) -> Result<u16, UploadError>;
}
