//! Top-level error for anything that ends the pipeline.

use crate::adapters::process::TranscodeError;
use crate::config::ConfigError;
use crate::ports::upload::UploadError;
use crate::ports::watch::WatchError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("upload failed: {0}")]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Watch(#[from] WatchError),
    #[error(transparent)]
    Transcode(#[from] TranscodeError),
    #[error("failed to resolve the working directory: {0}")]
    WorkDir(#[source] std::io::Error),
    #[error("failed to write master manifest {path}: {source}")]
    MasterManifest {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to build HTTP client for rendition {rendition}: {source}")]
    Client {
        rendition: String,
        source: reqwest::Error,
    },
}
