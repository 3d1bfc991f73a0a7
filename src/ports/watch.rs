use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to watch {path}: {source}")]
    Register {
        path: PathBuf,
        source: notify::Error,
    },
    #[error("filesystem watcher failed: {0}")]
    Backend(#[from] notify::Error),
}

/// Registers directories for write notifications.
pub trait WatchPort {
    /// Watch `dir` and everything below it.
    fn watch(&mut self, dir: &Path) -> Result<(), WatchError>;
}
