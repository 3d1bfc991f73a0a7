use async_trait::async_trait;
use std::io;
use std::path::Path;

/// Local filesystem operations the pipeline performs on transcoder output.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoragePort: Send + Sync {
    /// Create a directory. An existing directory is not an error.
    async fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// Remove a file that has been pushed.
    async fn remove_file(&self, path: &Path) -> io::Result<()>;
}
