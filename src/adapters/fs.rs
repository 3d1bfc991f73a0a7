use crate::ports::storage::StoragePort;
use async_trait::async_trait;
use std::io;
use std::path::Path;

#[derive(Clone, Copy, Default)]
pub struct FsAdapter;

impl FsAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StoragePort for FsAdapter {
    async fn create_dir(&self, path: &Path) -> io::Result<()> {
        match tokio::fs::create_dir(path).await {
            Ok(()) => Ok(()),
            // Re-runs find the rendition directories from a previous session
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}
