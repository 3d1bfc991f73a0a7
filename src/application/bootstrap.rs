use crate::adapters::http::ClientRegistry;
use crate::config::Configuration;
use crate::domain::hls::{MasterPlaylist, MASTER_MANIFEST};
use crate::domain::layout::{redact, PushLayout};
use crate::error::PipelineError;
use crate::ports::storage::StoragePort;
use crate::ports::upload::UploadPort;
use crate::ports::watch::WatchPort;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// For each rendition in order: create its directory, watch it, list it in
/// the master manifest and give it an HTTP client. Then write the master
/// manifest to `work_dir` and return its path.
///
/// A rendition whose directory cannot be created is still listed and
/// provisioned, but left unwatched.
pub async fn prepare<W, S>(
    config: &Configuration,
    work_dir: &Path,
    watcher: &mut W,
    storage: &S,
    registry: &mut ClientRegistry,
) -> Result<PathBuf, PipelineError>
where
    W: WatchPort,
    S: StoragePort + ?Sized,
{
    let mut master = MasterPlaylist::new();

    for rendition in &config.renditions {
        let dir = work_dir.join(&rendition.name);
        match storage.create_dir(&dir).await {
            Ok(()) => watcher.watch(&dir)?,
            Err(e) => tracing::warn!(
                dir = %dir.display(),
                "failed to create rendition directory, not watching it: {}",
                e
            ),
        }

        master.add_rendition(rendition);
        registry.provision(&rendition.name)?;

        tracing::info!(
            rendition = %rendition.name,
            resolution = %format!("{}x{}", rendition.width, rendition.height),
            bandwidth = rendition.bandwidth(),
            "rendition ready"
        );
    }

    let master_path = work_dir.join(MASTER_MANIFEST);
    master
        .write_to(&master_path)
        .await
        .map_err(|source| PipelineError::MasterManifest {
            path: master_path.clone(),
            source,
        })?;

    Ok(master_path)
}

/// Upload the master manifest in the background, then delete the local copy.
/// A failed upload is reported but does not stop the session.
pub fn publish_master<U, S>(
    uploader: Arc<U>,
    storage: Arc<S>,
    layout: &PushLayout,
    rendition: String,
    master_path: PathBuf,
) -> JoinHandle<()>
where
    U: UploadPort + ?Sized + 'static,
    S: StoragePort + ?Sized + 'static,
{
    let destination = layout.master_url();
    tokio::spawn(async move {
        match uploader.put_file(&rendition, &master_path, &destination).await {
            Ok(_) => tracing::info!(destination = %redact(&destination), "master manifest published"),
            Err(e) => tracing::error!("failed to publish master manifest: {}", e),
        }
        if let Err(e) = storage.remove_file(&master_path).await {
            tracing::warn!(path = %master_path.display(), "failed to remove master manifest: {}", e);
        }
    })
}
