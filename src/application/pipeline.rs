use crate::adapters::events::FileEvent;
use crate::domain::layout::{PushLayout, WriteKind, WritePlan};
use crate::error::PipelineError;
use crate::ports::storage::StoragePort;
use crate::ports::upload::UploadPort;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;

/// What handling a single write event amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// Temporary file, nothing pushed.
    Transient,
    /// Not inside a known rendition directory, nothing pushed.
    Ignored,
    /// File and manifest pushed; `removed` tells whether the local file went.
    Pushed { rendition: String, removed: bool },
}

/// Turns write events into origin uploads: the written file first, then the
/// rendition manifest, then local cleanup.
pub struct UploadPipeline<U, S> {
    layout: PushLayout,
    uploader: Arc<U>,
    storage: Arc<S>,
    limiter: Option<Arc<Semaphore>>,
}

impl<U, S> UploadPipeline<U, S>
where
    U: UploadPort + 'static,
    S: StoragePort + 'static,
{
    pub fn new(layout: PushLayout, uploader: Arc<U>, storage: Arc<S>) -> Self {
        Self {
            layout,
            uploader,
            storage,
            limiter: None,
        }
    }

    /// Cap the number of events being pushed at once.
    pub fn with_concurrency_limit(mut self, limit: Option<usize>) -> Self {
        self.limiter = limit.map(|n| Arc::new(Semaphore::new(n.max(1))));
        self
    }

    /// Handle one write event to completion.
    pub async fn handle(&self, event: &FileEvent) -> Result<EventOutcome, PipelineError> {
        let (plan, is_manifest) = match self.layout.classify(&event.path) {
            WriteKind::Transient => {
                tracing::trace!(path = %event.path.display(), "skipping temporary file");
                return Ok(EventOutcome::Transient);
            }
            WriteKind::Ignored => {
                tracing::debug!(path = %event.path.display(), "ignoring write outside renditions");
                return Ok(EventOutcome::Ignored);
            }
            WriteKind::Segment(plan) => (plan, false),
            WriteKind::Manifest(plan) => (plan, true),
        };

        self.push(&plan).await?;

        // The transcoder keeps rewriting the manifest in place
        let removed = if is_manifest {
            false
        } else {
            match self.storage.remove_file(&plan.local_path).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(
                        path = %plan.local_path.display(),
                        "failed to remove pushed file: {}",
                        e
                    );
                    false
                }
            }
        };

        Ok(EventOutcome::Pushed {
            rendition: plan.rendition,
            removed,
        })
    }

    async fn push(&self, plan: &WritePlan) -> Result<(), PipelineError> {
        self.uploader
            .put_file(&plan.rendition, &plan.local_path, &plan.remote_url)
            .await?;
        self.uploader
            .put_file(&plan.rendition, &plan.manifest_path, &plan.manifest_url)
            .await?;
        Ok(())
    }

    /// Wait for room under the concurrency limit. Always immediate when no
    /// limit is set.
    pub async fn reserve(&self) -> Option<OwnedSemaphorePermit> {
        match &self.limiter {
            Some(limiter) => Arc::clone(limiter).acquire_owned().await.ok(),
            None => None,
        }
    }

    /// Handle `event` on its own task, holding `permit` until it finishes.
    /// Failures go to `fatal`.
    pub fn dispatch(
        self: &Arc<Self>,
        event: FileEvent,
        permit: Option<OwnedSemaphorePermit>,
        fatal: UnboundedSender<PipelineError>,
    ) -> JoinHandle<()> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            let _permit = permit;
            if let Err(e) = pipeline.handle(&event).await {
                tracing::error!(path = %event.path.display(), "{}", e);
                let _ = fatal.send(e);
            }
        })
    }
}
