use super::FileEvent;
use crate::application::pipeline::UploadPipeline;
use crate::error::PipelineError;
use crate::ports::{storage::StoragePort, upload::UploadPort};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Drain write events in delivery order and hand each one to its own task.
/// Under a concurrency limit the next event stays queued until a slot frees.
pub fn start<U, S>(
    mut events: UnboundedReceiver<FileEvent>,
    pipeline: Arc<UploadPipeline<U, S>>,
    fatal: UnboundedSender<PipelineError>,
) -> JoinHandle<()>
where
    U: UploadPort + 'static,
    S: StoragePort + 'static,
{
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let permit = pipeline.reserve().await;
            pipeline.dispatch(event, permit, fatal.clone());
        }
        tracing::debug!("event source closed");
    })
}
