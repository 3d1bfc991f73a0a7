use super::bootstrap;
use super::pipeline::UploadPipeline;
use super::shutdown::{run_until_shutdown, ShutdownReason};
use crate::adapters::events::{listener, watcher::FsWatcher};
use crate::adapters::fs::FsAdapter;
use crate::adapters::http::{ClientRegistry, HttpPusher};
use crate::adapters::process::TranscodeProcess;
use crate::config::{Configuration, PushHost};
use crate::domain::layout::{redact, PushLayout};
use crate::domain::transcode::transcode_args;
use crate::error::PipelineError;
use futures::future::BoxFuture;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use url::Url;

/// Every resource a running session owns. Tasks get what they need from
/// here explicitly.
pub struct Pipeline {
    transcoder: TranscodeProcess,
    fatal: UnboundedReceiver<PipelineError>,
    listener: JoinHandle<()>,
    // Dropping the watcher stops the event stream
    _watcher: FsWatcher,
}

impl Pipeline {
    /// Bootstrap `work_dir`, start consuming write events and launch the
    /// transcoder. Everything is pushed below `origin`.
    pub async fn start(
        config: &Configuration,
        origin: Url,
        work_dir: PathBuf,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        let work_dir = tokio::fs::canonicalize(&work_dir)
            .await
            .map_err(PipelineError::WorkDir)?;

        tracing::info!(
            work_dir = %work_dir.display(),
            origin = %redact(origin.as_str()),
            "starting push session"
        );

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (fatal_tx, fatal_rx) = mpsc::unbounded_channel();

        // 1. Directories, watches, master manifest, clients
        let mut watcher = FsWatcher::new(event_tx, fatal_tx.clone())?;
        let storage = Arc::new(FsAdapter::new());
        let mut registry = ClientRegistry::new();
        let master_path = bootstrap::prepare(
            config,
            &work_dir,
            &mut watcher,
            storage.as_ref(),
            &mut registry,
        )
        .await?;

        let layout = PushLayout::new(&origin, config.renditions.iter().map(|r| r.name.clone()));
        let uploader = Arc::new(HttpPusher::new(registry));

        // 2. Master manifest goes out in the background
        let first = config.renditions[0].name.clone();
        bootstrap::publish_master(
            uploader.clone(),
            storage.clone(),
            &layout,
            first,
            master_path,
        );

        // 3. Event consumption
        let pipeline = Arc::new(
            UploadPipeline::new(layout, uploader, storage)
                .with_concurrency_limit(config.max_concurrent_uploads),
        );
        let listener = listener::start(event_rx, pipeline, fatal_tx);

        // 4. Transcoder
        let transcoder =
            TranscodeProcess::spawn(&config.ffmpeg, &transcode_args(config), &work_dir)?;

        Ok(Self {
            transcoder,
            fatal: fatal_rx,
            listener,
            _watcher: watcher,
        })
    }

    /// Block until the session ends and report why.
    pub async fn supervise(mut self, signal: BoxFuture<'static, String>) -> ShutdownReason {
        let reason = run_until_shutdown(&mut self.transcoder, signal, &mut self.fatal).await;
        self.listener.abort();
        reason
    }
}

/// Start a session in `work_dir` against the chosen host and supervise it
/// until it ends.
pub async fn run(
    config: Configuration,
    host: PushHost,
    work_dir: PathBuf,
    signal: BoxFuture<'static, String>,
) -> ShutdownReason {
    let origin = match config.push_base_url(host) {
        Ok(origin) => origin,
        Err(e) => return ShutdownReason::Fatal(e.into()),
    };
    match Pipeline::start(&config, origin, work_dir).await {
        Ok(pipeline) => pipeline.supervise(signal).await,
        Err(e) => ShutdownReason::Fatal(e),
    }
}
