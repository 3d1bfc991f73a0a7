use crate::adapters::process::{TranscodeError, TranscodeProcess};
use crate::error::PipelineError;
use futures::future::BoxFuture;
use std::process::ExitStatus;
use tokio::sync::mpsc::UnboundedReceiver;

/// Why the session ended.
#[derive(Debug)]
pub enum ShutdownReason {
    /// The operator asked us to stop.
    Signal(String),
    /// A watcher or upload failure.
    Fatal(PipelineError),
    /// The transcoder exited on its own.
    TranscoderExited(ExitStatus),
    /// Waiting on the transcoder failed.
    TranscoderLost(TranscodeError),
}

impl ShutdownReason {
    pub fn exit_code(&self) -> i32 {
        match self {
            ShutdownReason::Signal(_) => 0,
            _ => 1,
        }
    }
}

/// Wait for the first of: a termination signal, a fatal pipeline error, or
/// the transcoder exiting. The transcoder is killed on the way out; in-flight
/// uploads are abandoned.
pub async fn run_until_shutdown(
    transcoder: &mut TranscodeProcess,
    signal: BoxFuture<'static, String>,
    fatal: &mut UnboundedReceiver<PipelineError>,
) -> ShutdownReason {
    let reason = tokio::select! {
        name = signal => ShutdownReason::Signal(name),
        Some(err) = fatal.recv() => ShutdownReason::Fatal(err),
        status = transcoder.wait() => match status {
            Ok(status) => ShutdownReason::TranscoderExited(status),
            Err(e) => ShutdownReason::TranscoderLost(e),
        },
    };

    match &reason {
        ShutdownReason::Signal(name) => {
            tracing::info!("received {}, shutting down", name);
            transcoder.kill().await;
        }
        ShutdownReason::Fatal(err) => {
            tracing::error!("pipeline failure, shutting down: {}", err);
            transcoder.kill().await;
        }
        ShutdownReason::TranscoderExited(status) => {
            tracing::error!("transcoder exited with {}", status);
        }
        ShutdownReason::TranscoderLost(err) => {
            tracing::error!("{}", err);
            transcoder.kill().await;
        }
    }

    reason
}

/// Resolves with the name of the first SIGINT, SIGTERM, SIGHUP or SIGQUIT.
///
/// Handlers are installed before this returns, so a signal that arrives
/// while the session is still starting is held until the future is polled.
#[cfg(unix)]
pub fn termination_signal() -> BoxFuture<'static, String> {
    use tokio::signal::unix::{signal, SignalKind};

    let kinds = [
        (SignalKind::interrupt(), "SIGINT"),
        (SignalKind::terminate(), "SIGTERM"),
        (SignalKind::hangup(), "SIGHUP"),
        (SignalKind::quit(), "SIGQUIT"),
    ];

    let mut streams = Vec::new();
    for (kind, name) in kinds {
        match signal(kind) {
            Ok(stream) => streams.push((stream, name)),
            Err(e) => tracing::warn!("cannot listen for {}: {}", name, e),
        }
    }

    Box::pin(async move {
        if streams.is_empty() {
            return futures::future::pending().await;
        }

        let waits = streams.iter_mut().map(|(stream, name)| {
            Box::pin(async move {
                stream.recv().await;
                name.to_string()
            })
        });
        let (name, _, _) = futures::future::select_all(waits).await;
        name
    })
}

#[cfg(not(unix))]
pub fn termination_signal() -> BoxFuture<'static, String> {
    Box::pin(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("cannot listen for ctrl-c: {}", e);
            return futures::future::pending().await;
        }
        "ctrl-c".to_string()
    })
}
