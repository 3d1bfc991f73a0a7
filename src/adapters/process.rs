//! The external transcoder, run as a long-lived child process.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::{Child, Command as TokioCommand};

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("failed to start transcoder {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("failed to wait on transcoder: {0}")]
    Wait(#[source] std::io::Error),
}

pub struct TranscodeProcess {
    child: Child,
}

impl TranscodeProcess {
    /// Launch `program` in `work_dir` with the parent's stdout and stderr.
    pub fn spawn(program: &str, args: &[String], work_dir: &Path) -> Result<Self, TranscodeError> {
        let mut command = TokioCommand::new(program);
        command
            .args(args)
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        tracing::info!(program, ?args, "starting transcoder");

        let child = command.spawn().map_err(|source| TranscodeError::Spawn {
            program: program.to_string(),
            source,
        })?;
        Ok(Self { child })
    }

    /// Resolves once the transcoder exits, whatever the status.
    pub async fn wait(&mut self) -> Result<ExitStatus, TranscodeError> {
        self.child.wait().await.map_err(TranscodeError::Wait)
    }

    /// Forcibly stop the transcoder. A process that already exited is fine.
    pub async fn kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::warn!("failed to kill transcoder: {}", e);
        }
    }
}
