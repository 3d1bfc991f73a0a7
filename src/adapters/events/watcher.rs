use super::FileEvent;
use crate::error::PipelineError;
use crate::ports::watch::{WatchError, WatchPort};
use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use tokio::sync::mpsc::UnboundedSender;

/// Filesystem watcher feeding write events into a single FIFO channel.
pub struct FsWatcher {
    inner: RecommendedWatcher,
}

impl FsWatcher {
    pub fn new(
        events: UnboundedSender<FileEvent>,
        fatal: UnboundedSender<PipelineError>,
    ) -> Result<Self, WatchError> {
        let inner = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if !is_write(&event.kind) {
                        return;
                    }
                    for path in event.paths {
                        if events.send(FileEvent::new(path)).is_err() {
                            tracing::debug!("event listener gone, dropping write event");
                        }
                    }
                }
                Err(e) => {
                    let _ = fatal.send(PipelineError::Watch(WatchError::Backend(e)));
                }
            },
            Config::default(),
        )?;
        Ok(Self { inner })
    }
}

impl WatchPort for FsWatcher {
    fn watch(&mut self, dir: &Path) -> Result<(), WatchError> {
        self.inner
            .watch(dir, RecursiveMode::Recursive)
            .map_err(|source| WatchError::Register {
                path: dir.to_path_buf(),
                source,
            })
    }
}

/// Content writes only; creates, renames and metadata changes carry nothing
/// new to push.
pub fn is_write(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind, RenameMode};
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[test]
    fn test_only_content_writes_count() {
        assert!(is_write(&EventKind::Modify(ModifyKind::Data(DataChange::Any))));
        assert!(is_write(&EventKind::Modify(ModifyKind::Data(DataChange::Content))));
        assert!(is_write(&EventKind::Modify(ModifyKind::Any)));
        assert!(!is_write(&EventKind::Create(CreateKind::File)));
        assert!(!is_write(&EventKind::Modify(ModifyKind::Name(RenameMode::Both))));
        assert!(!is_write(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any))));
        assert!(!is_write(&EventKind::Any));
    }

    #[tokio::test]
    async fn test_write_in_watched_directory_is_delivered() {
        let dir = tempfile::tempdir().unwrap();
        let rendition_dir = dir.path().join("720p");
        std::fs::create_dir(&rendition_dir).unwrap();

        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (fatal_tx, _fatal_rx) = mpsc::unbounded_channel();
        let mut watcher = FsWatcher::new(event_tx, fatal_tx).unwrap();
        watcher.watch(&rendition_dir).unwrap();

        let segment = rendition_dir.join("chunk0.ts");
        std::fs::write(&segment, b"segment bytes").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), event_rx.recv())
            .await
            .expect("no write event within 5s")
            .unwrap();
        assert_eq!(event.path.file_name(), segment.file_name());
    }
}
