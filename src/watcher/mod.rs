//! File watching for externally edited documents.
//!
//! Uses notify crate for cross-platform file system events. The watcher only
//! reports that the file changed; coalescing bursts of changes is left to
//! the session's debounce timer.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Result of waiting on the watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    /// The watched file changed at least once
    Changed,
    /// Nothing relevant happened before the timeout
    Timeout,
    /// The notify backend went away
    Closed,
}

/// Watches a single file and reports relevant change events.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    watch_root: PathBuf,
    target_path: PathBuf,
    target_name: Option<OsString>,
}

impl FileWatcher {
    /// Create a watcher for `path`.
    ///
    /// # Errors
    /// Returns an error if the file watcher cannot be created or the path cannot be watched.
    pub fn new(path: impl AsRef<Path>) -> notify::Result<Self> {
        // Event paths from the OS are absolute and canonical.
        let target_path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let target_name = target_path.file_name().map(std::ffi::OsStr::to_os_string);
        let watch_root = watch_root_for(&target_path);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        // Editors often save by rename, so watch the directory.
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            rx,
            watch_root,
            target_path,
            target_name,
        })
    }

    /// The canonical path of the file being watched.
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Drain queued events without blocking.
    pub fn take_changed(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.rx.try_recv() {
            changed |= self.record(event);
        }
        changed
    }

    /// Block up to `timeout` for a relevant change, then drain the queue.
    pub fn wait(&mut self, timeout: Duration) -> WatchEvent {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => {
                let first = self.record(event);
                if self.take_changed() || first {
                    WatchEvent::Changed
                } else {
                    WatchEvent::Timeout
                }
            }
            Err(RecvTimeoutError::Timeout) => WatchEvent::Timeout,
            Err(RecvTimeoutError::Disconnected) => WatchEvent::Closed,
        }
    }

    fn record(&self, event: notify::Result<Event>) -> bool {
        match event {
            Ok(ev) if self.is_relevant(&ev) => {
                crate::perf::log_event("watcher.change", format!("kind={:?}", ev.kind));
                true
            }
            Ok(ev) => {
                crate::perf::log_event(
                    "watcher.irrelevant",
                    format!("kind={:?} paths={:?}", ev.kind, ev.paths),
                );
                false
            }
            Err(err) => {
                tracing::warn!(%err, "file watcher error");
                crate::perf::log_event("watcher.error", format!("{err}"));
                false
            }
        }
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.watch_root
                || path == &self.target_path
                || self
                    .target_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("target_path", &self.target_path)
            .field("watch_root", &self.watch_root)
            .finish_non_exhaustive()
    }
}

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::EventKind;
    use std::time::Instant;
    use tempfile::tempdir;

    fn event(paths: Vec<PathBuf>) -> Event {
        Event {
            kind: EventKind::Any,
            paths,
            attrs: notify::event::EventAttributes::new(),
        }
    }

    #[test]
    fn test_directory_level_event_is_relevant_for_watched_file() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("doc.md");
        std::fs::write(&path, "hi").expect("write");
        let watcher = FileWatcher::new(&path).expect("watcher");

        assert!(watcher.is_relevant(&event(vec![canonical_dir])));
    }

    #[test]
    fn test_sibling_file_is_not_relevant() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("doc.md");
        std::fs::write(&path, "hi").expect("write");
        let watcher = FileWatcher::new(&path).expect("watcher");

        assert!(!watcher.is_relevant(&event(vec![canonical_dir.join("doc.html")])));
    }

    #[test]
    fn test_watch_root_for_relative_file_is_dot() {
        let root = watch_root_for(Path::new("notes.md"));
        assert_eq!(root, PathBuf::from("."));
    }

    #[test]
    fn test_canonical_event_path_matches_relative_watcher() {
        let dir = tempdir().expect("tempdir");
        let relative_path = dir.path().join("notes.md");
        std::fs::write(&relative_path, "# notes").expect("write");
        let watcher = FileWatcher::new(&relative_path).expect("watcher");

        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        assert!(watcher.is_relevant(&event(vec![canonical_dir])));
    }

    #[test]
    fn test_real_file_modification_detected() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("watched.md");
        std::fs::write(&path, "original").expect("write");

        let mut watcher = FileWatcher::new(&path).expect("watcher");

        // Give the backend time to register the watch
        std::thread::sleep(Duration::from_millis(500));
        std::fs::write(&path, "modified").expect("write");

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut detected = false;
        while Instant::now() < deadline {
            if watcher.wait(Duration::from_millis(100)) == WatchEvent::Changed {
                detected = true;
                break;
            }
        }

        assert!(detected, "watcher should detect a modification within 5 seconds");
    }
}
