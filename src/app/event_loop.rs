use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::app::{Message, Session};
use crate::files;
use crate::watcher::{FileWatcher, WatchEvent};

/// Longest the loop blocks on the watcher before checking timers again.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Follows a file edited by another program and re-renders it live.
///
/// Each external change is fed to the session as a whole-text edit, so
/// bursts of saves are coalesced by the debounce timer like typing is.
#[derive(Debug, Clone)]
pub struct Watch {
    path: PathBuf,
    output: Option<PathBuf>,
    max_renders: Option<u64>,
}

impl Watch {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            output: None,
            max_renders: None,
        }
    }

    /// Write the markup to `output` after every render instead of printing
    /// a summary line.
    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    /// Stop after this many debounced renders.
    pub const fn with_max_renders(mut self, max: Option<u64>) -> Self {
        self.max_renders = max;
        self
    }

    /// Run the watch loop until the watcher closes or the render limit is
    /// reached.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read initially, the watcher
    /// cannot be created, or the output cannot be written.
    pub fn run(&self, session: &mut Session) -> Result<()> {
        let _run_scope = crate::perf::scope("watch.run.total");

        let text = files::read_document(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        session.load_document(&text, Some(self.path.clone()));
        // The file belongs to the external editor.
        session.set_autosave_enabled(false);
        self.publish(session)?;

        let mut watcher = FileWatcher::new(&self.path)
            .with_context(|| format!("Failed to watch {}", self.path.display()))?;
        tracing::debug!(path = %watcher.target_path().display(), "watching");

        let start = Instant::now();
        let now_ms = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let mut renders = 0u64;

        loop {
            let now = now_ms();
            if session.tick(now).rendered {
                renders += 1;
                self.publish(session)?;
                if self.max_renders.is_some_and(|max| renders >= max) {
                    break;
                }
            }

            let timeout = session
                .next_deadline()
                .map_or(IDLE_POLL, |due| {
                    Duration::from_millis(due.saturating_sub(now))
                })
                .min(IDLE_POLL);

            match watcher.wait(timeout) {
                WatchEvent::Changed => self.reload(session, now_ms()),
                WatchEvent::Timeout => {}
                WatchEvent::Closed => {
                    tracing::warn!("file watcher closed, stopping");
                    break;
                }
            }
        }

        Ok(())
    }

    fn reload(&self, session: &mut Session, now_ms: u64) {
        match files::read_document(&self.path) {
            Ok(text) if text != session.text() => {
                crate::perf::log_event("watch.change", format!("bytes={}", text.len()));
                session.handle(now_ms, Message::ReplaceAll(text));
            }
            Ok(_) => {}
            // Editors may briefly remove the file while saving.
            Err(err) => tracing::debug!(%err, "reload skipped"),
        }
    }

    fn publish(&self, session: &Session) -> Result<()> {
        match &self.output {
            Some(out) => write_markup(out, session.styled_markup()),
            None => {
                let stats = session.stats();
                println!(
                    "rendered {} #{}: {} words, {} lines, {} spans",
                    self.path.display(),
                    session.render_count(),
                    stats.words,
                    stats.lines,
                    session.style_spans().len()
                );
                Ok(())
            }
        }
    }
}

fn write_markup(out: &Path, markup: &str) -> Result<()> {
    files::write_document(out, markup)
        .with_context(|| format!("Failed to write {}", out.display()))
}
