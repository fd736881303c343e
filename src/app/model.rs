use std::path::PathBuf;

use crate::buffer::{DocumentBuffer, DocumentStats};
use crate::highlight::StyleSpans;

/// Lifetime of notifications other than the autosave notice.
pub const NOTIFICATION_MS: u64 = 4_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// A transient message for the shell to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub expires_at_ms: u64,
}

/// The complete session state.
///
/// The buffer is the single source of truth; spans, markup and stats are
/// projections refreshed on each render.
#[derive(Debug, Default)]
pub struct Model {
    pub buffer: DocumentBuffer,
    pub bound_path: Option<PathBuf>,
    pub spans: StyleSpans,
    pub markup: String,
    pub stats: DocumentStats,
    /// Renders completed so far.
    pub render_count: u64,
    notification: Option<Notification>,
}

impl Model {
    pub fn new(buffer: DocumentBuffer, bound_path: Option<PathBuf>) -> Self {
        Self {
            buffer,
            bound_path,
            ..Self::default()
        }
    }

    pub(super) fn show_notification(
        &mut self,
        level: NotificationLevel,
        message: impl Into<String>,
        now_ms: u64,
        ttl_ms: u64,
    ) {
        self.notification = Some(Notification {
            level,
            message: message.into(),
            expires_at_ms: now_ms.saturating_add(ttl_ms),
        });
    }

    pub(super) fn expire_notification(&mut self, now_ms: u64) -> bool {
        if self
            .notification
            .as_ref()
            .is_some_and(|n| n.expires_at_ms <= now_ms)
        {
            self.notification = None;
            return true;
        }
        false
    }

    pub(super) fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    pub const fn active_notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// File name shown in titles, `Untitled` when unbound.
    pub fn display_name(&self) -> String {
        self.bound_path
            .as_ref()
            .and_then(|path| path.file_name())
            .map_or_else(
                || "Untitled".to_string(),
                |name| name.to_string_lossy().into_owned(),
            )
    }
}
