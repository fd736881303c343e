use std::path::Path;

use crate::app::{AUTOSAVE_NOTICE_MS, NOTIFICATION_MS, NotificationLevel, Session};
use crate::error::FileError;
use crate::files;
use crate::render::print_page;

impl Session {
    /// Write the buffer to its bound path.
    ///
    /// # Errors
    /// Returns [`FileError::NotBound`] for an unbound document, posting a
    /// warning, or the write failure, posting an error.
    pub fn save(&mut self, now_ms: u64) -> Result<(), FileError> {
        let Some(path) = self.model.bound_path.clone() else {
            let err = FileError::NotBound;
            tracing::debug!(%err, "save without a bound path");
            self.model.show_notification(
                NotificationLevel::Warning,
                err.to_string(),
                now_ms,
                NOTIFICATION_MS,
            );
            return Err(err);
        };
        self.write_bound(now_ms, &path)
    }

    /// Write the buffer to `path` and bind the document to it.
    ///
    /// # Errors
    /// Returns the write failure; the document stays bound to its old path.
    pub fn save_as(&mut self, now_ms: u64, path: &Path) -> Result<(), FileError> {
        self.write_bound(now_ms, path)?;
        self.model.bound_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Replace the document with the contents of `path`.
    ///
    /// # Errors
    /// Returns the read failure; the current document is left untouched.
    pub fn open(&mut self, now_ms: u64, path: &Path) -> Result<(), FileError> {
        let text = match files::read_document(path) {
            Ok(text) => text,
            Err(err) => {
                self.report_failure(now_ms, "open", &err);
                return Err(err);
            }
        };
        self.load_document(&text, Some(path.to_path_buf()));
        let name = self.model.display_name();
        self.model.show_notification(
            NotificationLevel::Info,
            format!("Opened {name}"),
            now_ms,
            NOTIFICATION_MS,
        );
        Ok(())
    }

    /// Hand the print page for the current text to the PDF renderer.
    ///
    /// A render still waiting on the debounce timer runs first.
    ///
    /// # Errors
    /// Returns the renderer's failure.
    pub fn export(&mut self, now_ms: u64, dest: &Path) -> Result<(), FileError> {
        self.flush_render();
        let page = self.print_page();
        if let Err(err) = self.pdf_renderer.render(&page, dest) {
            self.report_failure(now_ms, "export", &err);
            return Err(err);
        }
        self.model.show_notification(
            NotificationLevel::Info,
            format!("Exported to {}", dest.display()),
            now_ms,
            NOTIFICATION_MS,
        );
        Ok(())
    }

    /// The current preview wrapped as a print-ready page.
    pub fn print_page(&self) -> String {
        print_page(&self.model.markup, &self.pdf_font)
    }

    /// One autosave attempt. Failures are logged, never shown.
    pub(super) fn autosave_now(&mut self, now_ms: u64) -> bool {
        let Some(path) = self.model.bound_path.clone() else {
            return false;
        };
        match files::write_document(&path, &self.model.buffer.text()) {
            Ok(()) => {
                self.autosave.record_save(now_ms);
                self.model.buffer.mark_saved();
                let name = self.model.display_name();
                self.model.show_notification(
                    NotificationLevel::Info,
                    format!("Auto-saved {name}"),
                    now_ms,
                    AUTOSAVE_NOTICE_MS,
                );
                tracing::debug!(path = %path.display(), "autosaved");
                true
            }
            Err(err) => {
                tracing::warn!(%err, "autosave skipped this cycle");
                crate::perf::log_event("autosave.error", err.to_string());
                false
            }
        }
    }

    fn write_bound(&mut self, now_ms: u64, path: &Path) -> Result<(), FileError> {
        if let Err(err) = files::write_document(path, &self.model.buffer.text()) {
            self.report_failure(now_ms, "save", &err);
            return Err(err);
        }
        self.autosave.record_save(now_ms);
        self.model.buffer.mark_saved();
        self.model.show_notification(
            NotificationLevel::Info,
            format!("Saved {}", path.display()),
            now_ms,
            NOTIFICATION_MS,
        );
        Ok(())
    }

    fn report_failure(&mut self, now_ms: u64, action: &str, err: &FileError) {
        tracing::warn!(%err, action, "file operation failed");
        crate::perf::log_event(&format!("{action}.error"), err.to_string());
        self.model.show_notification(
            NotificationLevel::Error,
            err.to_string(),
            now_ms,
            NOTIFICATION_MS,
        );
    }
}
