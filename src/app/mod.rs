//! The live-rendering session.
//!
//! This module follows The Elm Architecture (TEA):
//! - [`Model`]: the complete document state
//! - [`Message`]: everything the shell can ask for
//! - [`update`]: pure state transitions for editing messages
//! - [`Session`]: owns the model and the timers, applies side effects and
//!   decides when to render
//!
//! Time is passed in explicitly as milliseconds since session start.
//! Edits arm the debounce timer; [`Session::tick`] fires due work.

mod autosave;
mod effects;
mod event_loop;
mod model;
mod timer;
mod update;

pub use autosave::{AUTOSAVE_NOTICE_MS, AutosaveState, AutosaveTimer, DEFAULT_AUTOSAVE_PERIOD_MS};
pub use event_loop::Watch;
pub use model::{Model, NOTIFICATION_MS, Notification, NotificationLevel};
pub use timer::{DEFAULT_DEBOUNCE_MS, DebounceState, Debouncer, ScheduledTask};
pub use update::{Message, update};

use std::path::{Path, PathBuf};

use crate::buffer::{DocumentBuffer, DocumentStats};
use crate::highlight::{StyleSpans, Tagger};
use crate::render::{DEFAULT_PDF_FONT, HtmlFileRenderer, PdfRenderer, StyleSheet, Transformer};

/// What a call to [`Session::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub rendered: bool,
    pub autosaved: bool,
    pub notification_expired: bool,
}

/// Owns one document and keeps its preview and highlight spans current.
pub struct Session {
    model: Model,
    debouncer: Debouncer,
    autosave: AutosaveTimer,
    transformer: Transformer,
    tagger: Tagger,
    pdf_renderer: Box<dyn PdfRenderer>,
    pdf_font: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("model", &self.model)
            .field("debouncer", &self.debouncer)
            .field("autosave", &self.autosave)
            .field("pdf_font", &self.pdf_font)
            .finish_non_exhaustive()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// An empty, unbound document rendered at time zero.
    pub fn new() -> Self {
        let mut session = Self {
            model: Model::default(),
            debouncer: Debouncer::default(),
            autosave: AutosaveTimer::new(DEFAULT_AUTOSAVE_PERIOD_MS, 0),
            transformer: Transformer::default(),
            tagger: Tagger::new(),
            pdf_renderer: Box::new(HtmlFileRenderer),
            pdf_font: DEFAULT_PDF_FONT.to_string(),
        };
        session.render();
        session
    }

    /// Set the quiet period between the last edit and the render.
    pub fn with_debounce_ms(mut self, delay_ms: u64) -> Self {
        self.debouncer = Debouncer::new(delay_ms);
        self
    }

    /// Set the autosave period, keeping the enabled flag and last save time.
    pub fn with_autosave_period_ms(mut self, period_ms: u64) -> Self {
        let state = self.autosave.state();
        let mut timer = AutosaveTimer::new(period_ms, state.last_save_ms);
        timer.set_enabled(state.enabled);
        self.autosave = timer;
        self
    }

    pub fn with_styles(mut self, styles: StyleSheet) -> Self {
        self.transformer = Transformer::new(styles);
        self.render();
        self
    }

    /// Replace the transformer, e.g. to plug in another converter.
    pub fn with_transformer(mut self, transformer: Transformer) -> Self {
        self.transformer = transformer;
        self.render();
        self
    }

    pub fn with_tagger(mut self, tagger: Tagger) -> Self {
        self.tagger = tagger;
        self.render();
        self
    }

    pub fn with_pdf_renderer(mut self, renderer: impl PdfRenderer + 'static) -> Self {
        self.pdf_renderer = Box::new(renderer);
        self
    }

    pub fn with_pdf_font(mut self, font: impl Into<String>) -> Self {
        self.pdf_font = font.into();
        self
    }

    /// Record that the buffer changed at `now_ms`.
    ///
    /// Re-arms the debounce timer; the render happens in a later
    /// [`tick`](Self::tick) once edits stop for the debounce delay.
    pub const fn on_edit(&mut self, now_ms: u64) {
        self.debouncer.notify(now_ms);
    }

    /// Apply a message at `now_ms`.
    pub fn handle(&mut self, now_ms: u64, msg: Message) {
        match &msg {
            // Failures are already posted as notifications.
            Message::Save => {
                self.save(now_ms).ok();
            }
            Message::SaveAs(path) => {
                self.save_as(now_ms, path).ok();
            }
            Message::Open(path) => {
                self.open(now_ms, path).ok();
            }
            Message::Export(path) => {
                self.export(now_ms, path).ok();
            }
            Message::SetAutosave(enabled) => self.set_autosave_enabled(*enabled),
            _ => {}
        }

        let is_edit = msg.is_edit();
        self.model = update(std::mem::take(&mut self.model), msg);
        if is_edit {
            self.on_edit(now_ms);
        }
    }

    /// Advance time: expire notifications, fire a due render, run autosave.
    pub fn tick(&mut self, now_ms: u64) -> TickOutcome {
        let notification_expired = self.model.expire_notification(now_ms);

        let rendered = self.debouncer.poll(now_ms);
        if rendered {
            self.render();
        }

        let autosaved = self
            .autosave
            .check(now_ms, self.model.bound_path.is_some())
            && self.autosave_now(now_ms);

        TickOutcome {
            rendered,
            autosaved,
            notification_expired,
        }
    }

    /// Earliest time at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        [
            self.debouncer.due_at(),
            self.autosave.next_check_at(),
            self.model.active_notification().map(|n| n.expires_at_ms),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Replace the document wholesale and render it immediately.
    ///
    /// Any pending debounced render is dropped, so the preview never shows
    /// the previous document after this returns.
    pub fn load_document(&mut self, text: &str, path: Option<PathBuf>) {
        self.debouncer.cancel_pending();
        self.model.buffer.replace_all_clean(text);
        self.model.bound_path = path;
        self.render();
    }

    /// Run a pending debounced render now so projections match the buffer.
    pub(super) fn flush_render(&mut self) {
        if self.debouncer.is_pending() {
            self.debouncer.cancel_pending();
            self.render();
        }
    }

    pub const fn set_autosave_enabled(&mut self, enabled: bool) {
        self.autosave.set_enabled(enabled);
    }

    pub const fn autosave_state(&self) -> AutosaveState {
        self.autosave.state()
    }

    /// The preview markup from the latest render.
    pub fn styled_markup(&self) -> &str {
        &self.model.markup
    }

    /// The highlight spans from the latest render.
    pub const fn style_spans(&self) -> &StyleSpans {
        &self.model.spans
    }

    pub const fn stats(&self) -> DocumentStats {
        self.model.stats
    }

    pub const fn active_notification(&self) -> Option<&Notification> {
        self.model.active_notification()
    }

    pub const fn model(&self) -> &Model {
        &self.model
    }

    /// Direct buffer access for shells that edit in place.
    ///
    /// Call [`on_edit`](Self::on_edit) after changing the text.
    pub const fn buffer_mut(&mut self) -> &mut DocumentBuffer {
        &mut self.model.buffer
    }

    pub fn text(&self) -> String {
        self.model.buffer.text()
    }

    pub const fn is_modified(&self) -> bool {
        self.model.buffer.is_modified()
    }

    pub fn bound_path(&self) -> Option<&Path> {
        self.model.bound_path.as_deref()
    }

    pub const fn is_render_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub const fn render_count(&self) -> u64 {
        self.model.render_count
    }

    pub fn pdf_font(&self) -> &str {
        &self.pdf_font
    }

    /// Re-render markup, spans and stats from the current buffer.
    fn render(&mut self) {
        let _scope = crate::perf::scope("session.render");
        let text = self.model.buffer.text();

        let markup = {
            let _scope = crate::perf::scope("session.transform");
            self.transformer.transform(&text)
        };
        let spans = {
            let _scope = crate::perf::scope("session.tag");
            self.tagger.tag(&text)
        };

        self.model.markup = markup;
        self.model.spans = spans;
        self.model.stats = DocumentStats::from_text(&text);
        self.model.render_count += 1;

        tracing::debug!(
            render = self.model.render_count,
            chars = text.len(),
            spans = self.model.spans.len(),
            "rendered preview"
        );
        crate::perf::log_event(
            "session.render",
            format!(
                "count={} bytes={} spans={} markup_bytes={}",
                self.model.render_count,
                text.len(),
                self.model.spans.len(),
                self.model.markup.len()
            ),
        );
    }
}
