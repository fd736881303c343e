use std::path::PathBuf;

use crate::app::Model;
use crate::buffer::Direction;

/// Everything the shell can ask of a session.
///
/// Editing and cursor messages are applied by [`update`]. File and
/// setting messages carry side effects and are applied by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editing
    /// Insert a character at the cursor
    InsertChar(char),
    /// Insert text at the cursor, possibly spanning lines
    InsertText(String),
    /// Break the line at the cursor
    SplitLine,
    /// Delete the character before the cursor
    DeleteBack,
    /// Delete the character under the cursor
    DeleteForward,
    /// Replace the whole text, keeping the document bound and modified
    ReplaceAll(String),

    // Cursor
    MoveCursor(Direction),
    MoveTo { line: usize, col: usize },
    MoveHome,
    MoveEnd,
    MoveToEnd,

    // Files
    /// Write the buffer to the bound path
    Save,
    /// Write the buffer to a new path and bind it
    SaveAs(PathBuf),
    /// Replace the document with a file's contents
    Open(PathBuf),
    /// Write the print page for the current markup
    Export(PathBuf),

    // Settings
    SetAutosave(bool),
    DismissNotification,
}

impl Message {
    /// Whether the message changes the buffer text and needs a re-render.
    pub const fn is_edit(&self) -> bool {
        matches!(
            self,
            Self::InsertChar(_)
                | Self::InsertText(_)
                | Self::SplitLine
                | Self::DeleteBack
                | Self::DeleteForward
                | Self::ReplaceAll(_)
        )
    }
}

/// Apply a message to the model.
///
/// Pure with respect to the outside world: no files, no clock.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        Message::InsertChar(ch) => model.buffer.insert_char(ch),
        Message::InsertText(text) => model.buffer.insert_str(&text),
        Message::SplitLine => model.buffer.split_line(),
        Message::DeleteBack => {
            model.buffer.delete_back();
        }
        Message::DeleteForward => {
            model.buffer.delete_forward();
        }
        Message::ReplaceAll(text) => model.buffer.replace_all(&text),

        Message::MoveCursor(direction) => model.buffer.move_cursor(direction),
        Message::MoveTo { line, col } => model.buffer.move_to(line, col),
        Message::MoveHome => model.buffer.move_home(),
        Message::MoveEnd => model.buffer.move_end(),
        Message::MoveToEnd => model.buffer.move_to_end(),

        Message::DismissNotification => model.dismiss_notification(),

        // Side effects, applied by the session.
        Message::Save
        | Message::SaveAs(_)
        | Message::Open(_)
        | Message::Export(_)
        | Message::SetAutosave(_) => {}
    }
    model
}
