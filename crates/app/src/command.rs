//! Editor commands
//!
//! Every menu entry, toolbar button and shortcut produces a [`Command`].
//! The window collects them during a frame and hands them to
//! [`EditorShell::dispatch`], which looks up the handler here.

use crate::prompt::FilePrompt;
use crate::shell::EditorShell;
use crate::style::FontFamilyChoice;

/// User-triggered editor actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    // File
    Open,
    Save,

    // Navigation
    NextPage,
    PrevPage,

    // View
    ZoomIn,
    ZoomOut,

    // Text styling
    ToggleBold,
    ToggleItalic,
    ToggleUnderline,
    SetFontFamily(FontFamilyChoice),
    SetFontSize(u32),
}

/// Handler signature shared by all commands
pub type Handler<P> = fn(&mut EditorShell<P>, Command);

impl Command {
    /// The handler that carries out this command
    pub fn handler<P: FilePrompt>(self) -> Handler<P> {
        match self {
            Command::Open => EditorShell::on_open,
            Command::Save => EditorShell::on_save,
            Command::NextPage => EditorShell::on_next_page,
            Command::PrevPage => EditorShell::on_prev_page,
            Command::ZoomIn => EditorShell::on_zoom_in,
            Command::ZoomOut => EditorShell::on_zoom_out,
            Command::ToggleBold => EditorShell::on_toggle_bold,
            Command::ToggleItalic => EditorShell::on_toggle_italic,
            Command::ToggleUnderline => EditorShell::on_toggle_underline,
            Command::SetFontFamily(_) => EditorShell::on_set_font_family,
            Command::SetFontSize(_) => EditorShell::on_set_font_size,
        }
    }

    /// Whether the command needs an open document to do anything
    pub fn needs_document(&self) -> bool {
        matches!(
            self,
            Command::Save
                | Command::NextPage
                | Command::PrevPage
                | Command::ZoomIn
                | Command::ZoomOut
        )
    }
}
