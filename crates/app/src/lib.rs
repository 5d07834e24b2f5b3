//! PDF Editor application
//!
//! Editor shell around the document adapter: commands, application state,
//! file dialogs and the egui window.

pub mod command;
pub mod gui;
pub mod prompt;
pub mod shell;
pub mod style;

pub use command::Command;
pub use gui::run;
pub use prompt::{FilePrompt, NativeFilePrompt};
pub use shell::{AppState, EditBuffer, EditorShell, PagePreview, ViewState};
pub use style::{FontFamilyChoice, TextStyle};
