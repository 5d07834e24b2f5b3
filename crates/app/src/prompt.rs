//! File dialogs

use std::path::{Path, PathBuf};

/// Asks the user for a file to open or a destination to save to.
///
/// Returning `None` means the user cancelled.
pub trait FilePrompt {
    fn pick_open(&mut self) -> Option<PathBuf>;

    /// `current` is the path of the open document, used to seed the dialog
    fn pick_save(&mut self, current: Option<&Path>) -> Option<PathBuf>;
}

/// Native dialogs filtered to PDF files
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFilePrompt;

impl FilePrompt for NativeFilePrompt {
    fn pick_open(&mut self) -> Option<PathBuf> {
        rfd::FileDialog::new().add_filter("PDF", &["pdf"]).pick_file()
    }

    fn pick_save(&mut self, current: Option<&Path>) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new().add_filter("PDF", &["pdf"]);

        if let Some(path) = current {
            if let Some(dir) = path.parent() {
                dialog = dialog.set_directory(dir);
            }
            if let Some(name) = path.file_name() {
                dialog = dialog.set_file_name(name.to_string_lossy());
            }
        }

        dialog.save_file()
    }
}
