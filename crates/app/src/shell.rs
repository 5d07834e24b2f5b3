//! Editor controller
//!
//! [`EditorShell`] owns all application state and turns [`Command`]s into
//! calls on the document adapter. It knows nothing about egui; the window
//! in `gui` only draws [`AppState`] and feeds commands back in.

use crate::command::Command;
use crate::prompt::FilePrompt;
use crate::style::TextStyle;
use pdf_editor_core::{DocumentAdapter, EditorConfig, PreviewConfig};
use pdf_editor_render::{RgbaImage, MAX_PIXEL_SIDE};
use std::path::Path;
use tracing::{debug, info, warn};

/// Text the user is editing, tied to the page it was loaded from
#[derive(Debug, Default)]
pub struct EditBuffer {
    text: String,
    page: usize,
    dirty: bool,
}

impl EditBuffer {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Mutable access for the text widget; call [`EditBuffer::mark_edited`]
    /// when the widget reports a change
    pub fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Whether the text changed since it was loaded or saved
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_edited(&mut self) {
        self.dirty = true;
    }

    /// Replace the whole buffer, as typing it in would
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.dirty = true;
    }

    fn load(&mut self, page: usize, text: String) {
        self.text = text;
        self.page = page;
        self.dirty = false;
    }
}

/// Rendered preview of the current page.
///
/// `generation` changes whenever the image does, so the window can tell
/// when its texture is stale.
#[derive(Default)]
pub struct PagePreview {
    image: Option<RgbaImage>,
    generation: u64,
}

impl PagePreview {
    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn set(&mut self, image: Option<RgbaImage>) {
        self.image = image;
        self.generation = self.generation.wrapping_add(1);
    }
}

/// View-only settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// 1.0 is 100%
    pub zoom: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { zoom: 1.0 }
    }
}

/// Everything the editor window shows
pub struct AppState {
    pub adapter: DocumentAdapter,
    pub buffer: EditBuffer,
    pub preview: PagePreview,
    pub view: ViewState,
    pub style: TextStyle,

    /// Outcome of the last operation, shown in the status bar
    pub status: String,
}

impl AppState {
    pub fn new(adapter: DocumentAdapter, style: TextStyle) -> Self {
        Self {
            adapter,
            buffer: EditBuffer::default(),
            preview: PagePreview::default(),
            view: ViewState::default(),
            style,
            status: String::from("Ready"),
        }
    }

    /// "page i / n" label for the toolbar
    pub fn page_label(&self) -> String {
        let count = self.adapter.page_count();
        if count == 0 {
            "— / —".to_string()
        } else {
            format!("{} / {}", self.adapter.current_page() + 1, count)
        }
    }
}

/// Controller that applies commands to the application state
pub struct EditorShell<P: FilePrompt> {
    state: AppState,
    prompt: P,
    preview_config: PreviewConfig,
    max_texture_side: u32,
}

impl<P: FilePrompt> EditorShell<P> {
    pub fn new(adapter: DocumentAdapter, prompt: P, config: &EditorConfig) -> Self {
        let adapter = adapter.with_text_placement(config.text);
        Self {
            state: AppState::new(adapter, TextStyle::with_size(config.editor.font_size)),
            prompt,
            preview_config: config.preview,
            max_texture_side: MAX_PIXEL_SIDE,
        }
    }

    /// Largest texture side the window can upload. Previews are rendered
    /// no larger than this, whatever the zoom.
    pub fn set_max_texture_side(&mut self, side: u32) {
        let side = side.clamp(1, MAX_PIXEL_SIDE);
        if side == self.max_texture_side {
            return;
        }

        self.max_texture_side = side;
        if self.state.adapter.is_open() {
            self.refresh_preview();
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn buffer_mut(&mut self) -> &mut EditBuffer {
        &mut self.state.buffer
    }

    /// Run the handler for `command`
    pub fn dispatch(&mut self, command: Command) {
        debug!(?command, "dispatch");
        let handler = command.handler::<P>();
        handler(self, command);
    }

    /// Open `path` directly, without prompting.
    ///
    /// On failure the status line reports the error and the previously open
    /// document, buffer and preview are left as they were.
    pub fn open_path(&mut self, path: &Path) {
        match self.state.adapter.open(path) {
            Ok(page_count) => {
                self.state.view = ViewState::default();
                self.refresh_page();
                self.state.status = format!("Opened {}", path.display());
                info!(path = %path.display(), page_count, "document opened");
            }
            Err(e) => {
                warn!(error = %e, "open failed");
                self.state.status = format!("Error: {}", e);
            }
        }
    }

    /// Pixels per point the preview is rendered at
    pub fn render_scale(&self) -> f32 {
        let scale = self.preview_config.scale * self.state.view.zoom;
        let page = self.state.adapter.current_page();
        match self.state.adapter.page_size(page) {
            Some(size) => scale.min(size.max_scale(self.max_texture_side)),
            None => scale,
        }
    }

    /// On-screen size of the preview, in logical points
    pub fn preview_display_size(&self) -> Option<(f32, f32)> {
        self.state.preview.image()?;
        let size = self.state.adapter.page_size(self.state.adapter.current_page())?;
        let zoom = self.state.view.zoom;
        Some((size.width * zoom, size.height * zoom))
    }

    /// Reload buffer and preview for the adapter's current page
    fn refresh_page(&mut self) {
        let page = self.state.adapter.current_page();
        let text = self.state.adapter.page_text(page);
        self.state.buffer.load(page, text);
        self.refresh_preview();
    }

    fn refresh_preview(&mut self) {
        let page = self.state.adapter.current_page();
        let scale = self.render_scale();
        let image = self.state.adapter.page_pixmap(page, scale);
        if image.is_none() {
            debug!(page, "no preview available");
        }
        self.state.preview.set(image);
    }

    fn after_navigation(&mut self, moved: bool) {
        if !moved {
            return;
        }

        let discarded = self.state.buffer.is_dirty();
        self.refresh_page();

        let mut status = format!("Page {}", self.state.page_label());
        if discarded {
            status.push_str(" (unsaved edits discarded)");
        }
        self.state.status = status;
    }

    fn set_zoom(&mut self, zoom: f32) {
        let PreviewConfig { min_zoom, max_zoom, .. } = self.preview_config;
        let zoom = zoom.clamp(min_zoom, max_zoom);
        if zoom == self.state.view.zoom {
            return;
        }

        self.state.view.zoom = zoom;
        if self.state.adapter.is_open() {
            self.refresh_preview();
        }
        self.state.status = format!("Zoom {:.0}%", zoom * 100.0);
    }

    pub(crate) fn on_open(&mut self, _command: Command) {
        if let Some(path) = self.prompt.pick_open() {
            self.open_path(&path);
        }
    }

    pub(crate) fn on_save(&mut self, _command: Command) {
        if !self.state.adapter.is_open() {
            self.state.status = "Error: no document is open".to_string();
            return;
        }

        let current = self.state.adapter.path().map(Path::to_path_buf);
        let Some(path) = self.prompt.pick_save(current.as_deref()) else {
            return;
        };

        match self.write_current_page(&path) {
            Ok(()) => {
                // The page now holds the WinAnsi form of the text
                self.refresh_page();
                self.state.status = format!("File saved as {}", path.display());
            }
            Err(e) => {
                warn!(error = %e, "save failed");
                self.state.status = format!("Error: {}", e);
            }
        }
    }

    fn write_current_page(&mut self, path: &Path) -> pdf_editor_core::DocumentResult<()> {
        let page = self.state.adapter.current_page();
        self.state.adapter.replace_page_text(page, &self.state.buffer.text)?;
        self.state.adapter.save(path)
    }

    pub(crate) fn on_next_page(&mut self, _command: Command) {
        let moved = self.state.adapter.next_page();
        self.after_navigation(moved);
    }

    pub(crate) fn on_prev_page(&mut self, _command: Command) {
        let moved = self.state.adapter.prev_page();
        self.after_navigation(moved);
    }

    pub(crate) fn on_zoom_in(&mut self, _command: Command) {
        self.set_zoom(self.state.view.zoom * self.preview_config.zoom_step);
    }

    pub(crate) fn on_zoom_out(&mut self, _command: Command) {
        self.set_zoom(self.state.view.zoom / self.preview_config.zoom_step);
    }

    pub(crate) fn on_toggle_bold(&mut self, _command: Command) {
        self.state.style.bold = !self.state.style.bold;
    }

    pub(crate) fn on_toggle_italic(&mut self, _command: Command) {
        self.state.style.italic = !self.state.style.italic;
    }

    pub(crate) fn on_toggle_underline(&mut self, _command: Command) {
        self.state.style.underline = !self.state.style.underline;
    }

    pub(crate) fn on_set_font_family(&mut self, command: Command) {
        if let Command::SetFontFamily(family) = command {
            self.state.style.family = family;
        }
    }

    pub(crate) fn on_set_font_size(&mut self, command: Command) {
        if let Command::SetFontSize(size) = command {
            self.state.style.set_size(size);
        }
    }
}
