//! Document adapter
//!
//! Owns the single open PDF and exposes page-level reads, text replacement,
//! preview rendering and a page cursor on top of it.
//!
//! Only `open`, `save` and a failed page rewrite report errors. Every other
//! call made without a document, or with a page index outside the document,
//! quietly returns an empty result: `""`, `None`, `false` or a no-op.

use crate::error::{DocumentError, DocumentResult};
use crate::page_rewrite::{self, TextPlacement};
use crate::page_tree;
use lopdf::{Document, ObjectId};
use pdf_editor_render::{OutlineRasterizer, PageDimensions, PageRasterizer, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Scale used for page previews when the caller has no preference
pub const DEFAULT_PREVIEW_SCALE: f32 = 2.0;

/// State of the currently open document
struct OpenDocument {
    pdf: Document,

    /// Where the document was opened from, or last saved to
    path: PathBuf,

    /// Page ids in document order, refreshed after every mutation
    pages: Vec<ObjectId>,

    /// Current page index, always `< pages.len()`
    cursor: usize,

    /// Serialized copy handed to the rasterizer, `None` once stale
    snapshot: Option<Vec<u8>>,

    /// Whether the document changed since it was opened or saved
    modified: bool,
}

impl OpenDocument {
    fn page_id(&self, index: usize) -> Option<ObjectId> {
        self.pages.get(index).copied()
    }

    fn snapshot(&mut self) -> Result<&[u8], lopdf::Error> {
        if self.snapshot.is_none() {
            let mut bytes = Vec::new();
            self.pdf.save_to(&mut bytes)?;
            self.snapshot = Some(bytes);
        }
        Ok(self.snapshot.as_deref().unwrap_or_default())
    }
}

/// The document adapter.
///
/// Holds at most one open document at a time. Opening a new file replaces
/// the current one only once the new file has loaded successfully.
pub struct DocumentAdapter {
    open: Option<OpenDocument>,
    rasterizer: Box<dyn PageRasterizer>,
    placement: TextPlacement,
}

impl Default for DocumentAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentAdapter {
    /// Create an adapter that renders outline previews
    pub fn new() -> Self {
        Self::with_rasterizer(Box::new(OutlineRasterizer))
    }

    /// Create an adapter that renders previews with `rasterizer`
    pub fn with_rasterizer(rasterizer: Box<dyn PageRasterizer>) -> Self {
        Self { open: None, rasterizer, placement: TextPlacement::default() }
    }

    /// Use `placement` for text written by [`DocumentAdapter::replace_page_text`]
    pub fn with_text_placement(mut self, placement: TextPlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Name of the preview backend in use
    pub fn rasterizer_name(&self) -> &'static str {
        self.rasterizer.name()
    }

    /// Open the PDF at `path` and move the cursor to the first page.
    ///
    /// Returns the page count. On failure any previously open document stays
    /// open and untouched.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> DocumentResult<usize> {
        let path = path.as_ref();

        let bytes = std::fs::read(path)
            .map_err(|source| DocumentError::Read { path: path.to_path_buf(), source })?;
        let pdf = Document::load_mem(&bytes)
            .map_err(|source| DocumentError::Parse { path: path.to_path_buf(), source })?;

        let pages = page_tree::page_ids(&pdf);
        if pages.is_empty() {
            return Err(DocumentError::Empty { path: path.to_path_buf() });
        }

        let page_count = pages.len();
        self.open = Some(OpenDocument {
            pdf,
            path: path.to_path_buf(),
            pages,
            cursor: 0,
            snapshot: Some(bytes),
            modified: false,
        });

        info!(page_count, "opened PDF");
        Ok(page_count)
    }

    /// Release the open document, if any
    pub fn close(&mut self) {
        if let Some(doc) = self.open.take() {
            debug!(path = %doc.path.display(), "closed PDF");
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Path the document was opened from or last saved to
    pub fn path(&self) -> Option<&Path> {
        self.open.as_ref().map(|doc| doc.path.as_path())
    }

    /// Whether a page was rewritten since the document was opened or saved
    pub fn is_modified(&self) -> bool {
        self.open.as_ref().is_some_and(|doc| doc.modified)
    }

    /// Write the document to `path`.
    ///
    /// Objects orphaned by page rewrites are pruned first. On success `path`
    /// becomes the document's path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> DocumentResult<()> {
        let path = path.as_ref();
        let doc = self.open.as_mut().ok_or(DocumentError::NoDocument)?;

        if doc.modified {
            let pruned = doc.pdf.prune_objects();
            debug!(pruned = pruned.len(), "pruned unreferenced objects");
        }

        doc.pdf
            .save(path)
            .map_err(|source| DocumentError::Save { path: path.to_path_buf(), source: source.into() })?;

        doc.path = path.to_path_buf();
        doc.modified = false;
        doc.snapshot = None;

        info!(page_count = doc.pages.len(), "saved PDF");
        Ok(())
    }

    /// Number of pages, 0 when nothing is open
    pub fn page_count(&self) -> usize {
        self.open.as_ref().map_or(0, |doc| doc.pages.len())
    }

    /// Current page index, 0 when nothing is open
    pub fn current_page(&self) -> usize {
        self.open.as_ref().map_or(0, |doc| doc.cursor)
    }

    /// Move the cursor to `index`.
    ///
    /// Returns true if the cursor moved, false if `index` is out of range or
    /// already current.
    pub fn go_to_page(&mut self, index: usize) -> bool {
        let Some(doc) = self.open.as_mut() else {
            return false;
        };
        if index >= doc.pages.len() || index == doc.cursor {
            return false;
        }
        doc.cursor = index;
        debug!(page = index, "moved cursor");
        true
    }

    /// Advance the cursor.
    ///
    /// Returns true if navigation succeeded, false if already on the last page.
    pub fn next_page(&mut self) -> bool {
        let target = self.current_page().saturating_add(1);
        self.go_to_page(target)
    }

    /// Step the cursor back.
    ///
    /// Returns true if navigation succeeded, false if already on the first page.
    pub fn prev_page(&mut self) -> bool {
        match self.current_page().checked_sub(1) {
            Some(target) => self.go_to_page(target),
            None => false,
        }
    }

    /// Size of page `index`, `None` if out of range
    pub fn page_size(&self, index: usize) -> Option<PageDimensions> {
        let doc = self.open.as_ref()?;
        let page_id = doc.page_id(index)?;
        Some(page_tree::media_box(&doc.pdf, page_id).dimensions())
    }

    /// Plain text of page `index`.
    ///
    /// Empty for an out-of-range index or when nothing is open. Pages whose
    /// text cannot be extracted also read as empty.
    pub fn page_text(&self, index: usize) -> String {
        let Some(doc) = self.open.as_ref() else {
            return String::new();
        };
        if index >= doc.pages.len() {
            return String::new();
        }

        // lopdf numbers pages from 1
        let page_number = index as u32 + 1;
        match doc.pdf.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                warn!(page = index, error = %e, "text extraction failed");
                String::new()
            }
        }
    }

    /// Replace the text of page `index` with `text`.
    ///
    /// The page is rebuilt from its non-text content with `text` written at
    /// the fixed anchor; original text layout and styling are discarded.
    /// Returns `Ok(false)` without touching anything when nothing is open or
    /// `index` is out of range.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn replace_page_text(&mut self, index: usize, text: &str) -> DocumentResult<bool> {
        let placement = self.placement;
        let Some(doc) = self.open.as_mut() else {
            return Ok(false);
        };
        let Some(page_id) = doc.page_id(index) else {
            return Ok(false);
        };

        page_rewrite::rebuild_page(&mut doc.pdf, page_id, text, &placement)
            .map_err(|source| DocumentError::Rewrite { page: index, source })?;

        doc.pages = page_tree::page_ids(&doc.pdf);
        doc.snapshot = None;
        doc.modified = true;

        info!(page = index, "replaced page text");
        Ok(true)
    }

    /// Render page `index` at `scale` pixels per point.
    ///
    /// `None` for an out-of-range index, when nothing is open, or when the
    /// backend fails to render.
    pub fn page_pixmap(&mut self, index: usize, scale: f32) -> Option<RgbaImage> {
        let doc = self.open.as_mut()?;
        let page_id = doc.page_id(index)?;
        let page_index = u16::try_from(index).ok()?;
        let dimensions = page_tree::media_box(&doc.pdf, page_id).dimensions();

        let bytes = match doc.snapshot() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "failed to serialize document for rendering");
                return None;
            }
        };

        match self.rasterizer.rasterize(bytes, page_index, dimensions, scale) {
            Ok(image) => {
                debug!(
                    page = index,
                    width = image.width(),
                    height = image.height(),
                    "rendered preview"
                );
                Some(image)
            }
            Err(e) => {
                warn!(
                    page = index,
                    backend = self.rasterizer.name(),
                    error = %e,
                    "page render failed"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::write_sample_pdf;
    use tempfile::TempDir;

    fn open_sample(pages: &[&str]) -> (TempDir, PathBuf, DocumentAdapter) {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample_pdf(dir.path(), "sample.pdf", pages).unwrap();
        let mut adapter = DocumentAdapter::new();
        adapter.open(&path).unwrap();
        (dir, path, adapter)
    }

    #[test]
    fn test_open_sets_page_count_and_cursor() {
        let (_dir, path, adapter) = open_sample(&["one", "two", "three"]);
        assert!(adapter.is_open());
        assert_eq!(adapter.page_count(), 3);
        assert_eq!(adapter.current_page(), 0);
        assert_eq!(adapter.path(), Some(path.as_path()));
        assert!(!adapter.is_modified());
    }

    #[test]
    fn test_open_resets_cursor_on_reopen() {
        let (_dir, path, mut adapter) = open_sample(&["one", "two"]);
        assert!(adapter.next_page());
        assert_eq!(adapter.open(&path).unwrap(), 2);
        assert_eq!(adapter.current_page(), 0);
    }

    #[test]
    fn test_open_missing_file() {
        let mut adapter = DocumentAdapter::new();
        let err = adapter.open("/nonexistent/missing.pdf").unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
        assert!(err.to_string().starts_with("Error reading PDF"));
        assert!(!adapter.is_open());
    }

    #[test]
    fn test_open_invalid_pdf_keeps_previous_document() {
        let (dir, path, mut adapter) = open_sample(&["one", "two"]);
        adapter.next_page();

        let bogus = dir.path().join("bogus.pdf");
        std::fs::write(&bogus, b"this is not a pdf").unwrap();

        let err = adapter.open(&bogus).unwrap_err();
        assert!(matches!(err, DocumentError::Parse { .. }));
        assert_eq!(adapter.path(), Some(path.as_path()));
        assert_eq!(adapter.page_count(), 2);
        assert_eq!(adapter.current_page(), 1);
    }

    #[test]
    fn test_no_document_degrades_silently() {
        let mut adapter = DocumentAdapter::new();
        assert_eq!(adapter.page_count(), 0);
        assert_eq!(adapter.current_page(), 0);
        assert_eq!(adapter.page_text(0), "");
        assert!(adapter.page_pixmap(0, DEFAULT_PREVIEW_SCALE).is_none());
        assert!(adapter.page_size(0).is_none());
        assert!(!adapter.replace_page_text(0, "x").unwrap());
        assert!(!adapter.next_page());
        assert!(!adapter.prev_page());
        assert!(!adapter.is_modified());
    }

    #[test]
    fn test_save_without_document_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut adapter = DocumentAdapter::new();
        let err = adapter.save(dir.path().join("out.pdf")).unwrap_err();
        assert!(matches!(err, DocumentError::NoDocument));
    }

    #[test]
    fn test_close_is_idempotent() {
        let (_dir, _path, mut adapter) = open_sample(&["one"]);
        adapter.close();
        adapter.close();
        assert!(!adapter.is_open());
        assert_eq!(adapter.page_count(), 0);
    }

    #[test]
    fn test_page_text() {
        let (_dir, _path, adapter) = open_sample(&["alpha page", "beta page"]);
        assert!(adapter.page_text(0).contains("alpha page"));
        assert!(adapter.page_text(1).contains("beta page"));
    }

    #[test]
    fn test_page_text_out_of_range_is_empty() {
        let (_dir, _path, adapter) = open_sample(&["one", "two"]);
        for index in [2, 3, 100, usize::MAX] {
            assert_eq!(adapter.page_text(index), "", "index {}", index);
        }
    }

    #[test]
    fn test_page_pixmap() {
        let (_dir, _path, mut adapter) = open_sample(&["one"]);
        let image = adapter.page_pixmap(0, DEFAULT_PREVIEW_SCALE).unwrap();
        assert_eq!(image.dimensions(), (1224, 1584));

        let image = adapter.page_pixmap(0, 1.0).unwrap();
        assert_eq!(image.dimensions(), (612, 792));
    }

    #[test]
    fn test_page_pixmap_over_pixel_limit_is_none() {
        let (_dir, _path, mut adapter) = open_sample(&["one"]);
        assert!(adapter.page_pixmap(0, 1000.0).is_none());
        assert!(adapter.page_pixmap(0, 1.0).is_some());
    }

    #[test]
    fn test_page_pixmap_out_of_range_is_none() {
        let (_dir, _path, mut adapter) = open_sample(&["one", "two"]);
        for index in [2, 3, 100, usize::MAX] {
            assert!(adapter.page_pixmap(index, 1.0).is_none(), "index {}", index);
        }
    }

    #[test]
    fn test_navigation_scenario() {
        let (_dir, _path, mut adapter) = open_sample(&["one", "two", "three"]);
        assert_eq!(adapter.current_page(), 0);

        assert!(adapter.next_page());
        assert!(adapter.next_page());
        assert_eq!(adapter.current_page(), 2);

        assert!(!adapter.next_page());
        assert_eq!(adapter.current_page(), 2);
    }

    #[test]
    fn test_prev_page_at_first_page() {
        let (_dir, _path, mut adapter) = open_sample(&["one", "two"]);
        assert!(!adapter.prev_page());
        assert_eq!(adapter.current_page(), 0);

        assert!(adapter.next_page());
        assert!(adapter.prev_page());
        assert_eq!(adapter.current_page(), 0);
    }

    #[test]
    fn test_go_to_page_bounds() {
        let (_dir, _path, mut adapter) = open_sample(&["one", "two", "three"]);
        assert!(adapter.go_to_page(2));
        assert!(!adapter.go_to_page(2));
        assert!(!adapter.go_to_page(3));
        assert_eq!(adapter.current_page(), 2);
    }

    #[test]
    fn test_replace_out_of_range_is_noop() {
        let (_dir, _path, mut adapter) = open_sample(&["one"]);
        assert!(!adapter.replace_page_text(1, "x").unwrap());
        assert!(!adapter.is_modified());
        assert!(adapter.page_text(0).contains("one"));
    }

    #[test]
    fn test_replace_then_save_round_trip() {
        let (dir, _path, mut adapter) = open_sample(&["original"]);
        assert!(adapter.replace_page_text(0, "Hello").unwrap());
        assert!(adapter.is_modified());
        assert!(adapter.page_text(0).contains("Hello"));

        let out = dir.path().join("edited.pdf");
        adapter.save(&out).unwrap();
        assert!(!adapter.is_modified());
        assert_eq!(adapter.path(), Some(out.as_path()));

        let mut reopened = DocumentAdapter::new();
        assert_eq!(reopened.open(&out).unwrap(), 1);
        let text = reopened.page_text(0);
        assert!(text.contains("Hello"));
        assert!(!text.contains("original"));
    }

    #[test]
    fn test_save_without_edits_preserves_page_count() {
        let (dir, _path, mut adapter) = open_sample(&["one", "two", "three"]);
        let out = dir.path().join("copy.pdf");
        adapter.save(&out).unwrap();

        let mut reopened = DocumentAdapter::new();
        assert_eq!(reopened.open(&out).unwrap(), 3);
        assert!(reopened.page_text(2).contains("three"));
    }

    #[test]
    fn test_save_to_unwritable_path_fails() {
        let (dir, _path, mut adapter) = open_sample(&["one"]);
        let err = adapter.save(dir.path().join("missing-dir").join("out.pdf")).unwrap_err();
        assert!(matches!(err, DocumentError::Save { .. }));
        assert!(err.to_string().starts_with("Error saving PDF"));
    }

    #[test]
    fn test_replace_keeps_page_order_and_size() {
        let (_dir, _path, mut adapter) = open_sample(&["one", "two", "three"]);
        let before = adapter.page_size(1);
        adapter.replace_page_text(1, "middle").unwrap();

        assert_eq!(adapter.page_count(), 3);
        assert_eq!(adapter.page_size(1), before);
        assert!(adapter.page_text(0).contains("one"));
        assert!(adapter.page_text(1).contains("middle"));
        assert!(adapter.page_text(2).contains("three"));
    }

    #[test]
    fn test_pixmap_after_replace_uses_fresh_snapshot() {
        let (_dir, _path, mut adapter) = open_sample(&["one"]);
        assert!(adapter.page_pixmap(0, 1.0).is_some());
        adapter.replace_page_text(0, "changed").unwrap();
        assert!(adapter.page_pixmap(0, 1.0).is_some());
    }

    #[test]
    fn test_custom_text_placement() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample_pdf(dir.path(), "sample.pdf", &["one"]).unwrap();
        let placement = TextPlacement { font_size: 20.0, ..TextPlacement::default() };
        let mut adapter = DocumentAdapter::new().with_text_placement(placement);
        adapter.open(&path).unwrap();

        adapter.replace_page_text(0, "Big").unwrap();
        assert!(adapter.page_text(0).contains("Big"));
        assert_eq!(adapter.rasterizer_name(), "outline");
    }
}
