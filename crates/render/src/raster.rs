//! Page rasterization backends
//!
//! Turns a page of a serialized PDF into an RGBA bitmap. PDFium does the real
//! work when its shared library can be bound; otherwise an outline renderer
//! draws a blank page of the right size so the editor stays usable.

use image::{ImageBuffer, Rgba};
use pdfium_render::prelude::*;
use tracing::{debug, info, warn};

/// RGBA bitmap produced by a rasterizer
pub type RgbaImage = ImageBuffer<Rgba<u8>, Vec<u8>>;

/// Background colour of a rendered page
const PAGE_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Border colour drawn by the outline renderer
const PAGE_BORDER: Rgba<u8> = Rgba([220, 220, 220, 255]);

/// Longest bitmap side either backend will produce.
///
/// Matches the default texture limit of egui's wgpu renderer.
pub const MAX_PIXEL_SIDE: u32 = 8192;

/// Errors that can occur while rasterizing a page
#[derive(Debug)]
pub enum RasterError {
    /// Failed to bind the PDFium library
    Initialization(String),

    /// PDFium could not load the document bytes
    Load(String),

    /// Page index is not part of the document
    InvalidPageIndex(u16),

    /// Rendering failed
    Render(String),

    /// The requested bitmap exceeds the pixel limit
    TooLarge { width: u32, height: u32, max_side: u32 },
}

impl std::fmt::Display for RasterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RasterError::Initialization(msg) => write!(f, "PDFium initialization error: {}", msg),
            RasterError::Load(msg) => write!(f, "PDF load error: {}", msg),
            RasterError::InvalidPageIndex(idx) => write!(f, "Invalid page index: {}", idx),
            RasterError::Render(msg) => write!(f, "PDF render error: {}", msg),
            RasterError::TooLarge { width, height, max_side } => write!(
                f,
                "Page bitmap of {}x{} pixels exceeds the {} pixel limit",
                width, height, max_side
            ),
        }
    }
}

impl std::error::Error for RasterError {}

/// Result type for rasterization
pub type RasterResult<T> = Result<T, RasterError>;

/// Page dimensions in points (1/72 inch)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    pub width: f32,
    pub height: f32,
}

impl PageDimensions {
    /// Pixel size of the page at `scale` pixels per point, never below 1x1
    pub fn scaled_pixels(&self, scale: f32) -> (u32, u32) {
        let scale = effective_scale(scale);
        let width = (self.width * scale).round().max(1.0) as u32;
        let height = (self.height * scale).round().max(1.0) as u32;
        (width, height)
    }

    /// Pixel size at `scale`, or an error if either side exceeds `max_side`
    pub fn checked_pixels(&self, scale: f32, max_side: u32) -> RasterResult<(u32, u32)> {
        let (width, height) = self.scaled_pixels(scale);
        if width > max_side || height > max_side {
            return Err(RasterError::TooLarge { width, height, max_side });
        }
        Ok((width, height))
    }

    /// Largest scale at which neither side exceeds `max_side` pixels
    pub fn max_scale(&self, max_side: u32) -> f32 {
        let longest = self.width.max(self.height);
        if longest > 0.0 && longest.is_finite() {
            // Rounding in scaled_pixels can add up to half a pixel
            (max_side as f32 - 0.5).max(1.0) / longest
        } else {
            1.0
        }
    }
}

/// Non-positive or non-finite scales fall back to 1.0
pub fn effective_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

/// Renders one page of a serialized PDF to a bitmap
pub trait PageRasterizer {
    /// Short backend name for logs and diagnostics
    fn name(&self) -> &'static str;

    /// Rasterize `page_index` of `pdf` at `scale` pixels per point.
    ///
    /// `page` carries the page size as the caller's document model sees it;
    /// backends that parse the bytes themselves may prefer their own reading.
    fn rasterize(
        &self,
        pdf: &[u8],
        page_index: u16,
        page: PageDimensions,
        scale: f32,
    ) -> RasterResult<RgbaImage>;
}

/// Rasterizer backed by the PDFium shared library
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
}

impl PdfiumRasterizer {
    /// Bind PDFium
    ///
    /// Search order:
    /// 1. Executable's directory (for app bundles)
    /// 2. Current working directory
    /// 3. System library paths
    pub fn bind() -> RasterResult<Self> {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()));

        if let Some(ref dir) = exe_dir {
            if let Ok(bindings) =
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            {
                info!(dir = %dir.display(), "bound PDFium next to executable");
                return Ok(Self { pdfium: Pdfium::new(bindings) });
            }
        }

        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| RasterError::Initialization(e.to_string()))?;

        info!("bound PDFium");
        Ok(Self { pdfium: Pdfium::new(bindings) })
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn name(&self) -> &'static str {
        "pdfium"
    }

    fn rasterize(
        &self,
        pdf: &[u8],
        page_index: u16,
        _page: PageDimensions,
        scale: f32,
    ) -> RasterResult<RgbaImage> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| RasterError::Load(e.to_string()))?;

        let page = document
            .pages()
            .get(page_index)
            .map_err(|_| RasterError::InvalidPageIndex(page_index))?;

        // PDFium's own page box wins over the caller's: it accounts for /Rotate.
        let dimensions = PageDimensions { width: page.width().value, height: page.height().value };
        let (width, height) = dimensions.checked_pixels(scale, MAX_PIXEL_SIDE)?;

        let config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_target_height(height as i32);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| RasterError::Render(e.to_string()))?;

        debug!(page_index, width, height, "rendered page with PDFium");

        RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes().to_vec()).ok_or_else(|| {
            RasterError::Render(format!("bitmap does not match {}x{} pixels", width, height))
        })
    }
}

/// Fallback renderer that draws an empty page with a thin border
#[derive(Debug, Default, Clone, Copy)]
pub struct OutlineRasterizer;

impl PageRasterizer for OutlineRasterizer {
    fn name(&self) -> &'static str {
        "outline"
    }

    fn rasterize(
        &self,
        _pdf: &[u8],
        _page_index: u16,
        page: PageDimensions,
        scale: f32,
    ) -> RasterResult<RgbaImage> {
        let (width, height) = page.checked_pixels(scale, MAX_PIXEL_SIDE)?;
        let mut image = RgbaImage::from_pixel(width, height, PAGE_FILL);

        if width >= 4 && height >= 4 {
            for x in 0..width {
                image.put_pixel(x, 0, PAGE_BORDER);
                image.put_pixel(x, height - 1, PAGE_BORDER);
            }
            for y in 0..height {
                image.put_pixel(0, y, PAGE_BORDER);
                image.put_pixel(width - 1, y, PAGE_BORDER);
            }
        }

        Ok(image)
    }
}

/// PDFium when it can be bound, the outline renderer otherwise
pub fn default_rasterizer() -> Box<dyn PageRasterizer> {
    match PdfiumRasterizer::bind() {
        Ok(rasterizer) => Box::new(rasterizer),
        Err(e) => {
            warn!(error = %e, "PDFium unavailable, page previews will be outlines only");
            Box::new(OutlineRasterizer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_error_display() {
        let err = RasterError::InvalidPageIndex(5);
        assert_eq!(err.to_string(), "Invalid page index: 5");

        let err = RasterError::Initialization("library not found".to_string());
        assert!(err.to_string().starts_with("PDFium initialization error"));
        assert!(err.to_string().contains("library not found"));
    }

    #[test]
    fn test_effective_scale_rejects_bad_values() {
        assert_eq!(effective_scale(2.0), 2.0);
        assert_eq!(effective_scale(0.0), 1.0);
        assert_eq!(effective_scale(-3.0), 1.0);
        assert_eq!(effective_scale(f32::NAN), 1.0);
        assert_eq!(effective_scale(f32::INFINITY), 1.0);
    }

    #[test]
    fn test_scaled_pixels_rounds_and_clamps() {
        let letter = PageDimensions { width: 612.0, height: 792.0 };
        assert_eq!(letter.scaled_pixels(2.0), (1224, 1584));
        assert_eq!(letter.scaled_pixels(1.0), (612, 792));

        let tiny = PageDimensions { width: 0.2, height: 0.2 };
        assert_eq!(tiny.scaled_pixels(1.0), (1, 1));
    }

    #[test]
    fn test_outline_rasterizer_size_and_border() {
        let page = PageDimensions { width: 100.0, height: 50.0 };
        let image = OutlineRasterizer.rasterize(&[], 0, page, 2.0).unwrap();

        assert_eq!(image.dimensions(), (200, 100));
        assert_eq!(*image.get_pixel(0, 0), PAGE_BORDER);
        assert_eq!(*image.get_pixel(199, 99), PAGE_BORDER);
        assert_eq!(*image.get_pixel(100, 50), PAGE_FILL);
    }

    #[test]
    fn test_outline_rasterizer_tiny_page_has_no_border() {
        let page = PageDimensions { width: 3.0, height: 3.0 };
        let image = OutlineRasterizer.rasterize(&[], 0, page, 1.0).unwrap();

        assert_eq!(image.dimensions(), (3, 3));
        assert!(image.pixels().all(|p| *p == PAGE_FILL));
    }

    #[test]
    fn test_outline_rasterizer_rejects_oversized_bitmap() {
        let page = PageDimensions { width: 612.0, height: 792.0 };
        let err = OutlineRasterizer.rasterize(&[], 0, page, 1000.0).unwrap_err();

        assert!(matches!(err, RasterError::TooLarge { width: 612000, height: 792000, .. }));
        assert!(err.to_string().contains("8192 pixel limit"));
    }

    #[test]
    fn test_checked_pixels_at_limit() {
        let page = PageDimensions { width: 100.0, height: 50.0 };
        assert_eq!(page.checked_pixels(81.92, MAX_PIXEL_SIDE).unwrap(), (8192, 4096));
        assert!(page.checked_pixels(82.0, MAX_PIXEL_SIDE).is_err());
    }

    #[test]
    fn test_max_scale_keeps_longest_side_within_limit() {
        let a4 = PageDimensions { width: 595.28, height: 841.89 };
        let legal = PageDimensions { width: 612.0, height: 1008.0 };

        for page in [a4, legal] {
            for max_side in [2048, 8192] {
                let scale = page.max_scale(max_side);
                let (width, height) = page.scaled_pixels(scale);
                assert!(width.max(height) <= max_side, "{:?} at {}", page, max_side);
                assert!(width.max(height) >= max_side - 2);
            }
        }
    }

    #[test]
    fn test_pdfium_library_name_generation() {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()));

        if let Some(dir) = exe_dir {
            let lib_path = Pdfium::pdfium_platform_library_name_at_path(&dir);
            let lib_name = lib_path.to_string_lossy();

            #[cfg(target_os = "linux")]
            assert!(
                lib_name.ends_with(".so"),
                "Expected .so extension on Linux, got: {}",
                lib_name
            );

            assert!(
                lib_name.to_lowercase().contains("pdfium"),
                "Library name should contain 'pdfium', got: {}",
                lib_name
            );
        }
    }
}
