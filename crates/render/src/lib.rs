//! PDF Editor Render Library
//!
//! Page rasterization for the editor's preview pane.

pub mod raster;

pub use raster::{
    default_rasterizer, effective_scale, OutlineRasterizer, PageDimensions, PageRasterizer,
    PdfiumRasterizer, RasterError, RasterResult, RgbaImage, MAX_PIXEL_SIDE,
};
