//! PDF Editor Core Library
//!
//! Document adapter and page rewriting for the PDF editor.

pub mod config;
pub mod document;
pub mod error;
pub mod page_rewrite;
pub mod page_tree;

#[cfg(any(test, feature = "test-support"))]
pub mod fixtures;

pub use config::{ConfigError, EditorConfig, EditorPaneConfig, PreviewConfig};
pub use document::{DocumentAdapter, DEFAULT_PREVIEW_SCALE};
pub use error::{DocumentError, DocumentResult};
pub use page_rewrite::TextPlacement;
pub use page_tree::PageBox;
