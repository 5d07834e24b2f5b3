//! Error types for document operations

use std::path::PathBuf;

/// Errors raised by the document adapter.
///
/// Only opening, saving and rewriting a page can fail loudly. Reads against a
/// missing document or an out-of-range page degrade to empty results instead.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The file could not be read from disk
    #[error("Error reading PDF {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The bytes are not a PDF lopdf can parse
    #[error("Error reading PDF {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: lopdf::Error,
    },

    /// The document parsed but has an empty page tree
    #[error("Error reading PDF {}: document has no pages", .path.display())]
    Empty { path: PathBuf },

    /// An operation that needs an open document was called without one
    #[error("no document is open")]
    NoDocument,

    /// Serializing the document to disk failed
    #[error("Error saving PDF {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        source: lopdf::Error,
    },

    /// The page's content stream could not be decoded or re-encoded
    #[error("failed to rewrite page {}: {source}", .page + 1)]
    Rewrite { page: usize, source: lopdf::Error },
}

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;
