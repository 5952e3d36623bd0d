//! Error types for the pdftext-core library.

use thiserror::Error;

/// Main error type for the pdftext library.
#[derive(Error, Debug)]
pub enum PdftextError {
    /// The PDFium library could not be loaded.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// Text extraction from a page failed.
    #[error("page error: {0}")]
    Page(#[from] PageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while opening the shared library and resolving symbols.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Neither the primary nor the fallback library could be opened.
    #[error("failed to load pdfium shared library (tried {primary}, {fallback}): {reason}")]
    LibraryNotFound {
        primary: String,
        fallback: String,
        reason: String,
    },

    /// The library opened but lacks required exports.
    #[error("missing symbols in {library}: {}", .missing.join(", "))]
    MissingSymbols {
        library: String,
        missing: Vec<&'static str>,
    },
}

/// Errors related to extracting text from a single page.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// `FPDFText_LoadPage` returned null.
    #[error("FPDFText_LoadPage returned null")]
    TextPageUnavailable,

    /// Box values are not exactly four per code point.
    #[error("boxes must contain exactly 4 values per code point (got {boxes} for {code_points})")]
    BoxCountMismatch { code_points: usize, boxes: usize },
}

/// Result type for the pdftext library.
pub type Result<T> = std::result::Result<T, PdftextError>;
