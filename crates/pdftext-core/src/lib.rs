//! Core library for PDFium text extraction.
//!
//! This crate provides:
//! - Runtime resolution of the PDFium text API from a shared library
//! - One-time, process-wide loading with a cached outcome
//! - Per-character code point and bounding box extraction
//! - Page geometry helpers (top-origin quads, rotation mapping)

pub mod bridge;
pub mod config;
pub mod error;
pub mod loader;
pub mod pdfium;
pub mod text;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bridge::TextBridge;
pub use config::LoaderConfig;
pub use error::{LoadError, PageError, PdftextError, Result};
pub use loader::{DynamicSource, LibrarySource, Loader};
pub use pdfium::{CharBox, PageHandle, PdfiumLibrary, TextBackend, TextPageHandle};
pub use text::{ExtractedPage, PageRotation, Point, Quad, Size, TextChar, extract_text, page_rotation};

/// Log target shared by every diagnostic emitted by the bridge.
pub const LOG_TARGET: &str = "PdfiumTextJni";
