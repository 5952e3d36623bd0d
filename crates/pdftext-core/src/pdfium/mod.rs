//! Capability interface over the subset of the PDFium text API used here.

mod dynamic;

pub use dynamic::{PdfiumLibrary, REQUIRED_SYMBOLS};

use std::ffi::c_void;
use std::ptr::NonNull;

/// Opaque `FPDF_PAGE` owned by the caller.
///
/// The bridge never creates or destroys pages; a raw value of zero is
/// "absent" and cannot be turned into a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHandle(NonNull<c_void>);

impl PageHandle {
    /// Wrap a raw page pointer received across the FFI boundary.
    ///
    /// Returns `None` for zero.
    ///
    /// # Safety
    /// A non-zero `raw` must be a live `FPDF_PAGE` for as long as the handle
    /// is used with a real [`TextBackend`].
    pub unsafe fn from_raw(raw: i64) -> Option<Self> {
        NonNull::new(raw as usize as *mut c_void).map(Self)
    }

    /// The raw pointer.
    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// Opaque `FPDF_TEXTPAGE` view issued by [`TextBackend::load_text_page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPageHandle(NonNull<c_void>);

impl TextPageHandle {
    /// Wrap a text-page pointer. Returns `None` for null.
    ///
    /// # Safety
    /// A non-null `ptr` must have been returned by the backend it will be
    /// passed back to, and must not have been closed yet.
    pub unsafe fn from_ptr(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    /// The raw pointer.
    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// Character bounding box in PDF page space (bottom-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CharBox {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl CharBox {
    pub fn new(left: f64, right: f64, bottom: f64, top: f64) -> Self {
        Self { left, right, bottom, top }
    }
}

/// The six PDFium operations the extractor depends on.
///
/// [`PdfiumLibrary`] implements this over symbols resolved at runtime;
/// tests substitute a scripted implementation.
pub trait TextBackend: Send + Sync {
    /// `FPDFText_LoadPage`. `None` when the library returns null.
    fn load_text_page(&self, page: PageHandle) -> Option<TextPageHandle>;

    /// `FPDFText_ClosePage`.
    fn close_text_page(&self, text_page: TextPageHandle);

    /// `FPDFText_CountChars`. May be negative on library error.
    fn count_chars(&self, text_page: TextPageHandle) -> i32;

    /// `FPDFText_GetUnicode`. Zero means no code point.
    fn char_unicode(&self, text_page: TextPageHandle, index: i32) -> u32;

    /// `FPDFText_GetCharBox`. `None` when the library reports the box invalid.
    fn char_box(&self, text_page: TextPageHandle, index: i32) -> Option<CharBox>;

    /// `FPDFPage_GetRotation`, passed through unmodified.
    fn page_rotation(&self, page: PageHandle) -> i32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_page_is_absent() {
        assert!(unsafe { PageHandle::from_raw(0) }.is_none());
    }

    #[test]
    fn test_page_handle_keeps_address() {
        let page = unsafe { PageHandle::from_raw(0x1000) }.unwrap();
        assert_eq!(page.as_ptr() as usize, 0x1000);
    }

    #[test]
    fn test_null_text_page_is_absent() {
        assert!(unsafe { TextPageHandle::from_ptr(std::ptr::null_mut()) }.is_none());
    }
}
