//! The two inbound operations: page text and page rotation.

use tracing::error;

use crate::LOG_TARGET;
use crate::loader::{LibrarySource, Loader};
use crate::pdfium::PageHandle;
use crate::text::{self, ExtractedPage};

/// Rotation reported when the page or the library is unavailable.
pub const DEFAULT_ROTATION: i32 = 0;

/// Page text and rotation over a lazily loaded backend.
///
/// Nothing here returns an error: every failure degrades to `None` or
/// [`DEFAULT_ROTATION`] after being logged.
pub struct TextBridge<S: LibrarySource> {
    loader: Loader<S>,
}

impl<S: LibrarySource> TextBridge<S> {
    pub fn new(source: S) -> Self {
        Self {
            loader: Loader::new(source),
        }
    }

    pub fn loader(&self) -> &Loader<S> {
        &self.loader
    }

    /// Extract the accepted characters of the page at `page_ptr`.
    ///
    /// Returns `None` for a zero pointer (without loading anything), when
    /// the library is unavailable, or when no text page could be opened.
    /// A valid page without qualifying characters yields an empty page.
    ///
    /// # Safety
    /// A non-zero `page_ptr` must be a live `FPDF_PAGE` from the same PDFium
    /// instance the loader opens.
    pub unsafe fn extract_page_text(&self, page_ptr: i64) -> Option<ExtractedPage> {
        // SAFETY: forwarded from the caller.
        let page = unsafe { PageHandle::from_raw(page_ptr) }?;
        let backend = self.loader.library()?;

        match text::extract_text(backend, page) {
            Ok(extracted) => Some(extracted),
            Err(e) => {
                error!(target: LOG_TARGET, "{}", e);
                None
            }
        }
    }

    /// Rotation of the page at `page_ptr`, or [`DEFAULT_ROTATION`].
    ///
    /// # Safety
    /// Same contract as [`TextBridge::extract_page_text`].
    pub unsafe fn page_rotation(&self, page_ptr: i64) -> i32 {
        // SAFETY: forwarded from the caller.
        let Some(page) = (unsafe { PageHandle::from_raw(page_ptr) }) else {
            return DEFAULT_ROTATION;
        };
        match self.loader.library() {
            Some(backend) => text::page_rotation(backend, page),
            None => DEFAULT_ROTATION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::pdfium::CharBox;
    use crate::config::LoaderConfig;
    use crate::loader::DynamicSource;
    use crate::testing::{CountingSource, FakeLibrary, capture_logs};
    use pretty_assertions::assert_eq;

    const PAGE: i64 = 0x1000;

    fn bridge(library: FakeLibrary) -> TextBridge<CountingSource<FakeLibrary>> {
        TextBridge::new(CountingSource::ok(library))
    }

    fn unavailable() -> TextBridge<CountingSource<FakeLibrary>> {
        TextBridge::new(CountingSource::failing(LoadError::LibraryNotFound {
            primary: "libpdfium.so".to_string(),
            fallback: "libjniPdfium.so".to_string(),
            reason: "not found".to_string(),
        }))
    }

    #[test]
    fn test_zero_handle_never_touches_the_loader() {
        let bridge = bridge(FakeLibrary::new().with_rotation(1));

        assert_eq!(unsafe { bridge.extract_page_text(0) }, None);
        assert_eq!(unsafe { bridge.page_rotation(0) }, 0);
        assert!(!bridge.loader().is_initialized());
        assert_eq!(bridge.loader().source().attempts(), 0);
    }

    #[test]
    fn test_unavailable_library_degrades_and_loads_once() {
        let bridge = unavailable();

        for _ in 0..3 {
            assert_eq!(unsafe { bridge.extract_page_text(PAGE) }, None);
            assert_eq!(unsafe { bridge.page_rotation(PAGE) }, 0);
        }
        assert_eq!(bridge.loader().source().attempts(), 1);
    }

    #[test]
    fn test_extracts_and_skips_zero_code_point() {
        let b = Some(CharBox::new(1.0, 2.0, 3.0, 4.0));
        let bridge = bridge(
            FakeLibrary::new()
                .with_char(65, b)
                .with_char(0, b)
                .with_char(66, Some(CharBox::new(5.0, 6.0, 7.0, 8.0))),
        );

        let page = unsafe { bridge.extract_page_text(PAGE) }.unwrap();

        assert_eq!(page.code_points(), &[65, 66]);
        assert_eq!(page.boxes(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(bridge.loader().library().unwrap().closed(), 1);
    }

    #[test]
    fn test_empty_page_is_not_absent() {
        let bridge = bridge(FakeLibrary::new());

        let page = unsafe { bridge.extract_page_text(PAGE) };

        assert_eq!(page, Some(ExtractedPage::default()));
    }

    #[test]
    fn test_null_text_page_is_absent() {
        let bridge = bridge(FakeLibrary::new().with_text_page_failure());

        assert_eq!(unsafe { bridge.extract_page_text(PAGE) }, None);
        assert_eq!(bridge.loader().library().unwrap().closed(), 0);
    }

    #[test]
    fn test_rotation_is_reported_raw() {
        let bridge = bridge(FakeLibrary::new().with_rotation(90));

        assert_eq!(unsafe { bridge.page_rotation(PAGE) }, 90);
    }

    #[test]
    fn test_each_extraction_releases_its_text_page() {
        let bridge = bridge(FakeLibrary::new().with_char(65, Some(CharBox::default())));

        for _ in 0..4 {
            unsafe { bridge.extract_page_text(PAGE) };
        }

        let library = bridge.loader().library().unwrap();
        assert_eq!(library.opened(), 4);
        assert_eq!(library.closed(), 4);
    }

    #[test]
    fn test_missing_library_is_logged_once_across_calls() {
        let bridge = TextBridge::new(DynamicSource::new(LoaderConfig {
            primary_library: "libpdftext-missing-primary.so".to_string(),
            fallback_library: "libpdftext-missing-fallback.so".to_string(),
        }));

        let logs = capture_logs(|| {
            for _ in 0..5 {
                assert_eq!(unsafe { bridge.extract_page_text(PAGE) }, None);
                assert_eq!(unsafe { bridge.page_rotation(PAGE) }, 0);
            }
        });

        assert_eq!(logs.matches("Failed to load pdfium shared library").count(), 1);
        assert!(logs.contains(crate::LOG_TARGET));
    }

    #[test]
    fn test_null_text_page_is_logged() {
        let bridge = bridge(FakeLibrary::new().with_text_page_failure());

        let logs = capture_logs(|| {
            assert_eq!(unsafe { bridge.extract_page_text(PAGE) }, None);
        });

        assert!(logs.contains("FPDFText_LoadPage returned null"));
    }

    #[test]
    fn test_zero_handle_is_silent() {
        let bridge = bridge(FakeLibrary::new());

        let logs = capture_logs(|| {
            unsafe { bridge.extract_page_text(0) };
            unsafe { bridge.page_rotation(0) };
        });

        assert!(logs.is_empty());
    }
}
