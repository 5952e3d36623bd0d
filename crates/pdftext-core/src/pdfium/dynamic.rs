//! PDFium symbol table resolved from a shared library at runtime.

use std::ffi::{c_int, c_uint, c_void};

use libloading::Library;
use tracing::{debug, error};

use super::{CharBox, PageHandle, TextBackend, TextPageHandle};
use crate::LOG_TARGET;
use crate::config::LoaderConfig;
use crate::error::LoadError;

type FpdfPage = *mut c_void;
type FpdfTextPage = *mut c_void;

type LoadPageFn = unsafe extern "C" fn(page: FpdfPage) -> FpdfTextPage;
type ClosePageFn = unsafe extern "C" fn(text_page: FpdfTextPage);
type CountCharsFn = unsafe extern "C" fn(text_page: FpdfTextPage) -> c_int;
type GetUnicodeFn = unsafe extern "C" fn(text_page: FpdfTextPage, index: c_int) -> c_uint;
type GetCharBoxFn = unsafe extern "C" fn(
    text_page: FpdfTextPage,
    index: c_int,
    left: *mut f64,
    right: *mut f64,
    bottom: *mut f64,
    top: *mut f64,
) -> c_int;
type GetRotationFn = unsafe extern "C" fn(page: FpdfPage) -> c_int;

const LOAD_PAGE: &str = "FPDFText_LoadPage";
const CLOSE_PAGE: &str = "FPDFText_ClosePage";
const COUNT_CHARS: &str = "FPDFText_CountChars";
const GET_UNICODE: &str = "FPDFText_GetUnicode";
const GET_CHAR_BOX: &str = "FPDFText_GetCharBox";
const GET_ROTATION: &str = "FPDFPage_GetRotation";

/// Every export the symbol table needs, in resolution order.
pub const REQUIRED_SYMBOLS: [&str; 6] = [
    LOAD_PAGE,
    CLOSE_PAGE,
    COUNT_CHARS,
    GET_UNICODE,
    GET_CHAR_BOX,
    GET_ROTATION,
];

/// An opened PDFium library with all six text entry points resolved.
///
/// The function pointers stay valid for as long as `_library` is alive,
/// which is the lifetime of this value.
pub struct PdfiumLibrary {
    name: String,
    load_page: LoadPageFn,
    close_page: ClosePageFn,
    count_chars: CountCharsFn,
    get_unicode: GetUnicodeFn,
    get_char_box: GetCharBoxFn,
    get_rotation: GetRotationFn,
    _library: Library,
}

impl std::fmt::Debug for PdfiumLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfiumLibrary").field("name", &self.name).finish_non_exhaustive()
    }
}

impl PdfiumLibrary {
    /// Open the primary library, falling back to the secondary name, and
    /// resolve the symbol table.
    pub fn open(config: &LoaderConfig) -> Result<Self, LoadError> {
        let primary = &config.primary_library;
        let fallback = &config.fallback_library;

        let (library, name) = match open_library(primary) {
            Ok(library) => (library, primary),
            Err(primary_err) => {
                debug!(target: LOG_TARGET, "Could not open {}: {}", primary, primary_err);
                match open_library(fallback) {
                    Ok(library) => (library, fallback),
                    Err(fallback_err) => {
                        error!(target: LOG_TARGET, "Failed to load pdfium shared library");
                        return Err(LoadError::LibraryNotFound {
                            primary: primary.clone(),
                            fallback: fallback.clone(),
                            reason: format!("{primary_err}; {fallback_err}"),
                        });
                    }
                }
            }
        };

        Self::from_library(library, name)
    }

    /// Resolve the symbol table from an already opened library.
    ///
    /// All symbols are looked up before deciding so that every missing one
    /// is reported. On failure the library is closed.
    pub fn from_library(library: Library, name: &str) -> Result<Self, LoadError> {
        let mut missing = Vec::new();

        let load_page = resolve::<LoadPageFn>(&library, LOAD_PAGE, &mut missing);
        let close_page = resolve::<ClosePageFn>(&library, CLOSE_PAGE, &mut missing);
        let count_chars = resolve::<CountCharsFn>(&library, COUNT_CHARS, &mut missing);
        let get_unicode = resolve::<GetUnicodeFn>(&library, GET_UNICODE, &mut missing);
        let get_char_box = resolve::<GetCharBoxFn>(&library, GET_CHAR_BOX, &mut missing);
        let get_rotation = resolve::<GetRotationFn>(&library, GET_ROTATION, &mut missing);

        match (load_page, close_page, count_chars, get_unicode, get_char_box, get_rotation) {
            (
                Some(load_page),
                Some(close_page),
                Some(count_chars),
                Some(get_unicode),
                Some(get_char_box),
                Some(get_rotation),
            ) => {
                debug!(target: LOG_TARGET, "Resolved pdfium text symbols from {}", name);
                Ok(Self {
                    name: name.to_string(),
                    load_page,
                    close_page,
                    count_chars,
                    get_unicode,
                    get_char_box,
                    get_rotation,
                    _library: library,
                })
            }
            _ => {
                drop(library);
                Err(LoadError::MissingSymbols {
                    library: name.to_string(),
                    missing,
                })
            }
        }
    }

    /// Name the library was opened under.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(unix)]
fn open_library(name: &str) -> Result<Library, libloading::Error> {
    use libloading::os::unix::{Library as UnixLibrary, RTLD_LOCAL, RTLD_NOW};

    // SAFETY: opening PDFium only runs its static initialisers, which have
    // no preconditions.
    unsafe { UnixLibrary::open(Some(name), RTLD_NOW | RTLD_LOCAL) }.map(Library::from)
}

#[cfg(not(unix))]
fn open_library(name: &str) -> Result<Library, libloading::Error> {
    // SAFETY: see the unix variant.
    unsafe { Library::new(name) }
}

fn resolve<T: Copy>(library: &Library, name: &'static str, missing: &mut Vec<&'static str>) -> Option<T> {
    // SAFETY: each caller pairs `name` with the function type PDFium
    // declares for it in fpdf_text.h / fpdf_edit.h.
    match unsafe { library.get::<T>(name.as_bytes()) } {
        Ok(symbol) => Some(*symbol),
        Err(e) => {
            error!(target: LOG_TARGET, "Missing symbol {}", name);
            debug!(target: LOG_TARGET, "Lookup of {} failed: {}", name, e);
            missing.push(name);
            None
        }
    }
}

// SAFETY for every call below: the function pointers were resolved from
// `_library`, which outlives `self`. Page handles are vouched for by
// `PageHandle::from_raw`, text-page handles by `TextPageHandle::from_ptr`
// or by having come out of `load_text_page`.
impl TextBackend for PdfiumLibrary {
    fn load_text_page(&self, page: PageHandle) -> Option<TextPageHandle> {
        let text_page = unsafe { (self.load_page)(page.as_ptr()) };
        unsafe { TextPageHandle::from_ptr(text_page) }
    }

    fn close_text_page(&self, text_page: TextPageHandle) {
        unsafe { (self.close_page)(text_page.as_ptr()) }
    }

    fn count_chars(&self, text_page: TextPageHandle) -> i32 {
        unsafe { (self.count_chars)(text_page.as_ptr()) }
    }

    fn char_unicode(&self, text_page: TextPageHandle, index: i32) -> u32 {
        unsafe { (self.get_unicode)(text_page.as_ptr(), index) }
    }

    fn char_box(&self, text_page: TextPageHandle, index: i32) -> Option<CharBox> {
        let mut char_box = CharBox::default();
        let ok = unsafe {
            (self.get_char_box)(
                text_page.as_ptr(),
                index,
                &mut char_box.left,
                &mut char_box.right,
                &mut char_box.bottom,
                &mut char_box.top,
            )
        };
        (ok != 0).then_some(char_box)
    }

    fn page_rotation(&self, page: PageHandle) -> i32 {
        unsafe { (self.get_rotation)(page.as_ptr()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::capture_logs;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_libraries_are_reported() {
        let config = LoaderConfig {
            primary_library: "libpdftext-does-not-exist.so".to_string(),
            fallback_library: "libpdftext-also-missing.so".to_string(),
        };

        match PdfiumLibrary::open(&config) {
            Err(LoadError::LibraryNotFound { primary, fallback, .. }) => {
                assert_eq!(primary, config.primary_library);
                assert_eq!(fallback, config.fallback_library);
            }
            other => panic!("expected LibraryNotFound, got {:?}", other),
        }
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn test_library_without_pdfium_exports_lists_every_symbol() {
        let config = LoaderConfig {
            primary_library: "libpdftext-does-not-exist.so".to_string(),
            fallback_library: "libc.so.6".to_string(),
        };

        match PdfiumLibrary::open(&config) {
            Err(LoadError::MissingSymbols { library, missing }) => {
                assert_eq!(library, "libc.so.6");
                assert_eq!(missing, REQUIRED_SYMBOLS.to_vec());
            }
            other => panic!("expected MissingSymbols, got {:?}", other),
        }
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn test_each_missing_symbol_is_logged_by_name() {
        let config = LoaderConfig {
            primary_library: "libpdftext-does-not-exist.so".to_string(),
            fallback_library: "libc.so.6".to_string(),
        };

        let logs = capture_logs(|| {
            assert!(PdfiumLibrary::open(&config).is_err());
        });

        assert!(logs.contains("Missing symbol FPDFText_LoadPage"));
        for symbol in REQUIRED_SYMBOLS {
            assert_eq!(logs.matches(&format!("Missing symbol {symbol}")).count(), 1, "{symbol}");
        }
        assert!(!logs.contains("Failed to load pdfium shared library"));
    }
}
