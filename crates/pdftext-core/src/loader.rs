//! One-time loading of the text backend.

use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::LOG_TARGET;
use crate::config::LoaderConfig;
use crate::error::LoadError;
use crate::pdfium::{PdfiumLibrary, TextBackend};

/// Something that can produce a ready [`TextBackend`].
///
/// [`Loader`] calls [`LibrarySource::load`] at most once per instance.
pub trait LibrarySource: Send + Sync {
    /// Backend produced on success.
    type Library: TextBackend;

    /// Open the library and resolve everything the backend needs.
    fn load(&self) -> Result<Self::Library, LoadError>;
}

/// Loads PDFium from the shared libraries named in a [`LoaderConfig`].
#[derive(Debug, Clone, Default)]
pub struct DynamicSource {
    config: LoaderConfig,
}

impl DynamicSource {
    /// Create a source for the given library names.
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Library names this source tries.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }
}

impl LibrarySource for DynamicSource {
    type Library = PdfiumLibrary;

    fn load(&self) -> Result<PdfiumLibrary, LoadError> {
        PdfiumLibrary::open(&self.config)
    }
}

/// Lazily loads a backend exactly once and caches the outcome.
///
/// The first caller runs the load; concurrent callers block until it
/// finishes and then see the same result. A failed load is never retried.
pub struct Loader<S: LibrarySource> {
    source: S,
    state: OnceLock<Result<S::Library, LoadError>>,
}

impl<S: LibrarySource> Loader<S> {
    /// Create a loader. Nothing is opened until first use.
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: OnceLock::new(),
        }
    }

    /// Load on first call; afterwards return the cached outcome.
    pub fn ensure_loaded(&self) -> bool {
        self.status().is_ok()
    }

    /// The backend, if loading succeeded.
    pub fn library(&self) -> Option<&S::Library> {
        self.status().ok()
    }

    /// The backend or the error that made loading fail.
    pub fn status(&self) -> Result<&S::Library, &LoadError> {
        self.state
            .get_or_init(|| {
                let result = self.source.load();
                match &result {
                    Ok(_) => debug!(target: LOG_TARGET, "pdfium text backend ready"),
                    Err(e) => warn!(target: LOG_TARGET, "pdfium text backend unavailable: {}", e),
                }
                result
            })
            .as_ref()
    }

    /// Whether a load attempt has already completed.
    pub fn is_initialized(&self) -> bool {
        self.state.get().is_some()
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingSource, FakeLibrary};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn test_loader_is_lazy() {
        let loader = Loader::new(CountingSource::ok(FakeLibrary::new()));
        assert!(!loader.is_initialized());
        assert_eq!(loader.source().attempts(), 0);
    }

    #[test]
    fn test_success_is_cached() {
        let loader = Loader::new(CountingSource::ok(FakeLibrary::new()));
        assert!(loader.ensure_loaded());
        assert!(loader.ensure_loaded());
        assert!(loader.library().is_some());
        assert_eq!(loader.source().attempts(), 1);
    }

    #[test]
    fn test_failure_is_terminal() {
        let loader = Loader::new(CountingSource::<FakeLibrary>::failing(LoadError::MissingSymbols {
            library: "libpdfium.so".to_string(),
            missing: vec!["FPDFText_GetCharBox"],
        }));

        for _ in 0..5 {
            assert!(!loader.ensure_loaded());
        }
        assert!(loader.library().is_none());
        assert!(matches!(loader.status(), Err(LoadError::MissingSymbols { .. })));
        assert_eq!(loader.source().attempts(), 1);
    }

    #[test]
    fn test_concurrent_first_use_loads_once() {
        let loader = Arc::new(Loader::new(CountingSource::ok(FakeLibrary::new()).with_delay_ms(20)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let loader = Arc::clone(&loader);
                std::thread::spawn(move || loader.ensure_loaded())
            })
            .collect();

        let outcomes: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(outcomes.iter().all(|&ok| ok));
        assert_eq!(loader.source().attempts(), 1);
    }

    #[test]
    fn test_dynamic_source_with_missing_library() {
        let loader = Loader::new(DynamicSource::new(LoaderConfig {
            primary_library: "libpdftext-missing-a.so".to_string(),
            fallback_library: "libpdftext-missing-b.so".to_string(),
        }));

        assert!(!loader.ensure_loaded());
        assert!(matches!(loader.status(), Err(LoadError::LibraryNotFound { .. })));
    }
}
