//! Scripted backends for tests.
//!
//! Enabled under `cfg(test)` and through the `testing` feature so that
//! downstream crates can drive [`TextBridge`](crate::TextBridge) without a
//! real PDFium build.

use std::ffi::c_void;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::LoadError;
use crate::loader::LibrarySource;
use crate::pdfium::{CharBox, PageHandle, TextBackend, TextPageHandle};

const FAKE_TEXT_PAGE: usize = 0x7e47;

/// In-memory page used by [`FakeLibrary`]: one entry per character index.
#[derive(Debug, Default)]
pub struct FakeLibrary {
    chars: Vec<(u32, Option<CharBox>)>,
    char_count: Option<i32>,
    rotation: i32,
    text_page_fails: bool,
    calls: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl FakeLibrary {
    /// An empty page with rotation 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a character with the given code point and box.
    pub fn with_char(mut self, code_point: u32, char_box: Option<CharBox>) -> Self {
        self.chars.push((code_point, char_box));
        self
    }

    /// Report this count from `count_chars` instead of the scripted length.
    pub fn with_char_count(mut self, count: i32) -> Self {
        self.char_count = Some(count);
        self
    }

    /// Rotation reported by `page_rotation`.
    pub fn with_rotation(mut self, rotation: i32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Make `load_text_page` return null.
    pub fn with_text_page_failure(mut self) -> Self {
        self.text_page_fails = true;
        self
    }

    /// Total number of backend calls of any kind.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Text-page views handed out.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Text-page views released.
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn entry(&self, index: i32) -> Option<&(u32, Option<CharBox>)> {
        usize::try_from(index).ok().and_then(|i| self.chars.get(i))
    }
}

impl TextBackend for FakeLibrary {
    fn load_text_page(&self, _page: PageHandle) -> Option<TextPageHandle> {
        self.record();
        if self.text_page_fails {
            return None;
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        // SAFETY: the fake never dereferences its text-page handles.
        unsafe { TextPageHandle::from_ptr(FAKE_TEXT_PAGE as *mut c_void) }
    }

    fn close_text_page(&self, text_page: TextPageHandle) {
        self.record();
        assert_eq!(text_page.as_ptr() as usize, FAKE_TEXT_PAGE);
        self.closed.fetch_add(1, Ordering::SeqCst);
    }

    fn count_chars(&self, _text_page: TextPageHandle) -> i32 {
        self.record();
        self.char_count.unwrap_or(self.chars.len() as i32)
    }

    fn char_unicode(&self, _text_page: TextPageHandle, index: i32) -> u32 {
        self.record();
        self.entry(index).map(|(code_point, _)| *code_point).unwrap_or(0)
    }

    fn char_box(&self, _text_page: TextPageHandle, index: i32) -> Option<CharBox> {
        self.record();
        self.entry(index).and_then(|(_, char_box)| *char_box)
    }

    fn page_rotation(&self, _page: PageHandle) -> i32 {
        self.record();
        self.rotation
    }
}

/// A [`LibrarySource`] that hands out a prepared outcome and counts attempts.
pub struct CountingSource<L> {
    outcome: Mutex<Option<Result<L, LoadError>>>,
    attempts: AtomicUsize,
    delay: Duration,
}

impl<L: TextBackend> CountingSource<L> {
    /// Source whose first load succeeds with `library`.
    pub fn ok(library: L) -> Self {
        Self::with_outcome(Ok(library))
    }

    /// Source whose first load fails with `error`.
    pub fn failing(error: LoadError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<L, LoadError>) -> Self {
        Self {
            outcome: Mutex::new(Some(outcome)),
            attempts: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    /// Sleep inside `load` to widen race windows.
    pub fn with_delay_ms(mut self, millis: u64) -> Self {
        self.delay = Duration::from_millis(millis);
        self
    }

    /// Number of times `load` ran.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl<L: TextBackend> LibrarySource for CountingSource<L> {
    type Library = L;

    fn load(&self) -> Result<L, LoadError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.outcome
            .lock()
            .ok()
            .and_then(|mut outcome| outcome.take())
            .unwrap_or_else(|| {
                Err(LoadError::LibraryNotFound {
                    primary: "fake".to_string(),
                    fallback: "fake".to_string(),
                    reason: "outcome already consumed".to_string(),
                })
            })
    }
}

/// A fake page handle. Only meaningful with fake backends.
pub fn fake_page() -> PageHandle {
    // SAFETY: fake backends never dereference page handles.
    unsafe { PageHandle::from_raw(0x1000) }.expect("non-zero handle")
}

/// Run `f` under a scoped fmt subscriber and return everything it logged.
#[cfg(test)]
pub(crate) fn capture_logs<F: FnOnce()>(f: F) -> String {
    use std::io::Write;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if let Ok(mut bytes) = self.0.lock() {
                bytes.extend_from_slice(buf);
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let buffer = Buffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.0.lock().map(|b| b.clone()).unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}
