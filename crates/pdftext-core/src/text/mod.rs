//! Character extraction and the extracted-page model.

mod geometry;

pub use geometry::{PageRotation, Point, Quad, Size, TextChar, char_box_to_quad, map_rect_to_device};

use serde::Serialize;
use tracing::trace;

use crate::LOG_TARGET;
use crate::error::PageError;
use crate::pdfium::{CharBox, PageHandle, TextBackend, TextPageHandle};

/// Box values stored per accepted character: left, right, bottom, top.
pub const BOX_VALUES_PER_CHAR: usize = 4;

/// Code points and boxes of the characters accepted from one page.
///
/// `boxes` always holds exactly [`BOX_VALUES_PER_CHAR`] values per code
/// point, in character index order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ExtractedPage {
    code_points: Vec<i32>,
    boxes: Vec<f32>,
}

impl ExtractedPage {
    /// Build from parallel arrays, checking the four-values-per-char layout.
    pub fn new(code_points: Vec<i32>, boxes: Vec<f32>) -> Result<Self, PageError> {
        if boxes.len() != code_points.len() * BOX_VALUES_PER_CHAR {
            return Err(PageError::BoxCountMismatch {
                code_points: code_points.len(),
                boxes: boxes.len(),
            });
        }
        Ok(Self { code_points, boxes })
    }

    /// An empty page with room for `chars` characters.
    pub fn with_capacity(chars: usize) -> Self {
        Self {
            code_points: Vec::with_capacity(chars),
            boxes: Vec::with_capacity(chars * BOX_VALUES_PER_CHAR),
        }
    }

    /// Append one character. The code point is narrowed to `i32` and the
    /// box to single precision; no other conversion happens.
    pub fn push(&mut self, code_point: u32, char_box: CharBox) {
        self.code_points.push(code_point as i32);
        self.boxes.extend_from_slice(&[
            char_box.left as f32,
            char_box.right as f32,
            char_box.bottom as f32,
            char_box.top as f32,
        ]);
    }

    pub fn code_points(&self) -> &[i32] {
        &self.code_points
    }

    pub fn boxes(&self) -> &[f32] {
        &self.boxes
    }

    /// Number of accepted characters.
    pub fn len(&self) -> usize {
        self.code_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code_points.is_empty()
    }

    /// Each code point with its `[left, right, bottom, top]` box.
    pub fn chars(&self) -> impl Iterator<Item = (i32, [f32; 4])> + '_ {
        self.code_points
            .iter()
            .zip(self.boxes.chunks_exact(BOX_VALUES_PER_CHAR))
            .map(|(&code_point, b)| (code_point, [b[0], b[1], b[2], b[3]]))
    }

    /// Split into `(code_points, boxes)`.
    pub fn into_parts(self) -> (Vec<i32>, Vec<f32>) {
        (self.code_points, self.boxes)
    }
}

/// Closes the text-page view when dropped.
struct TextPageGuard<'a, B: TextBackend + ?Sized> {
    backend: &'a B,
    handle: TextPageHandle,
}

impl<'a, B: TextBackend + ?Sized> TextPageGuard<'a, B> {
    fn open(backend: &'a B, page: PageHandle) -> Option<Self> {
        backend
            .load_text_page(page)
            .map(|handle| Self { backend, handle })
    }
}

impl<B: TextBackend + ?Sized> Drop for TextPageGuard<'_, B> {
    fn drop(&mut self) {
        self.backend.close_text_page(self.handle);
    }
}

/// Extract every character of `page` that has a non-zero code point and a
/// valid box.
///
/// Characters failing either check are dropped entirely. The text-page
/// view is released before returning on every path.
pub fn extract_text<B: TextBackend + ?Sized>(
    backend: &B,
    page: PageHandle,
) -> Result<ExtractedPage, PageError> {
    let text_page = TextPageGuard::open(backend, page).ok_or(PageError::TextPageUnavailable)?;
    let handle = text_page.handle;

    let char_count = backend.count_chars(handle);
    let mut extracted = ExtractedPage::with_capacity(usize::try_from(char_count).unwrap_or(0));

    for index in 0..char_count {
        let code_point = backend.char_unicode(handle, index);
        if code_point == 0 {
            continue;
        }
        let Some(char_box) = backend.char_box(handle, index) else {
            continue;
        };
        extracted.push(code_point, char_box);
    }

    trace!(
        target: LOG_TARGET,
        "Extracted {} of {} characters",
        extracted.len(),
        char_count
    );
    Ok(extracted)
}

/// Rotation of `page` exactly as the backend reports it.
pub fn page_rotation<B: TextBackend + ?Sized>(backend: &B, page: PageHandle) -> i32 {
    backend.page_rotation(page)
}
