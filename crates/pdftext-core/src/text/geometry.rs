//! Page geometry: PDF page space to top-origin device quads.

use serde::Serialize;

use super::{BOX_VALUES_PER_CHAR, ExtractedPage};

/// A point in device space (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Width and height in points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Character quad: top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Quad {
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
    pub p4: Point,
}

impl Quad {
    /// Axis-aligned quad from two corners in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let left = a.x.min(b.x);
        let right = a.x.max(b.x);
        let top = a.y.min(b.y);
        let bottom = a.y.max(b.y);
        Self {
            p1: Point::new(left, top),
            p2: Point::new(right, top),
            p3: Point::new(right, bottom),
            p4: Point::new(left, bottom),
        }
    }

    /// `(left, top, right, bottom)`.
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        (self.p1.x, self.p1.y, self.p3.x, self.p3.y)
    }
}

/// A positioned character ready for selection and search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextChar {
    pub ch: char,
    pub page_index: u32,
    pub quad: Quad,
}

/// Page rotation in clockwise quarter turns, the PDFium convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PageRotation {
    #[default]
    Upright,
    Clockwise90,
    Rotated180,
    Clockwise270,
}

impl PageRotation {
    /// Interpret a raw `FPDFPage_GetRotation` value, clamping into 0..=3.
    pub fn from_raw(raw: i32) -> Self {
        match raw.clamp(0, 3) {
            0 => Self::Upright,
            1 => Self::Clockwise90,
            2 => Self::Rotated180,
            _ => Self::Clockwise270,
        }
    }

    pub fn quarter_turns(self) -> u8 {
        match self {
            Self::Upright => 0,
            Self::Clockwise90 => 1,
            Self::Rotated180 => 2,
            Self::Clockwise270 => 3,
        }
    }

    pub fn degrees(self) -> u16 {
        u16::from(self.quarter_turns()) * 90
    }
}

/// Flip a bottom-origin character box into a top-origin quad.
///
/// Reversed bounds are normalised, so `left > right` or `bottom > top`
/// produce the same quad as the ordered box.
pub fn char_box_to_quad(left: f32, right: f32, bottom: f32, top: f32, page_height: f32) -> Quad {
    Quad::from_corners(
        Point::new(left, page_height - top),
        Point::new(right, page_height - bottom),
    )
}

/// Map a page-space box into a device area of `device` size showing the
/// page under `rotation`, following PDFium's page-to-device transform.
pub fn map_rect_to_device(
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    page: Size,
    device: Size,
    rotation: PageRotation,
) -> Quad {
    let (w, h) = (device.width, device.height);
    // Device positions of the page's bottom-left, top-left and bottom-right.
    let (origin, top_left, bottom_right) = match rotation {
        PageRotation::Upright => ((0.0, h), (0.0, 0.0), (w, h)),
        PageRotation::Clockwise90 => ((0.0, 0.0), (w, 0.0), (0.0, h)),
        PageRotation::Rotated180 => ((w, 0.0), (w, h), (0.0, 0.0)),
        PageRotation::Clockwise270 => ((w, h), (0.0, h), (w, 0.0)),
    };

    let to_device = |x: f32, y: f32| {
        let u = if page.width != 0.0 { x / page.width } else { 0.0 };
        let v = if page.height != 0.0 { y / page.height } else { 0.0 };
        Point::new(
            origin.0 + (bottom_right.0 - origin.0) * u + (top_left.0 - origin.0) * v,
            origin.1 + (bottom_right.1 - origin.1) * u + (top_left.1 - origin.1) * v,
        )
    };

    Quad::from_corners(to_device(left, bottom), to_device(right, top))
}

fn to_char(code_point: i32) -> Option<char> {
    if code_point == 0 {
        return None;
    }
    u32::try_from(code_point).ok().and_then(char::from_u32)
}

impl ExtractedPage {
    /// Positioned characters for an unrotated page of `page_height` points.
    ///
    /// Code points that are not valid Unicode scalar values are skipped.
    pub fn to_text_chars(&self, page_index: u32, page_height: f32) -> Vec<TextChar> {
        self.chars()
            .filter_map(|(code_point, [left, right, bottom, top])| {
                Some(TextChar {
                    ch: to_char(code_point)?,
                    page_index,
                    quad: char_box_to_quad(left, right, bottom, top, page_height),
                })
            })
            .collect()
    }

    /// Positioned characters for a page displayed under `rotation`, mapped
    /// into a device area the size of the page.
    pub fn to_text_chars_rotated(
        &self,
        page_index: u32,
        page: Size,
        rotation: PageRotation,
    ) -> Vec<TextChar> {
        if rotation == PageRotation::Upright {
            return self.to_text_chars(page_index, page.height);
        }
        let mut chars = Vec::with_capacity(self.boxes().len() / BOX_VALUES_PER_CHAR);
        for (code_point, [left, right, bottom, top]) in self.chars() {
            let Some(ch) = to_char(code_point) else {
                continue;
            };
            chars.push(TextChar {
                ch,
                page_index,
                quad: map_rect_to_device(left, right, bottom, top, page, page, rotation),
            });
        }
        chars
    }
}
