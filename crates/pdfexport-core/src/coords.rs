//! Coordinate transformation between surface space (top-left origin) and PDF
//! page space (bottom-left origin, points)

use annotation_types::{Bounds, Point};
use lopdf::{Document, Object, ObjectId};

/// Rectangle in PDF page space, `(x, y)` being the bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Geometry of one page as seen from the editing surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    /// `[x0, y0, x1, y1]`
    pub media_box: [f64; 4],
    /// Surface units per page unit
    pub scale: f64,
}

impl PageFrame {
    pub fn new(media_box: [f64; 4], scale: f64) -> Self {
        Self { media_box, scale }
    }

    /// Frame of a page, honoring a `MediaBox` inherited from the page tree
    pub fn for_page(doc: &Document, page_id: ObjectId, scale: f64) -> Self {
        let media_box = inherited(doc, page_id, b"MediaBox")
            .and_then(|obj| obj.as_array().ok().cloned())
            .and_then(|arr| {
                let nums: Vec<f64> = arr
                    .iter()
                    .filter_map(|v| v.as_float().ok().map(f64::from))
                    .collect();
                (nums.len() == 4).then(|| [nums[0], nums[1], nums[2], nums[3]])
            })
            .unwrap_or([0.0, 0.0, 612.0, 792.0]); // US Letter
        Self::new(media_box, scale)
    }

    pub fn width(&self) -> f64 {
        self.media_box[2] - self.media_box[0]
    }

    pub fn height(&self) -> f64 {
        self.media_box[3] - self.media_box[1]
    }

    pub fn to_pdf_point(&self, p: Point) -> (f64, f64) {
        let [x0, y0, ..] = self.media_box;
        (x0 + p.x / self.scale, y0 + self.height() - p.y / self.scale)
    }

    /// Surface box to page rect: `y = height - top - box height`
    pub fn to_pdf_rect(&self, b: Bounds) -> PdfRect {
        let [x0, y0, ..] = self.media_box;
        PdfRect {
            x: x0 + b.left / self.scale,
            y: y0 + self.height() - (b.top + b.height) / self.scale,
            width: b.width / self.scale,
            height: b.height / self.scale,
        }
    }

    /// Page rect back to surface coordinates
    pub fn to_surface_bounds(&self, r: PdfRect) -> Bounds {
        let [x0, y0, ..] = self.media_box;
        Bounds::new(
            (r.x - x0) * self.scale,
            (y0 + self.height() - (r.y + r.height)) * self.scale,
            r.width * self.scale,
            r.height * self.scale,
        )
    }

    /// Surface length (stroke width, radius) to page units
    pub fn to_pdf_len(&self, len: f64) -> f64 {
        len / self.scale
    }
}

/// Look up an inheritable page attribute, walking up `Parent` links
pub(crate) fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    // Bounded walk; malformed trees can contain cycles
    for _ in 0..32 {
        if let Ok(value) = current.get(key) {
            return match value {
                Object::Reference(id) => doc.get_object(*id).ok(),
                other => Some(other),
            };
        }
        let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}
