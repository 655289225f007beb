//! PDF document access for the canvas viewer.
//!
//! The viewer only needs three things from a document: how many pages it has,
//! each page's native size in points, and a way to paint a page onto a canvas.
//! `LopdfDocument` answers these from the page tree of a parsed file.

use lopdf::{Document, Object, ObjectId};
use thiserror::Error;
use tracing::debug;

use crate::viewer::canvas::Canvas;

/// US Letter, used when a page carries no usable MediaBox.
const DEFAULT_PAGE_SIZE: PageSize = PageSize {
    width: 612.0,
    height: 792.0,
};

/// Guards against cyclic `Parent` chains in malformed files.
const MAX_TREE_DEPTH: usize = 32;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to load document: {0}")]
    Open(String),

    #[error("page {page} out of range (document has {count} pages)")]
    PageOutOfRange { page: u32, count: u32 },

    #[error("failed to render page {page}: {message}")]
    Render { page: u32, message: String },
}

/// Native page size in PDF points, rotation applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

pub trait PdfDocument {
    fn page_count(&self) -> u32;

    /// Size of 1-based `page` at scale 1.0.
    fn page_size(&self, page: u32) -> Result<PageSize, PdfError>;

    /// Paints 1-based `page` onto `canvas`, already sized for it.
    fn paint(&self, page: u32, canvas: &mut Canvas) -> Result<(), PdfError>;
}

pub struct LopdfDocument {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl LopdfDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        let doc = Document::load_mem(bytes).map_err(|e| PdfError::Open(e.to_string()))?;
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if pages.is_empty() {
            return Err(PdfError::Open("document has no pages".to_string()));
        }
        debug!("Opened PDF with {} pages", pages.len());
        Ok(Self { doc, pages })
    }

    fn page_id(&self, page: u32) -> Result<ObjectId, PdfError> {
        page.checked_sub(1)
            .and_then(|i| self.pages.get(i as usize))
            .copied()
            .ok_or(PdfError::PageOutOfRange {
                page,
                count: self.page_count(),
            })
    }

    fn resolve<'a>(&'a self, object: &'a Object) -> Option<&'a Object> {
        match object {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    /// Looks `key` up on the page, then up the page tree (MediaBox and Rotate
    /// are inheritable).
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut node = self.doc.get_object(page_id).ok()?.as_dict().ok()?;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = node.get(key) {
                return self.resolve(value);
            }
            let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
            node = self.doc.get_object(parent).ok()?.as_dict().ok()?;
        }
        None
    }

    fn media_box(&self, page_id: ObjectId) -> Option<PageSize> {
        let values = self.inherited(page_id, b"MediaBox")?.as_array().ok()?;
        let numbers: Vec<f32> = values
            .iter()
            .filter_map(|v| self.resolve(v).and_then(number))
            .collect();
        if numbers.len() != 4 {
            return None;
        }
        let width = (numbers[2] - numbers[0]).abs();
        let height = (numbers[3] - numbers[1]).abs();
        (width > 0.0 && height > 0.0).then_some(PageSize { width, height })
    }

    fn rotation(&self, page_id: ObjectId) -> i64 {
        self.inherited(page_id, b"Rotate")
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0)
            .rem_euclid(360)
    }
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

impl PdfDocument for LopdfDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_size(&self, page: u32) -> Result<PageSize, PdfError> {
        let id = self.page_id(page)?;
        let size = self.media_box(id).unwrap_or(DEFAULT_PAGE_SIZE);
        Ok(match self.rotation(id) {
            90 | 270 => PageSize {
                width: size.height,
                height: size.width,
            },
            _ => size,
        })
    }

    fn paint(&self, page: u32, canvas: &mut Canvas) -> Result<(), PdfError> {
        let id = self.page_id(page)?;
        let content = self
            .doc
            .get_and_decode_page_content(id)
            .map_err(|e| PdfError::Render {
                page,
                message: e.to_string(),
            })?;
        canvas.record(content.operations.iter().map(|op| op.operator.as_str()));
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::pdf_with_pages;
    use super::*;
    use crate::viewer::canvas::{Canvas, Viewport};

    #[test]
    fn test_reads_page_count_and_sizes() {
        let bytes = pdf_with_pages(&[(612, 792), (842, 595)]);
        let doc = LopdfDocument::from_bytes(&bytes).unwrap();

        assert_eq!(doc.page_count(), 2);
        assert_eq!(
            doc.page_size(1).unwrap(),
            PageSize {
                width: 612.0,
                height: 792.0
            }
        );
        assert_eq!(doc.page_size(2).unwrap().width, 842.0);
        assert!(matches!(
            doc.page_size(3),
            Err(PdfError::PageOutOfRange { page: 3, count: 2 })
        ));
        assert!(doc.page_size(0).is_err());
    }

    #[test]
    fn test_paint_records_page_operations() {
        let bytes = pdf_with_pages(&[(612, 792)]);
        let doc = LopdfDocument::from_bytes(&bytes).unwrap();
        let mut canvas = Canvas::new(
            1,
            Viewport {
                width: 612.0,
                height: 792.0,
            },
            1.0,
        );

        doc.paint(1, &mut canvas).unwrap();
        assert_eq!(canvas.operation_count(), 3);
        assert_eq!(canvas.text_runs(), 1);
    }

    #[test]
    fn test_garbage_fails_to_open() {
        assert!(matches!(
            LopdfDocument::from_bytes(b"definitely not a pdf"),
            Err(PdfError::Open(_))
        ));
    }
}
