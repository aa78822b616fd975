//! Layout input types.
//!
//! These mirror what a PDF layout engine reports for each page: blocks of
//! lines of style-homogeneous spans, each with a bounding box in page points.
//! The origin is the top-left corner of the page and y grows downwards.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in page coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// Layout of a whole document, pages in reading order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentLayout {
    /// Pages in the document
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    /// Create a new empty document layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page.
    pub fn add_page(&mut self, page: PageLayout) {
        self.pages.push(page);
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Check if the document has no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Layout of one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLayout {
    /// Page width in points
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Text blocks in the order the layout engine emitted them
    #[serde(default)]
    pub blocks: Vec<LayoutBlock>,
}

impl PageLayout {
    /// Create a new empty page with the given dimensions.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            blocks: Vec::new(),
        }
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    /// Create a new page with standard A4 size (210 x 297 mm).
    pub fn a4() -> Self {
        Self::new(595.0, 842.0)
    }

    /// Add a block to the page.
    pub fn add_block(&mut self, block: LayoutBlock) {
        self.blocks.push(block);
    }
}

/// One layout container: one or more visual lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutBlock {
    /// Bounding box of the block
    pub bbox: BBox,

    /// Lines in the block
    #[serde(default)]
    pub lines: Vec<LayoutLine>,
}

impl LayoutBlock {
    /// Create a block from lines, its box being the union of the line boxes.
    pub fn from_lines(lines: Vec<LayoutLine>) -> Self {
        let bbox = lines
            .iter()
            .map(|l| l.bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        Self { bbox, lines }
    }

    /// Create a single-line, single-span block.
    pub fn single(text: impl Into<String>, size: f32, bbox: BBox) -> Self {
        Self::from_lines(vec![LayoutLine::new(vec![LayoutSpan::new(text, size, bbox)])])
    }
}

/// One visual line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutLine {
    /// Bounding box of the line
    pub bbox: BBox,

    /// Style-homogeneous spans, left to right
    #[serde(default)]
    pub spans: Vec<LayoutSpan>,
}

impl LayoutLine {
    /// Create a line from spans, its box being the union of the span boxes.
    pub fn new(spans: Vec<LayoutSpan>) -> Self {
        let bbox = spans
            .iter()
            .map(|s| s.bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        Self { bbox, spans }
    }
}

/// A run of text sharing one font and style.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutSpan {
    /// The text content
    pub text: String,

    /// Font size in points
    pub size: f32,

    /// Font name (e.g., "Helvetica-Bold")
    #[serde(default)]
    pub font: String,

    /// Bold flag reported by the layout engine
    #[serde(default)]
    pub bold: bool,

    /// Italic flag reported by the layout engine
    #[serde(default)]
    pub italic: bool,

    /// Bounding box of the span
    pub bbox: BBox,
}

impl LayoutSpan {
    /// Create a plain span.
    pub fn new(text: impl Into<String>, size: f32, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            size,
            bbox,
            ..Default::default()
        }
    }

    /// Set the font name.
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    /// Mark the span bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Mark the span italic.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_union() {
        let a = BBox::new(10.0, 10.0, 50.0, 20.0);
        let b = BBox::new(5.0, 15.0, 40.0, 30.0);
        assert_eq!(a.union(&b), BBox::new(5.0, 10.0, 50.0, 30.0));
    }

    #[test]
    fn test_block_bbox_from_lines() {
        let block = LayoutBlock::from_lines(vec![
            LayoutLine::new(vec![LayoutSpan::new("a", 12.0, BBox::new(72.0, 100.0, 90.0, 112.0))]),
            LayoutLine::new(vec![LayoutSpan::new("b", 12.0, BBox::new(72.0, 114.0, 80.0, 126.0))]),
        ]);
        assert_eq!(block.bbox.y0, 100.0);
        assert_eq!(block.bbox.y1, 126.0);
    }

    #[test]
    fn test_document_page_count() {
        let mut doc = DocumentLayout::new();
        assert!(doc.is_empty());
        doc.add_page(PageLayout::letter());
        doc.add_page(PageLayout::a4());
        assert_eq!(doc.page_count(), 2);
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_span_defaults_from_json() {
        let json = r#"{"text":"Hi","size":12.0,"bbox":{"x0":0,"y0":0,"x1":10,"y1":12}}"#;
        let span: LayoutSpan = serde_json::from_str(json).unwrap();
        assert!(!span.bold);
        assert!(span.font.is_empty());
    }
}
