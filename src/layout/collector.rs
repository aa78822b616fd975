//! Span collection.
//!
//! Turns the layout engine's raw pages into uniform [`TextSpan`] records
//! grouped into lines and blocks, dropping spans that can never be part of a
//! heading before any statistics are computed.

use std::collections::BTreeSet;

use unicode_normalization::UnicodeNormalization;

use super::fonts::size_key;
use crate::model::{BBox, DocumentLayout, LayoutBlock, LayoutLine, LayoutSpan};
use crate::options::ExtractOptions;

/// A text span with position and style information.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// The text content, trimmed
    pub text: String,
    /// Font size in points
    pub font_size: f32,
    /// Whether the span is bold
    pub is_bold: bool,
    /// Whether the span is italic
    pub is_italic: bool,
    /// Bounding box in page coordinates
    pub bbox: BBox,
    /// Page number (1-indexed)
    pub page: u32,
    /// Characters of the trimmed text as the layout engine emitted it
    pub emitted_chars: usize,
}

impl TextSpan {
    /// Create a span from layout output, inferring style from the font name
    /// when the layout engine did not flag it.
    pub fn from_layout(span: &LayoutSpan, text: String, page: u32) -> Self {
        let font = span.font.to_lowercase();
        let is_bold =
            span.bold || font.contains("bold") || font.contains("black") || font.contains("heavy");
        let is_italic = span.italic || font.contains("italic") || font.contains("oblique");

        Self {
            text,
            font_size: span.size,
            is_bold,
            is_italic,
            bbox: span.bbox,
            page,
            emitted_chars: span.text.trim().chars().count(),
        }
    }

    /// Number of characters in the span.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// A visual line composed of the spans that survived collection.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// Spans in layout order
    pub spans: Vec<TextSpan>,
    /// Bounding box of the kept spans
    pub bbox: BBox,
    /// Page number (1-indexed)
    pub page: u32,
}

impl TextLine {
    /// Get the text of the line, spans joined by a single space.
    pub fn text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Largest font size in the line.
    pub fn font_size(&self) -> f32 {
        self.spans.iter().map(|s| s.font_size).fold(0.0, f32::max)
    }

    /// Check if the line is predominantly bold.
    pub fn is_bold(&self) -> bool {
        self.styled_fraction(|s| s.is_bold) > 0.5
    }

    /// Check if the line is predominantly italic.
    pub fn is_italic(&self) -> bool {
        self.styled_fraction(|s| s.is_italic) > 0.5
    }

    /// Check if the line appears to be uppercase.
    pub fn is_uppercase(&self) -> bool {
        let text = self.text();
        let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
        !letters.is_empty() && letters.iter().all(|c| c.is_uppercase())
    }

    fn styled_fraction(&self, styled: impl Fn(&TextSpan) -> bool) -> f32 {
        let total: usize = self.spans.iter().map(TextSpan::char_count).sum();
        if total == 0 {
            return 0.0;
        }
        let matching: usize = self
            .spans
            .iter()
            .filter(|s| styled(s))
            .map(TextSpan::char_count)
            .sum();
        matching as f32 / total as f32
    }
}

/// A group of lines from one layout container.
#[derive(Debug, Clone)]
pub struct TextBlock {
    /// The lines in this block
    pub lines: Vec<TextLine>,
    /// Bounding box of the kept lines
    pub bbox: BBox,
    /// Page number (1-indexed)
    pub page: u32,
}

impl TextBlock {
    /// Merged text of all lines with whitespace collapsed.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .flat_map(|l| l.spans.iter())
            .flat_map(|s| s.text.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Largest font size in the block.
    pub fn max_font_size(&self) -> f32 {
        self.lines.iter().map(TextLine::font_size).fold(0.0, f32::max)
    }

    /// Distinct rounded font sizes, in tenths of a point.
    pub fn font_sizes(&self) -> BTreeSet<i32> {
        self.lines
            .iter()
            .flat_map(|l| l.spans.iter())
            .map(|s| size_key(s.font_size))
            .collect()
    }

    /// Vertical position of the first line.
    pub fn top(&self) -> f32 {
        self.lines.first().map(|l| l.bbox.y0).unwrap_or(self.bbox.y0)
    }

    /// Character count of [`TextBlock::text`], with every span counted at
    /// its emitted length rather than its normalized one.
    pub fn emitted_len(&self) -> usize {
        let delta: isize = self
            .lines
            .iter()
            .flat_map(|l| l.spans.iter())
            .map(|s| s.char_count() as isize - s.emitted_chars as isize)
            .sum();
        (self.text().chars().count() as isize - delta).max(0) as usize
    }

    /// Number of visual lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// One page after collection.
#[derive(Debug, Clone)]
pub struct CollectedPage {
    /// Page number (1-indexed)
    pub number: u32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Blocks that kept at least one line
    pub blocks: Vec<TextBlock>,
}

impl CollectedPage {
    /// All lines of the page in block order.
    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.blocks.iter().flat_map(|b| b.lines.iter())
    }

    /// Text of every line on the page.
    pub fn line_texts(&self) -> Vec<String> {
        self.lines().map(TextLine::text).collect()
    }
}

/// A whole document after collection.
#[derive(Debug, Clone, Default)]
pub struct CollectedDocument {
    /// Pages in reading order
    pub pages: Vec<CollectedPage>,
}

impl CollectedDocument {
    /// Every kept span of the document.
    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.pages
            .iter()
            .flat_map(|p| p.lines())
            .flat_map(|l| l.spans.iter())
    }

    /// Get a page by number (1-indexed).
    pub fn page(&self, number: u32) -> Option<&CollectedPage> {
        self.pages.iter().find(|p| p.number == number)
    }

    /// Check if the document has no extractable spans.
    pub fn is_empty(&self) -> bool {
        self.spans().next().is_none()
    }
}

/// Normalizes layout output into collected pages.
#[derive(Debug, Clone)]
pub struct SpanCollector {
    max_text_len: usize,
    max_block_lines: usize,
    normalize_unicode: bool,
}

impl SpanCollector {
    /// Create a collector from extraction options.
    pub fn new(options: &ExtractOptions) -> Self {
        Self {
            max_text_len: options.max_heading_len,
            max_block_lines: options.max_heading_lines,
            normalize_unicode: options.normalize_unicode,
        }
    }

    /// Collect every page of a document. Pages are numbered from 1.
    pub fn collect(&self, layout: &DocumentLayout) -> CollectedDocument {
        let pages = layout
            .pages
            .iter()
            .enumerate()
            .map(|(i, page)| {
                let number = i as u32 + 1;
                CollectedPage {
                    number,
                    width: page.width,
                    height: page.height,
                    blocks: page
                        .blocks
                        .iter()
                        .filter_map(|b| self.collect_block(b, number))
                        .collect(),
                }
            })
            .collect();

        CollectedDocument { pages }
    }

    /// Check whether a block is short enough to be a heading.
    pub fn is_heading_candidate(&self, block: &TextBlock) -> bool {
        if block.line_count() > self.max_block_lines {
            return false;
        }
        !block.text().is_empty() && block.emitted_len() <= self.max_text_len
    }

    fn collect_block(&self, block: &LayoutBlock, page: u32) -> Option<TextBlock> {
        let lines: Vec<TextLine> = block
            .lines
            .iter()
            .filter_map(|l| self.collect_line(l, page))
            .collect();

        let bbox = lines.iter().map(|l| l.bbox).reduce(|a, b| a.union(&b))?;
        Some(TextBlock { lines, bbox, page })
    }

    fn collect_line(&self, line: &LayoutLine, page: u32) -> Option<TextLine> {
        let spans: Vec<TextSpan> = line
            .spans
            .iter()
            .filter_map(|s| self.collect_span(s, page))
            .collect();

        let bbox = spans.iter().map(|s| s.bbox).reduce(|a, b| a.union(&b))?;
        Some(TextLine { spans, bbox, page })
    }

    /// The length limit applies to the text as emitted; normalization runs
    /// only on spans that pass it.
    fn collect_span(&self, span: &LayoutSpan, page: u32) -> Option<TextSpan> {
        let raw = span.text.trim();
        if raw.is_empty() || raw.chars().count() > self.max_text_len {
            return None;
        }

        let text = if self.normalize_unicode {
            let normalized: String = raw.nfkc().collect();
            normalized.trim().to_string()
        } else {
            raw.to_string()
        };
        if text.is_empty() {
            return None;
        }

        Some(TextSpan::from_layout(span, text, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageLayout;

    fn span(text: &str, size: f32, y: f32) -> LayoutSpan {
        LayoutSpan::new(text, size, BBox::new(72.0, y, 300.0, y + size))
    }

    fn doc_with_blocks(blocks: Vec<LayoutBlock>) -> DocumentLayout {
        let mut page = PageLayout::letter();
        for block in blocks {
            page.add_block(block);
        }
        let mut doc = DocumentLayout::new();
        doc.add_page(page);
        doc
    }

    #[test]
    fn test_span_length_boundary() {
        let exact = "a".repeat(120);
        let over = "b".repeat(121);
        let layout = doc_with_blocks(vec![
            LayoutBlock::from_lines(vec![LayoutLine::new(vec![span(&exact, 12.0, 100.0)])]),
            LayoutBlock::from_lines(vec![LayoutLine::new(vec![span(&over, 12.0, 200.0)])]),
        ]);

        let collected = SpanCollector::new(&ExtractOptions::default()).collect(&layout);
        let texts: Vec<&str> = collected.spans().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec![exact.as_str()]);
    }

    #[test]
    fn test_length_limit_measured_before_normalization() {
        let emitted = format!("{}\u{FB01}", "a".repeat(119));
        let layout = doc_with_blocks(vec![LayoutBlock::from_lines(vec![LayoutLine::new(
            vec![span(&emitted, 20.0, 100.0)],
        )])]);

        let collected = SpanCollector::new(&ExtractOptions::default()).collect(&layout);
        let texts: Vec<&str> = collected.spans().map(|s| s.text.as_str()).collect();
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].chars().count(), 121);
        assert!(texts[0].ends_with("fi"));

        let collector = SpanCollector::new(&ExtractOptions::default());
        let block = &collector.collect(&layout).pages[0].blocks[0];
        assert_eq!(block.emitted_len(), 120);
        assert!(collector.is_heading_candidate(block));
    }

    #[test]
    fn test_empty_spans_dropped() {
        let layout = doc_with_blocks(vec![LayoutBlock::from_lines(vec![
            LayoutLine::new(vec![span("   ", 12.0, 100.0)]),
            LayoutLine::new(vec![span("", 12.0, 120.0)]),
        ])]);

        let collected = SpanCollector::new(&ExtractOptions::default()).collect(&layout);
        assert!(collected.is_empty());
        assert!(collected.pages[0].blocks.is_empty());
    }

    #[test]
    fn test_block_text_merges_lines() {
        let layout = doc_with_blocks(vec![LayoutBlock::from_lines(vec![
            LayoutLine::new(vec![span("  Annual ", 18.0, 100.0), span("Report", 16.0, 100.0)]),
            LayoutLine::new(vec![span("2024  edition", 14.0, 120.0)]),
        ])]);

        let collected = SpanCollector::new(&ExtractOptions::default()).collect(&layout);
        let block = &collected.pages[0].blocks[0];
        assert_eq!(block.text(), "Annual Report 2024 edition");
        assert_eq!(block.max_font_size(), 18.0);
        assert_eq!(block.font_sizes().len(), 3);
        assert_eq!(block.top(), 100.0);
    }

    #[test]
    fn test_long_blocks_are_not_candidates() {
        let lines = (0..4)
            .map(|i| LayoutLine::new(vec![span("line", 12.0, 100.0 + i as f32 * 14.0)]))
            .collect();
        let layout = doc_with_blocks(vec![LayoutBlock::from_lines(lines)]);

        let collector = SpanCollector::new(&ExtractOptions::default());
        let collected = collector.collect(&layout);
        assert!(!collector.is_heading_candidate(&collected.pages[0].blocks[0]));
    }

    #[test]
    fn test_style_inferred_from_font_name() {
        let raw = span("Title", 20.0, 50.0).with_font("Helvetica-Bold");
        let text_span = TextSpan::from_layout(&raw, "Title".to_string(), 1);
        assert!(text_span.is_bold);
        assert!(!text_span.is_italic);

        let raw = span("Note", 10.0, 50.0).with_font("Times-Oblique");
        let text_span = TextSpan::from_layout(&raw, "Note".to_string(), 1);
        assert!(!text_span.is_bold);
        assert!(text_span.is_italic);
    }

    #[test]
    fn test_ligatures_normalized() {
        let layout = doc_with_blocks(vec![LayoutBlock::single(
            "\u{FB01}nal",
            12.0,
            BBox::new(0.0, 0.0, 10.0, 12.0),
        )]);
        let collected = SpanCollector::new(&ExtractOptions::default()).collect(&layout);
        assert_eq!(collected.pages[0].blocks[0].text(), "final");
    }

    #[test]
    fn test_line_predominantly_bold() {
        let line = TextLine {
            spans: vec![
                TextSpan::from_layout(&span("Bold words", 12.0, 0.0).bold(), "Bold words".into(), 1),
                TextSpan::from_layout(&span("x", 12.0, 0.0), "x".into(), 1),
            ],
            bbox: BBox::default(),
            page: 1,
        };
        assert!(line.is_bold());
        assert!(!line.is_italic());
    }
}
