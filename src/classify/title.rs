//! Title detection.

use std::cmp::Ordering;

use super::DocumentContext;
use crate::features::LineFeatures;
use crate::ml::{Label, Prediction};

/// Picks the document title for either classification strategy.
pub struct TitleDetector;

impl TitleDetector {
    /// Title from the top band of page 1.
    ///
    /// Among heading-sized blocks starting within the top
    /// `title_top_ratio` of the page, the largest font wins; the lower font
    /// rank breaks ties, then the topmost block, then the first one emitted.
    pub fn from_top_of_first_page(ctx: &DocumentContext<'_>) -> Option<String> {
        let page = ctx.doc.page(1)?;
        let band = page.height * ctx.options.title_top_ratio;

        let mut best: Option<TopBlock> = None;
        for block in page
            .blocks
            .iter()
            .filter(|b| b.top() < band && ctx.collector.is_heading_candidate(b))
        {
            let size = block.max_font_size();
            let candidate = TopBlock {
                size,
                rank: ctx.fonts.rank(size),
                top: block.top(),
                text: block.text(),
            };
            if best.as_ref().map_or(true, |b| candidate.outranks(b)) {
                best = Some(candidate);
            }
        }

        let title = best.map(|b| b.text);
        log::debug!("Top-of-page title candidate: {:?}", title);
        title
    }

    /// Title from model predictions over the lines of a document.
    ///
    /// The most confident `Title` prediction wins; without one, the line with
    /// the largest font on page 1, the topmost on ties. `lines` must be in
    /// reading order and aligned with `predictions`.
    pub fn from_predictions(lines: &[LineFeatures], predictions: &[Prediction]) -> Option<String> {
        let mut predicted: Option<(usize, f32)> = None;
        for (i, p) in predictions.iter().enumerate() {
            if p.label == Label::Title && predicted.map_or(true, |(_, c)| p.confidence > c) {
                predicted = Some((i, p.confidence));
            }
        }
        if let Some((i, _)) = predicted {
            return Some(lines[i].text.clone());
        }

        let mut largest: Option<&LineFeatures> = None;
        for line in lines.iter().filter(|l| l.page == 1) {
            let better = largest.map_or(true, |b| {
                line.features
                    .font_size
                    .partial_cmp(&b.features.font_size)
                    .unwrap_or(Ordering::Equal)
                    .then(b.top.partial_cmp(&line.top).unwrap_or(Ordering::Equal))
                    .is_gt()
            });
            if better {
                largest = Some(line);
            }
        }
        largest.map(|l| l.text.clone())
    }
}

/// A title candidate from the top band of page 1.
#[derive(Debug, Clone)]
struct TopBlock {
    size: f32,
    rank: Option<usize>,
    top: f32,
    text: String,
}

impl TopBlock {
    /// Larger size, then lower rank, then higher on the page. Equal blocks
    /// keep the earlier one.
    fn outranks(&self, other: &TopBlock) -> bool {
        let rank = self.rank.unwrap_or(usize::MAX);
        let other_rank = other.rank.unwrap_or(usize::MAX);
        self.size
            .partial_cmp(&other.size)
            .unwrap_or(Ordering::Equal)
            .then(other_rank.cmp(&rank))
            .then(other.top.partial_cmp(&self.top).unwrap_or(Ordering::Equal))
            .is_gt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;
    use crate::layout::{FontStatistics, SpanCollector};
    use crate::model::{BBox, DocumentLayout, LayoutBlock, LayoutLine, LayoutSpan, PageLayout};
    use crate::options::ExtractOptions;

    fn block(text: &str, size: f32, y: f32) -> LayoutBlock {
        LayoutBlock::single(text, size, BBox::new(72.0, y, 400.0, y + size))
    }

    fn heuristic_title(layout: &DocumentLayout) -> Option<String> {
        let options = ExtractOptions::default();
        let collector = SpanCollector::new(&options);
        let doc = collector.collect(layout);
        let fonts = FontStatistics::from_document(&doc);
        let ctx = DocumentContext {
            doc: &doc,
            fonts: &fonts,
            collector: &collector,
            options: &options,
        };
        TitleDetector::from_top_of_first_page(&ctx)
    }

    fn document(pages: Vec<PageLayout>) -> DocumentLayout {
        let mut layout = DocumentLayout::new();
        for page in pages {
            layout.add_page(page);
        }
        layout
    }

    fn top_block(size: f32, rank: Option<usize>, top: f32) -> TopBlock {
        TopBlock {
            size,
            rank,
            top,
            text: String::new(),
        }
    }

    #[test]
    fn test_only_top_band_blocks_compete() {
        // Letter page: the band ends at 792 * 0.15 = 118.8 pt.
        let mut page = PageLayout::letter();
        page.add_block(block("Small top", 14.0, 40.0));
        page.add_block(block("Big lower", 30.0, 300.0));

        let title = heuristic_title(&document(vec![page]));
        assert_eq!(title.as_deref(), Some("Small top"));
    }

    #[test]
    fn test_later_pages_never_supply_the_title() {
        let mut first = PageLayout::letter();
        first.add_block(block("Body paragraph", 10.0, 300.0));
        let mut second = PageLayout::letter();
        second.add_block(block("Second page banner", 30.0, 30.0));

        assert_eq!(heuristic_title(&document(vec![first, second])), None);
        assert_eq!(heuristic_title(&DocumentLayout::new()), None);
    }

    #[test]
    fn test_non_heading_blocks_are_excluded() {
        let lines = (0..4)
            .map(|i| {
                let y = 20.0 + i as f32 * 20.0;
                LayoutLine::new(vec![LayoutSpan::new(
                    format!("Line {}", i),
                    30.0,
                    BBox::new(72.0, y, 400.0, y + 18.0),
                )])
            })
            .collect();
        let mut page = PageLayout::letter();
        page.add_block(LayoutBlock::from_lines(lines));
        page.add_block(block("Short", 16.0, 100.0));

        let title = heuristic_title(&document(vec![page]));
        assert_eq!(title.as_deref(), Some("Short"));
    }

    #[test]
    fn test_largest_size_then_lower_rank_then_topmost() {
        let best = top_block(20.0, Some(1), 50.0);

        assert!(top_block(22.0, Some(2), 90.0).outranks(&best));
        assert!(!top_block(18.0, Some(0), 10.0).outranks(&best));

        assert!(top_block(20.0, Some(0), 90.0).outranks(&best));
        assert!(!top_block(20.0, Some(2), 10.0).outranks(&best));
        assert!(!top_block(20.0, None, 10.0).outranks(&best));

        assert!(top_block(20.0, Some(1), 30.0).outranks(&best));
        assert!(!top_block(20.0, Some(1), 50.0).outranks(&best));
    }

    #[test]
    fn test_equal_size_keeps_topmost_block() {
        let mut page = PageLayout::letter();
        page.add_block(block("Lower", 20.0, 80.0));
        page.add_block(block("Upper", 20.0, 30.0));
        page.add_block(block("body text", 10.0, 400.0));

        let title = heuristic_title(&document(vec![page]));
        assert_eq!(title.as_deref(), Some("Upper"));
    }

    fn line(text: &str, page: u32, font_size: f32) -> LineFeatures {
        line_at(text, page, font_size, 0.0)
    }

    fn line_at(text: &str, page: u32, font_size: f32, top: f32) -> LineFeatures {
        LineFeatures {
            text: text.to_string(),
            page,
            top,
            features: FeatureVector {
                font_size,
                ..Default::default()
            },
        }
    }

    fn pred(label: Label, confidence: f32) -> Prediction {
        Prediction { label, confidence }
    }

    #[test]
    fn test_most_confident_title_wins() {
        let lines = vec![line("A", 1, 20.0), line("B", 1, 12.0), line("C", 2, 30.0)];
        let predictions = vec![
            pred(Label::Title, 0.6),
            pred(Label::Body, 0.9),
            pred(Label::Title, 0.8),
        ];
        assert_eq!(
            TitleDetector::from_predictions(&lines, &predictions).as_deref(),
            Some("C")
        );
    }

    #[test]
    fn test_falls_back_to_largest_page_one_line() {
        let lines = vec![line("small", 1, 10.0), line("big", 1, 22.0), line("other", 2, 40.0)];
        let predictions = vec![pred(Label::Body, 0.9); 3];
        assert_eq!(
            TitleDetector::from_predictions(&lines, &predictions).as_deref(),
            Some("big")
        );
    }

    #[test]
    fn test_fallback_prefers_topmost_on_equal_size() {
        // Right column emitted first but sits lower on the page.
        let lines = vec![
            line_at("Sidebar", 1, 24.0, 300.0),
            line_at("Masthead", 1, 24.0, 40.0),
            line_at("Twin", 1, 24.0, 40.0),
        ];
        let predictions = vec![pred(Label::H1, 0.9); 3];
        assert_eq!(
            TitleDetector::from_predictions(&lines, &predictions).as_deref(),
            Some("Masthead")
        );
    }

    #[test]
    fn test_no_page_one_lines() {
        let lines = vec![line("later", 2, 40.0)];
        let predictions = vec![pred(Label::H1, 0.9)];
        assert_eq!(TitleDetector::from_predictions(&lines, &predictions), None);
    }
}
