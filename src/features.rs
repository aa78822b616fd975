//! Per-line feature extraction for the learned classifier.
//!
//! Every kept text line becomes a fixed [`FeatureVector`] of typography,
//! position, content-pattern and spacing values. Spacing is measured in
//! reading order, which is the line order after sorting a page by vertical
//! position.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::layout::{CollectedDocument, CollectedPage, TextLine};

/// Number of features in a [`FeatureVector`].
pub const FEATURE_COUNT: usize = 15;

/// Feature names in vector order. These are also the training CSV columns.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "font_size",
    "is_bold",
    "is_italic",
    "cap_ratio",
    "x_pos_norm",
    "y_pos_norm",
    "line_length",
    "word_count",
    "starts_with_number",
    "ends_with_colon",
    "all_caps",
    "relative_font_size",
    "indentation",
    "vertical_spacing_above",
    "vertical_spacing_below",
];

/// Numeric description of one text line. Flags are 0.0 or 1.0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub font_size: f32,
    pub is_bold: f32,
    pub is_italic: f32,
    pub cap_ratio: f32,
    pub x_pos_norm: f32,
    pub y_pos_norm: f32,
    pub line_length: f32,
    pub word_count: f32,
    pub starts_with_number: f32,
    pub ends_with_colon: f32,
    pub all_caps: f32,
    pub relative_font_size: f32,
    pub indentation: f32,
    pub vertical_spacing_above: f32,
    pub vertical_spacing_below: f32,
}

impl FeatureVector {
    /// Values in [`FEATURE_NAMES`] order.
    pub fn to_array(&self) -> [f32; FEATURE_COUNT] {
        [
            self.font_size,
            self.is_bold,
            self.is_italic,
            self.cap_ratio,
            self.x_pos_norm,
            self.y_pos_norm,
            self.line_length,
            self.word_count,
            self.starts_with_number,
            self.ends_with_colon,
            self.all_caps,
            self.relative_font_size,
            self.indentation,
            self.vertical_spacing_above,
            self.vertical_spacing_below,
        ]
    }

    /// Build a vector from values in [`FEATURE_NAMES`] order.
    pub fn from_array(v: [f32; FEATURE_COUNT]) -> Self {
        Self {
            font_size: v[0],
            is_bold: v[1],
            is_italic: v[2],
            cap_ratio: v[3],
            x_pos_norm: v[4],
            y_pos_norm: v[5],
            line_length: v[6],
            word_count: v[7],
            starts_with_number: v[8],
            ends_with_colon: v[9],
            all_caps: v[10],
            relative_font_size: v[11],
            indentation: v[12],
            vertical_spacing_above: v[13],
            vertical_spacing_below: v[14],
        }
    }
}

/// Features of one line together with where the line came from.
#[derive(Debug, Clone)]
pub struct LineFeatures {
    /// Line text
    pub text: String,
    /// Page number (1-indexed)
    pub page: u32,
    /// Top of the line in page coordinates
    pub top: f32,
    /// The feature values
    pub features: FeatureVector,
}

/// Computes line features for whole documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract features for every line of a document, pages in order and
    /// lines in reading order within a page.
    pub fn extract(&self, doc: &CollectedDocument) -> Vec<LineFeatures> {
        let per_page: Vec<Vec<LineFeatures>> = doc
            .pages
            .par_iter()
            .map(|page| self.extract_page(page))
            .collect();
        per_page.into_iter().flatten().collect()
    }

    /// Extract features for the lines of one page.
    pub fn extract_page(&self, page: &CollectedPage) -> Vec<LineFeatures> {
        let mut lines: Vec<&TextLine> = page.lines().collect();
        lines.sort_by(|a, b| {
            a.bbox
                .y0
                .partial_cmp(&b.bbox.y0)
                .unwrap_or(Ordering::Equal)
                .then(a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal))
        });

        let median_size = median(lines.iter().map(|l| l.font_size()).collect());
        let left_margin = lines.iter().map(|l| l.bbox.x0).fold(f32::INFINITY, f32::min);

        lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let text = line.text();
                let font_size = line.font_size();
                let char_count = text.chars().count();
                let uppercase = text.chars().filter(|c| c.is_uppercase()).count();

                let spacing_above = i
                    .checked_sub(1)
                    .map(|prev| (line.bbox.y0 - lines[prev].bbox.y1).max(0.0))
                    .unwrap_or(0.0);
                let spacing_below = lines
                    .get(i + 1)
                    .map(|next| (next.bbox.y0 - line.bbox.y1).max(0.0))
                    .unwrap_or(0.0);

                let features = FeatureVector {
                    font_size,
                    is_bold: flag(line.is_bold()),
                    is_italic: flag(line.is_italic()),
                    cap_ratio: ratio(uppercase as f32, char_count as f32),
                    x_pos_norm: ratio(line.bbox.x0, page.width),
                    y_pos_norm: ratio(line.bbox.y0, page.height),
                    line_length: char_count as f32,
                    word_count: text.split_whitespace().count() as f32,
                    starts_with_number: flag(
                        text.chars().next().is_some_and(|c| c.is_ascii_digit()),
                    ),
                    ends_with_colon: flag(text.ends_with(':')),
                    all_caps: flag(line.is_uppercase()),
                    relative_font_size: ratio(font_size, median_size),
                    indentation: line.bbox.x0 - left_margin,
                    vertical_spacing_above: spacing_above,
                    vertical_spacing_below: spacing_below,
                };

                LineFeatures {
                    text,
                    page: page.number,
                    top: line.bbox.y0,
                    features,
                }
            })
            .collect()
    }
}

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Division that yields 0 for a non-positive denominator.
fn ratio(numerator: f32, denominator: f32) -> f32 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

fn median(mut values: Vec<f32>) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::SpanCollector;
    use crate::model::{BBox, DocumentLayout, LayoutBlock, LayoutLine, LayoutSpan, PageLayout};
    use crate::options::ExtractOptions;

    fn line(text: &str, size: f32, x: f32, y: f32) -> LayoutLine {
        LayoutLine::new(vec![LayoutSpan::new(
            text,
            size,
            BBox::new(x, y, x + 200.0, y + size),
        )])
    }

    fn page_features(lines: Vec<LayoutLine>) -> Vec<LineFeatures> {
        let mut page = PageLayout::new(600.0, 800.0);
        page.add_block(LayoutBlock::from_lines(lines));
        let mut layout = DocumentLayout::new();
        layout.add_page(page);

        let doc = SpanCollector::new(&ExtractOptions::default()).collect(&layout);
        FeatureExtractor::new().extract(&doc)
    }

    #[test]
    fn test_vector_array_order() {
        let v = FeatureVector {
            font_size: 1.0,
            vertical_spacing_below: 15.0,
            ..Default::default()
        };
        let arr = v.to_array();
        assert_eq!(arr[0], 1.0);
        assert_eq!(arr[FEATURE_COUNT - 1], 15.0);
        assert_eq!(FeatureVector::from_array(arr), v);
    }

    #[test]
    fn test_reading_order_and_spacing() {
        // Emitted bottom-up on purpose.
        let features = page_features(vec![
            line("body text here", 10.0, 72.0, 140.0),
            line("HEADING:", 20.0, 60.0, 100.0),
        ]);

        assert_eq!(features[0].text, "HEADING:");
        assert_eq!(features[1].text, "body text here");

        let heading = &features[0].features;
        assert_eq!(heading.vertical_spacing_above, 0.0);
        assert_eq!(heading.vertical_spacing_below, 20.0);
        assert_eq!(heading.all_caps, 1.0);
        assert_eq!(heading.ends_with_colon, 1.0);
        assert_eq!(heading.cap_ratio, 7.0 / 8.0);
        assert_eq!(heading.indentation, 0.0);
        assert_eq!(heading.x_pos_norm, 0.1);
        assert_eq!(heading.y_pos_norm, 0.125);

        let body = &features[1].features;
        assert_eq!(body.vertical_spacing_above, 20.0);
        assert_eq!(body.vertical_spacing_below, 0.0);
        assert_eq!(body.indentation, 12.0);
        assert_eq!(body.word_count, 3.0);
        assert_eq!(body.all_caps, 0.0);
    }

    #[test]
    fn test_relative_font_size_uses_page_median() {
        let features = page_features(vec![
            line("Title", 24.0, 72.0, 50.0),
            line("one", 12.0, 72.0, 100.0),
            line("two", 12.0, 72.0, 120.0),
        ]);
        assert_eq!(features[0].features.relative_font_size, 2.0);
        assert_eq!(features[1].features.relative_font_size, 1.0);
    }

    #[test]
    fn test_starts_with_number() {
        let features = page_features(vec![line("3.1 Scope", 12.0, 72.0, 100.0)]);
        assert_eq!(features[0].features.starts_with_number, 1.0);
    }

    #[test]
    fn test_guards() {
        assert_eq!(ratio(5.0, 0.0), 0.0);
        assert_eq!(median(vec![]), 0.0);
        assert_eq!(median(vec![3.0, 1.0, 2.0, 10.0]), 2.5);
    }
}
