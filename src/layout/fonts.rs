//! Document-wide font size statistics.

use std::collections::{BTreeMap, HashMap};

use super::collector::CollectedDocument;

/// Histogram key for a font size: the size rounded to 0.1 pt, in tenths.
pub fn size_key(size: f32) -> i32 {
    (size * 10.0).round() as i32
}

fn key_to_size(key: i32) -> f32 {
    key as f32 / 10.0
}

/// Font size histogram and the size rank derived from it.
///
/// Rank 0 is the largest size observed in the document. Ranks only depend on
/// which sizes occur, never on how often.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    histogram: BTreeMap<i32, usize>,
    ranks: HashMap<i32, usize>,
}

impl FontStatistics {
    /// Build statistics from a sequence of font sizes.
    pub fn from_sizes<I: IntoIterator<Item = f32>>(sizes: I) -> Self {
        let mut histogram = BTreeMap::new();
        for size in sizes {
            *histogram.entry(size_key(size)).or_insert(0) += 1;
        }

        let ranks = histogram
            .keys()
            .rev()
            .enumerate()
            .map(|(rank, key)| (*key, rank))
            .collect();

        Self { histogram, ranks }
    }

    /// Build statistics over every kept span of a document.
    pub fn from_document(doc: &CollectedDocument) -> Self {
        Self::from_sizes(doc.spans().map(|s| s.font_size))
    }

    /// Rank of a font size, `None` if the size never occurs in the document.
    pub fn rank(&self, size: f32) -> Option<usize> {
        self.ranks.get(&size_key(size)).copied()
    }

    /// Number of spans observed at a font size.
    pub fn count(&self, size: f32) -> usize {
        self.histogram.get(&size_key(size)).copied().unwrap_or(0)
    }

    /// Distinct sizes, largest first (index = rank).
    pub fn sizes_descending(&self) -> Vec<f32> {
        self.histogram.keys().rev().map(|k| key_to_size(*k)).collect()
    }

    /// Largest observed size.
    pub fn largest_size(&self) -> Option<f32> {
        self.histogram.keys().next_back().map(|k| key_to_size(*k))
    }

    /// Most common size, the smaller one on ties.
    pub fn body_size(&self) -> Option<f32> {
        self.histogram
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(k, _)| key_to_size(*k))
    }

    /// Number of distinct sizes.
    pub fn distinct_sizes(&self) -> usize {
        self.histogram.len()
    }

    /// Check if no sizes were observed.
    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }
}
