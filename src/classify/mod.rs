//! Heading classification strategies.
//!
//! Both strategies consume the same collected document and font statistics
//! and produce heading candidates plus an optional title. Form suppression,
//! ordering and deduplication happen afterwards in the assembler.

mod learned;
mod rank;
mod title;

pub use learned::LearnedClassifier;
pub use rank::RankHeuristic;
pub use title::TitleDetector;

use crate::layout::{CollectedDocument, FontStatistics, SpanCollector};
use crate::model::HeadingLevel;
use crate::options::ExtractOptions;

/// A line or block accepted as a heading.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingCandidate {
    /// Heading level
    pub level: HeadingLevel,
    /// Heading text
    pub text: String,
    /// Page number (1-indexed)
    pub page: u32,
}

/// Output of a classification strategy for one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// Accepted headings, in document order
    pub headings: Vec<HeadingCandidate>,
    /// Detected title
    pub title: Option<String>,
}

/// Everything a strategy may look at for one document.
pub struct DocumentContext<'a> {
    /// Collected pages
    pub doc: &'a CollectedDocument,
    /// Document-wide font statistics
    pub fonts: &'a FontStatistics,
    /// The collector that produced `doc`, for block candidacy checks
    pub collector: &'a SpanCollector,
    /// Extraction options
    pub options: &'a ExtractOptions,
}

/// A heading classification strategy.
pub trait HeadingClassifier: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Classify the blocks or lines of one document.
    fn classify(&self, ctx: &DocumentContext<'_>) -> Classification;
}
