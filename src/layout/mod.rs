//! Layout analysis shared by every classification strategy.
//!
//! Span collection, the document-wide font statistics, and form page
//! detection all run once per document before any heading is classified.

mod collector;
mod fonts;
mod form;

pub use collector::{
    CollectedDocument, CollectedPage, SpanCollector, TextBlock, TextLine, TextSpan,
};
pub use fonts::{size_key, FontStatistics};
pub use form::FormPageDetector;
