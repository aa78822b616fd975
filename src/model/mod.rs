//! Document model types.
//!
//! The layout types describe what the upstream PDF layout engine hands us;
//! the outline types are what the extractor produces.

mod layout;
mod outline;

pub use layout::{BBox, DocumentLayout, LayoutBlock, LayoutLine, LayoutSpan, PageLayout};
pub use outline::{HeadingEntry, HeadingLevel, JsonFormat, Outline};
