//! Font-rank heading heuristic.

use super::{Classification, DocumentContext, HeadingCandidate, HeadingClassifier, TitleDetector};
use crate::model::HeadingLevel;

/// Maps the font rank of a block's largest size to a heading level.
///
/// A block is a heading when its rank is within the page's threshold
/// (more permissive on page 1, where the title takes the top rank). Level is
/// rank + 1, capped at H3. Blocks whose size has no rank are body text.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankHeuristic;

impl RankHeuristic {
    /// Create the heuristic classifier.
    pub fn new() -> Self {
        Self
    }
}

impl HeadingClassifier for RankHeuristic {
    fn name(&self) -> &str {
        "rank-heuristic"
    }

    fn classify(&self, ctx: &DocumentContext<'_>) -> Classification {
        let mut headings = Vec::new();

        for page in &ctx.doc.pages {
            let threshold = ctx.options.rank_threshold_for(page.number);

            for block in &page.blocks {
                if !ctx.collector.is_heading_candidate(block) {
                    continue;
                }
                let Some(rank) = ctx.fonts.rank(block.max_font_size()) else {
                    continue;
                };
                if rank > threshold {
                    continue;
                }

                headings.push(HeadingCandidate {
                    level: HeadingLevel::from_rank(rank),
                    text: block.text(),
                    page: page.number,
                });
            }
        }

        Classification {
            headings,
            title: TitleDetector::from_top_of_first_page(ctx),
        }
    }
}
