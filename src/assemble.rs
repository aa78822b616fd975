//! Outline assembly.
//!
//! Turns the heading candidates of a document into the final [`Outline`]:
//! candidates on form pages are dropped, the rest are ordered by page and
//! text, duplicates are removed and the title is injected as the first entry
//! unless page 1 is itself a form page.

use std::collections::{BTreeSet, HashSet};

use crate::classify::HeadingCandidate;
use crate::model::{HeadingEntry, HeadingLevel, Outline};

/// Builds outlines from classified candidates.
#[derive(Debug, Clone, Copy)]
pub struct OutlineAssembler {
    inject_title: bool,
}

impl OutlineAssembler {
    /// Create an assembler.
    pub fn new(inject_title: bool) -> Self {
        Self { inject_title }
    }

    /// Assemble the outline of one document.
    pub fn assemble(
        &self,
        candidates: Vec<HeadingCandidate>,
        form_pages: &BTreeSet<u32>,
        title: Option<String>,
    ) -> Outline {
        let mut entries: Vec<HeadingEntry> = candidates
            .into_iter()
            .filter(|c| !form_pages.contains(&c.page))
            .map(|c| HeadingEntry::new(c.level, c.text, c.page))
            .collect();

        entries.sort_by(|a, b| a.page.cmp(&b.page).then_with(|| a.text.cmp(&b.text)));

        let mut seen = HashSet::new();
        entries.retain(|e| seen.insert((e.level, e.text.clone(), e.page)));

        let title = title.unwrap_or_default();
        if self.inject_title && !title.is_empty() && !form_pages.contains(&1) {
            let present = entries.iter().any(|e| e.page == 1 && e.text == title);
            if !present {
                entries.insert(0, HeadingEntry::new(HeadingLevel::H1, title.clone(), 1));
            }
        }

        Outline {
            title,
            outline: entries,
        }
    }
}

impl Default for OutlineAssembler {
    fn default() -> Self {
        Self::new(true)
    }
}
