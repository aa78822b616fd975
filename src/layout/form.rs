//! Form and numbered-table page detection.
//!
//! Pages made of many short lines that start with a small field number
//! ("1 Name", "2 Address", ...) produce false headings, so the whole page is
//! excluded from the outline.

use std::collections::BTreeSet;

use regex::Regex;

use super::collector::CollectedDocument;
use crate::options::ExtractOptions;

/// Detector for form-like pages.
#[derive(Debug, Clone)]
pub struct FormPageDetector {
    short_line_len: usize,
    min_lines: usize,
    max_leading_number: u32,
    leading_number_regex: Regex,
}

impl FormPageDetector {
    /// Create a detector from extraction options.
    pub fn new(options: &ExtractOptions) -> Self {
        Self {
            short_line_len: options.form_short_line_len,
            min_lines: options.form_min_lines,
            max_leading_number: options.form_max_leading_number,
            leading_number_regex: Regex::new(r"^\s*(\d+)").unwrap(),
        }
    }

    /// Check if a line is short and starts with a field number.
    pub fn is_numbered_short_line(&self, line: &str) -> bool {
        if line.chars().count() >= self.short_line_len {
            return false;
        }

        self.leading_number_regex
            .captures(line)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .map(|n| (1..=self.max_leading_number).contains(&n))
            .unwrap_or(false)
    }

    /// Check if the lines of one page look like a form.
    pub fn is_form_like<S: AsRef<str>>(&self, lines: &[S]) -> bool {
        let count = lines
            .iter()
            .filter(|l| self.is_numbered_short_line(l.as_ref()))
            .count();
        count >= self.min_lines
    }

    /// Numbers of all form-like pages of a document.
    pub fn form_pages(&self, doc: &CollectedDocument) -> BTreeSet<u32> {
        doc.pages
            .iter()
            .filter(|page| self.is_form_like(&page.line_texts()))
            .map(|page| {
                log::debug!("Page {} looks like a form, suppressing headings", page.number);
                page.number
            })
            .collect()
    }
}
