//! Line labels predicted by the heading model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::HeadingLevel;

/// Class of a text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Label {
    /// Document title
    Title,
    /// Top-level heading
    H1,
    /// Second-level heading
    H2,
    /// Third-level heading
    H3,
    /// Anything else
    Body,
}

impl Label {
    /// Number of labels.
    pub const COUNT: usize = 5;

    /// All labels in class-index order.
    pub const ALL: [Label; Label::COUNT] = [Label::Title, Label::H1, Label::H2, Label::H3, Label::Body];

    /// Class index of the label.
    pub fn index(self) -> usize {
        match self {
            Label::Title => 0,
            Label::H1 => 1,
            Label::H2 => 2,
            Label::H3 => 3,
            Label::Body => 4,
        }
    }

    /// Label for a class index.
    pub fn from_index(index: usize) -> Option<Label> {
        Label::ALL.get(index).copied()
    }

    /// Outline level for heading labels.
    pub fn heading_level(self) -> Option<HeadingLevel> {
        match self {
            Label::H1 => Some(HeadingLevel::H1),
            Label::H2 => Some(HeadingLevel::H2),
            Label::H3 => Some(HeadingLevel::H3),
            Label::Title | Label::Body => None,
        }
    }

    /// Name as used in training data.
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Title => "Title",
            Label::H1 => "H1",
            Label::H2 => "H2",
            Label::H3 => "H3",
            Label::Body => "Body",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Label::ALL
            .iter()
            .copied()
            .find(|l| l.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidTrainingData(format!("Unknown label: {:?}", s)))
    }
}
