//! # pdf-outline
//!
//! Title and heading outline extraction from positioned PDF text.
//!
//! The library consumes the span-level layout a PDF layout engine produces
//! (pages of blocks, lines and spans with font size and bounding boxes) and
//! emits a JSON-serializable outline: the document title plus an ordered
//! list of H1-H3 headings with their page numbers.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_outline::{load_layout, extract_outline, JsonFormat};
//!
//! fn main() -> pdf_outline::Result<()> {
//!     let layout = load_layout("document.layout.json")?;
//!     let outline = extract_outline(&layout);
//!     println!("{}", outline.to_json(JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Rank heuristic**: headings from the document's font size ranking
//! - **Learned classifier**: a random forest over per-line layout features
//! - **Form suppression**: numbered-field form pages contribute no headings
//! - **Parallel processing**: Uses Rayon for batches, pages and tree training

pub mod assemble;
pub mod classify;
pub mod error;
pub mod extract;
pub mod features;
pub mod layout;
pub mod ml;
pub mod model;
pub mod options;

// Re-export commonly used types
pub use assemble::OutlineAssembler;
pub use classify::{Classification, HeadingCandidate, HeadingClassifier};
pub use error::{Error, Result};
pub use extract::{load_layout, OutlineExtractor};
pub use features::{FeatureExtractor, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use ml::{Dataset, EvaluationReport, HeadingModel, Label, Prediction, TrainingOutcome};
pub use model::{
    BBox, DocumentLayout, HeadingEntry, HeadingLevel, JsonFormat, LayoutBlock, LayoutLine,
    LayoutSpan, Outline, PageLayout,
};
pub use options::{ClassifierKind, ExtractOptions, StratifyBy, TrainOptions};

use std::path::Path;
use std::sync::Arc;

/// Extract the outline of a document with the rank heuristic.
///
/// # Example
///
/// ```
/// use pdf_outline::{extract_outline, DocumentLayout};
///
/// let outline = extract_outline(&DocumentLayout::new());
/// assert!(outline.is_empty());
/// ```
pub fn extract_outline(layout: &DocumentLayout) -> Outline {
    OutlineExtractor::heuristic().extract(layout)
}

/// Extract the outline of a document with custom options.
///
/// A learned classifier in the options is loaded (or bootstrapped from its
/// dataset) first, so this can fail with a configuration error.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{extract_outline_with_options, load_layout, ExtractOptions};
///
/// let layout = load_layout("document.layout.json")?;
/// let options = ExtractOptions::new().learned("heading_model.json");
/// let outline = extract_outline_with_options(&layout, options)?;
/// # Ok::<(), pdf_outline::Error>(())
/// ```
pub fn extract_outline_with_options(
    layout: &DocumentLayout,
    options: ExtractOptions,
) -> Result<Outline> {
    let extractor = OutlineExtractor::from_options(options, &TrainOptions::default())?;
    Ok(extractor.extract(layout))
}

/// Read a layout JSON file and extract its outline with the rank heuristic.
pub fn extract_outline_from_file<P: AsRef<Path>>(path: P) -> Result<Outline> {
    OutlineExtractor::heuristic().extract_file(path)
}

/// Train a heading model from a labeled CSV file.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{train_model, TrainOptions};
///
/// let outcome = train_model("labeled_lines.csv", &TrainOptions::default())?;
/// println!("{}", outcome.evaluation);
/// outcome.model.save("heading_model.json")?;
/// # Ok::<(), pdf_outline::Error>(())
/// ```
pub fn train_model<P: AsRef<Path>>(path: P, options: &TrainOptions) -> Result<TrainingOutcome> {
    let dataset = Dataset::from_csv_path(path)?;
    HeadingModel::train(&dataset, options)
}

/// Builder for outline extraction.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::Outliner;
///
/// let outline = Outliner::new()
///     .with_max_heading_len(80)
///     .without_title_injection()
///     .extract_file("document.layout.json")?;
/// # Ok::<(), pdf_outline::Error>(())
/// ```
pub struct Outliner {
    options: ExtractOptions,
    train_options: TrainOptions,
    model: Option<Arc<HeadingModel>>,
}

impl Outliner {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            options: ExtractOptions::default(),
            train_options: TrainOptions::default(),
            model: None,
        }
    }

    /// Set the maximum heading length in characters.
    pub fn with_max_heading_len(mut self, len: usize) -> Self {
        self.options = self.options.with_max_heading_len(len);
        self
    }

    /// Set the rank thresholds for page 1 and later pages.
    pub fn with_rank_thresholds(mut self, first_page: usize, other_pages: usize) -> Self {
        self.options = self.options.with_rank_thresholds(first_page, other_pages);
        self
    }

    /// Do not insert the title as the first outline entry.
    pub fn without_title_injection(mut self) -> Self {
        self.options = self.options.with_title_injection(false);
        self
    }

    /// Use a model file, bootstrapped from `dataset` when missing.
    pub fn with_model_file(
        mut self,
        model: impl Into<std::path::PathBuf>,
        dataset: Option<std::path::PathBuf>,
    ) -> Self {
        self.options = self.options.with_classifier(ClassifierKind::Learned {
            model_path: model.into(),
            dataset_path: dataset,
        });
        self
    }

    /// Use an already loaded model.
    pub fn with_model(mut self, model: Arc<HeadingModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the training options used when a model must be bootstrapped.
    pub fn with_train_options(mut self, options: TrainOptions) -> Self {
        self.train_options = options;
        self
    }

    /// Build the extractor.
    pub fn build(self) -> Result<OutlineExtractor> {
        match self.model {
            Some(model) => Ok(OutlineExtractor::learned(self.options, model)),
            None => OutlineExtractor::from_options(self.options, &self.train_options),
        }
    }

    /// Build the extractor and run it on one layout.
    pub fn extract(self, layout: &DocumentLayout) -> Result<Outline> {
        Ok(self.build()?.extract(layout))
    }

    /// Build the extractor and run it on a layout JSON file.
    pub fn extract_file<P: AsRef<Path>>(self, path: P) -> Result<Outline> {
        self.build()?.extract_file(path)
    }
}

impl Default for Outliner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outliner_default_is_heuristic() {
        let extractor = Outliner::new().build().unwrap();
        assert_eq!(extractor.classifier_name(), "rank-heuristic");
    }

    #[test]
    fn test_outliner_disables_injection() {
        let extractor = Outliner::new().without_title_injection().build().unwrap();
        assert!(!extractor.options().inject_title);
    }
}
