//! The outline extraction pipeline.
//!
//! For every document: collect spans, compute the font statistics, detect
//! form pages, run the configured classifier and assemble the outline. The
//! extractor holds no per-document state, so one instance can process many
//! documents concurrently.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

use crate::assemble::OutlineAssembler;
use crate::classify::{DocumentContext, HeadingClassifier, LearnedClassifier, RankHeuristic};
use crate::error::{Error, Result};
use crate::layout::{FontStatistics, FormPageDetector, SpanCollector};
use crate::ml::HeadingModel;
use crate::model::{DocumentLayout, Outline};
use crate::options::{ClassifierKind, ExtractOptions, TrainOptions};

/// Extracts outlines from document layouts.
///
/// # Example
///
/// ```
/// use pdf_outline::{BBox, DocumentLayout, LayoutBlock, OutlineExtractor, PageLayout};
///
/// let mut page = PageLayout::letter();
/// page.add_block(LayoutBlock::single("Report", 24.0, BBox::new(72.0, 40.0, 300.0, 64.0)));
/// page.add_block(LayoutBlock::single("Intro", 14.0, BBox::new(72.0, 400.0, 300.0, 414.0)));
/// let mut layout = DocumentLayout::new();
/// layout.add_page(page);
///
/// let outline = OutlineExtractor::heuristic().extract(&layout);
/// assert_eq!(outline.title, "Report");
/// ```
#[derive(Clone)]
pub struct OutlineExtractor {
    options: ExtractOptions,
    classifier: Arc<dyn HeadingClassifier>,
    collector: SpanCollector,
    form_detector: FormPageDetector,
}

impl OutlineExtractor {
    /// Create an extractor with the rank heuristic and default options.
    pub fn heuristic() -> Self {
        Self::with_classifier(ExtractOptions::default(), Arc::new(RankHeuristic::new()))
    }

    /// Create an extractor using a trained model.
    pub fn learned(options: ExtractOptions, model: Arc<HeadingModel>) -> Self {
        Self::with_classifier(options, Arc::new(LearnedClassifier::new(model)))
    }

    /// Create an extractor with an explicit classifier.
    pub fn with_classifier(options: ExtractOptions, classifier: Arc<dyn HeadingClassifier>) -> Self {
        Self {
            collector: SpanCollector::new(&options),
            form_detector: FormPageDetector::new(&options),
            options,
            classifier,
        }
    }

    /// Create an extractor for the classifier selected in the options.
    ///
    /// For [`ClassifierKind::Learned`] the model is loaded, or trained from the
    /// dataset and saved when the artifact does not exist yet.
    pub fn from_options(options: ExtractOptions, train_options: &TrainOptions) -> Result<Self> {
        let classifier: Arc<dyn HeadingClassifier> = match &options.classifier {
            ClassifierKind::RankHeuristic => Arc::new(RankHeuristic::new()),
            ClassifierKind::Learned {
                model_path,
                dataset_path,
            } => {
                let model = HeadingModel::load_or_bootstrap(
                    model_path,
                    dataset_path.as_deref(),
                    train_options,
                )?;
                Arc::new(LearnedClassifier::new(Arc::new(model)))
            }
        };
        Ok(Self::with_classifier(options, classifier))
    }

    /// The extraction options.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Name of the active classifier.
    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Extract the outline of one document.
    ///
    /// A document without extractable text yields an empty outline.
    pub fn extract(&self, layout: &DocumentLayout) -> Outline {
        log::trace!("Collecting spans from {} layout pages", layout.page_count());
        let doc = self.collector.collect(layout);
        if doc.is_empty() {
            log::debug!("No extractable text spans, returning an empty outline");
            return Outline::default();
        }

        let fonts = FontStatistics::from_document(&doc);
        log::debug!(
            "{} pages, {} distinct font sizes, body size {:?}",
            doc.pages.len(),
            fonts.distinct_sizes(),
            fonts.body_size()
        );

        let form_pages = self.form_detector.form_pages(&doc);

        let ctx = DocumentContext {
            doc: &doc,
            fonts: &fonts,
            collector: &self.collector,
            options: &self.options,
        };
        let classification = self.classifier.classify(&ctx);
        log::debug!(
            "{} classifier produced {} heading candidates",
            self.classifier.name(),
            classification.headings.len()
        );

        OutlineAssembler::new(self.options.inject_title).assemble(
            classification.headings,
            &form_pages,
            classification.title,
        )
    }

    /// Extract outlines of many documents in parallel, in input order.
    pub fn extract_batch(&self, layouts: &[DocumentLayout]) -> Vec<Outline> {
        layouts.par_iter().map(|l| self.extract(l)).collect()
    }

    /// Read a layout JSON file and extract its outline.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<Outline> {
        let layout = load_layout(path)?;
        Ok(self.extract(&layout))
    }
}

/// Read a document layout from a JSON file.
///
/// Missing or undecodable files are reported as [`Error::InputUnavailable`].
pub fn load_layout<P: AsRef<Path>>(path: P) -> Result<DocumentLayout> {
    let path = path.as_ref();
    let name = path.display().to_string();
    let data = fs::read_to_string(path).map_err(|e| Error::input_unavailable(&name, e))?;
    serde_json::from_str(&data).map_err(|e| Error::input_unavailable(&name, e))
}
