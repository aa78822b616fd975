//! Learned heading classifier.

use std::sync::Arc;

use super::{Classification, DocumentContext, HeadingCandidate, HeadingClassifier, TitleDetector};
use crate::features::{FeatureExtractor, FeatureVector};
use crate::ml::HeadingModel;

/// Classifies every line with a trained [`HeadingModel`].
#[derive(Debug, Clone)]
pub struct LearnedClassifier {
    model: Arc<HeadingModel>,
    extractor: FeatureExtractor,
}

impl LearnedClassifier {
    /// Create a classifier around a shared model.
    pub fn new(model: Arc<HeadingModel>) -> Self {
        Self {
            model,
            extractor: FeatureExtractor::new(),
        }
    }
}

impl HeadingClassifier for LearnedClassifier {
    fn name(&self) -> &str {
        "learned"
    }

    fn classify(&self, ctx: &DocumentContext<'_>) -> Classification {
        let lines = self.extractor.extract(ctx.doc);
        let features: Vec<FeatureVector> = lines.iter().map(|l| l.features).collect();
        let predictions = self.model.predict_batch(&features);

        let headings = lines
            .iter()
            .zip(&predictions)
            .filter(|(line, p)| {
                p.confidence >= ctx.options.min_confidence
                    && line.text.chars().count() <= ctx.options.max_heading_len
            })
            .filter_map(|(line, p)| {
                p.label.heading_level().map(|level| HeadingCandidate {
                    level,
                    text: line.text.clone(),
                    page: line.page,
                })
            })
            .collect();

        Classification {
            headings,
            title: TitleDetector::from_predictions(&lines, &predictions),
        }
    }
}
