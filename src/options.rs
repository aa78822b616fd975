//! Extraction and training options.

use std::path::PathBuf;

/// Options for extracting an outline from a document layout.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Maximum characters of a span or a heading block
    pub max_heading_len: usize,

    /// Maximum visual lines of a heading block
    pub max_heading_lines: usize,

    /// Fraction of the first page height in which the title is looked for
    pub title_top_ratio: f32,

    /// Highest accepted font rank on page 1
    pub first_page_rank_threshold: usize,

    /// Highest accepted font rank on the other pages
    pub rank_threshold: usize,

    /// Numbered short lines needed to call a page form-like
    pub form_min_lines: usize,

    /// Lines shorter than this many characters count as short
    pub form_short_line_len: usize,

    /// Largest leading number that counts as a form field number
    pub form_max_leading_number: u32,

    /// Apply NFKC normalization to span text
    pub normalize_unicode: bool,

    /// Minimum confidence of a learned heading prediction
    pub min_confidence: f32,

    /// Insert the detected title as the first H1 entry
    pub inject_title: bool,

    /// Which classification strategy to use
    pub classifier: ClassifierKind,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum heading length in characters.
    pub fn with_max_heading_len(mut self, len: usize) -> Self {
        self.max_heading_len = len;
        self
    }

    /// Set the maximum number of lines of a heading block.
    pub fn with_max_heading_lines(mut self, lines: usize) -> Self {
        self.max_heading_lines = lines;
        self
    }

    /// Set the title search band as a fraction of page height.
    pub fn with_title_top_ratio(mut self, ratio: f32) -> Self {
        self.title_top_ratio = ratio;
        self
    }

    /// Set the rank thresholds for page 1 and for the other pages.
    pub fn with_rank_thresholds(mut self, first_page: usize, other_pages: usize) -> Self {
        self.first_page_rank_threshold = first_page;
        self.rank_threshold = other_pages;
        self
    }

    /// Set the form detection thresholds.
    pub fn with_form_thresholds(mut self, min_lines: usize, short_line_len: usize) -> Self {
        self.form_min_lines = min_lines;
        self.form_short_line_len = short_line_len;
        self
    }

    /// Enable or disable NFKC normalization.
    pub fn with_unicode_normalization(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }

    /// Set the minimum confidence for learned predictions.
    pub fn with_min_confidence(mut self, confidence: f32) -> Self {
        self.min_confidence = confidence;
        self
    }

    /// Enable or disable title injection into the outline.
    pub fn with_title_injection(mut self, inject: bool) -> Self {
        self.inject_title = inject;
        self
    }

    /// Set the classification strategy.
    pub fn with_classifier(mut self, classifier: ClassifierKind) -> Self {
        self.classifier = classifier;
        self
    }

    /// Use the learned classifier with the given model artifact.
    pub fn learned(mut self, model_path: impl Into<PathBuf>) -> Self {
        self.classifier = ClassifierKind::Learned {
            model_path: model_path.into(),
            dataset_path: None,
        };
        self
    }

    /// Rank threshold that applies to a page (1-indexed).
    pub fn rank_threshold_for(&self, page: u32) -> usize {
        if page == 1 {
            self.first_page_rank_threshold
        } else {
            self.rank_threshold
        }
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_heading_len: 120,
            max_heading_lines: 3,
            title_top_ratio: 0.15,
            first_page_rank_threshold: 4,
            rank_threshold: 3,
            form_min_lines: 5,
            form_short_line_len: 40,
            form_max_leading_number: 20,
            normalize_unicode: true,
            min_confidence: 0.0,
            inject_title: true,
            classifier: ClassifierKind::RankHeuristic,
        }
    }
}

/// Classification strategy selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClassifierKind {
    /// Font-size rank heuristic
    #[default]
    RankHeuristic,
    /// Trained random forest over line features
    Learned {
        /// Model artifact to load
        model_path: PathBuf,
        /// Labeled dataset used to train the model when the artifact is missing
        dataset_path: Option<PathBuf>,
    },
}

/// Options for training a heading model.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Fraction of examples used for training; the rest is held out
    pub train_ratio: f64,

    /// How the train/hold-out split is stratified
    pub stratify: StratifyBy,

    /// Seed for the split and the forest
    pub seed: u64,

    /// Number of trees in the forest
    pub n_trees: usize,

    /// Maximum tree depth
    pub max_depth: usize,

    /// Minimum samples a node needs to be split
    pub min_samples_split: usize,

    /// Features tried per split (None = square root of the feature count)
    pub max_features: Option<usize>,
}

impl TrainOptions {
    /// Create new training options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the training fraction.
    pub fn with_train_ratio(mut self, ratio: f64) -> Self {
        self.train_ratio = ratio;
        self
    }

    /// Set the stratification key.
    pub fn with_stratify(mut self, stratify: StratifyBy) -> Self {
        self.stratify = stratify;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of trees.
    pub fn with_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    /// Set the maximum tree depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the number of features tried per split.
    pub fn with_max_features(mut self, features: usize) -> Self {
        self.max_features = Some(features);
        self
    }
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            train_ratio: 0.8,
            stratify: StratifyBy::Label,
            seed: 42,
            n_trees: 100,
            max_depth: 12,
            min_samples_split: 2,
            max_features: None,
        }
    }
}

/// Stratification key of the train/hold-out split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StratifyBy {
    /// Split each label separately
    #[default]
    Label,
    /// Plain shuffled split
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_options_builder() {
        let options = ExtractOptions::new()
            .with_max_heading_len(80)
            .with_rank_thresholds(2, 1)
            .with_title_injection(false);

        assert_eq!(options.max_heading_len, 80);
        assert_eq!(options.rank_threshold_for(1), 2);
        assert_eq!(options.rank_threshold_for(2), 1);
        assert!(!options.inject_title);
    }

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert_eq!(options.max_heading_len, 120);
        assert_eq!(options.max_heading_lines, 3);
        assert_eq!(options.form_min_lines, 5);
        assert_eq!(options.form_short_line_len, 40);
        assert_eq!(options.classifier, ClassifierKind::RankHeuristic);

        let train = TrainOptions::default();
        assert!((train.train_ratio - 0.8).abs() < f64::EPSILON);
        assert_eq!(train.stratify, StratifyBy::Label);
    }

    #[test]
    fn test_learned_shortcut() {
        let options = ExtractOptions::new().learned("model.json");
        assert!(matches!(
            options.classifier,
            ClassifierKind::Learned { dataset_path: None, .. }
        ));
    }
}
