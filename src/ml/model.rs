//! The trained heading model.

use std::fs;
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::dataset::{Dataset, LabeledExample};
use super::evaluate::EvaluationReport;
use super::forest::{ForestParams, RandomForest, Sample};
use super::label::Label;
use crate::error::{Error, Result};
use crate::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::options::TrainOptions;

/// Predicted label of one line and the model's confidence in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Most probable label
    pub label: Label,
    /// Probability of that label, in [0, 1]
    pub confidence: f32,
}

/// Result of training a model from a dataset.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// The fitted model
    pub model: HeadingModel,
    /// Examples used for fitting
    pub train_size: usize,
    /// Examples held out for evaluation
    pub holdout_size: usize,
    /// Dataset rows skipped as malformed
    pub malformed_rows: usize,
    /// Evaluation on the hold-out examples
    pub evaluation: EvaluationReport,
}

/// Random-forest classifier over [`FeatureVector`]s.
///
/// A model is immutable once trained or loaded, so one instance can be
/// shared between threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadingModel {
    feature_names: Vec<String>,
    labels: Vec<Label>,
    forest: RandomForest,
}

impl HeadingModel {
    /// Split a dataset, fit a model on the training part and evaluate it on
    /// the hold-out part.
    pub fn train(dataset: &Dataset, options: &TrainOptions) -> Result<TrainingOutcome> {
        let (train, holdout) = dataset.split(options);
        log::info!(
            "Training heading model on {} examples ({} held out, {} malformed rows skipped)",
            train.len(),
            holdout.len(),
            dataset.malformed_rows
        );

        let model = Self::fit(&train, options)?;
        let evaluation = model.evaluate(&holdout);
        log::info!("Hold-out accuracy {:.3}", evaluation.accuracy);

        Ok(TrainingOutcome {
            model,
            train_size: train.len(),
            holdout_size: holdout.len(),
            malformed_rows: dataset.malformed_rows,
            evaluation,
        })
    }

    /// Fit a model on all given examples.
    pub fn fit(examples: &[LabeledExample], options: &TrainOptions) -> Result<Self> {
        if examples.is_empty() {
            return Err(Error::InvalidTrainingData(
                "no usable training examples".to_string(),
            ));
        }

        let samples: Vec<Sample> = examples.iter().map(|e| e.features.to_array()).collect();
        let classes: Vec<usize> = examples.iter().map(|e| e.label.index()).collect();

        let default_features = (FEATURE_COUNT as f64).sqrt().round() as usize;
        let params = ForestParams {
            n_trees: options.n_trees.max(1),
            max_depth: options.max_depth,
            min_samples_split: options.min_samples_split.max(2),
            max_features: options
                .max_features
                .unwrap_or(default_features)
                .clamp(1, FEATURE_COUNT),
        };

        let forest = RandomForest::fit(&samples, &classes, Label::COUNT, params, options.seed);

        Ok(Self {
            feature_names: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
            labels: Label::ALL.to_vec(),
            forest,
        })
    }

    /// Class probabilities in [`Label::ALL`] order.
    pub fn probabilities(&self, features: &FeatureVector) -> Vec<f32> {
        self.forest.predict_proba(&features.to_array())
    }

    /// Predict the label of one line.
    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        let probabilities = self.probabilities(features);

        let mut best = 0;
        for (i, p) in probabilities.iter().enumerate() {
            if *p > probabilities[best] {
                best = i;
            }
        }

        Prediction {
            label: self.labels[best],
            confidence: probabilities[best],
        }
    }

    /// Predict labels for a batch of lines, in input order.
    pub fn predict_batch(&self, features: &[FeatureVector]) -> Vec<Prediction> {
        features.par_iter().map(|f| self.predict(f)).collect()
    }

    /// Evaluate the model on labeled examples.
    pub fn evaluate(&self, examples: &[LabeledExample]) -> EvaluationReport {
        let features: Vec<FeatureVector> = examples.iter().map(|e| e.features).collect();
        let predictions = self.predict_batch(&features);
        EvaluationReport::from_pairs(
            examples
                .iter()
                .zip(predictions)
                .map(|(e, p)| (e.label, p.label)),
        )
    }

    /// Number of trees in the forest.
    pub fn tree_count(&self) -> usize {
        self.forest.tree_count()
    }

    /// Write the model as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a model written by [`HeadingModel::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let model: HeadingModel = serde_json::from_str(&data)?;
        model.validate()?;
        Ok(model)
    }

    /// Load a model, training and saving one from the dataset on first use.
    ///
    /// Fails with [`Error::ConfigurationMissing`] when neither the model nor
    /// the dataset exists.
    pub fn load_or_bootstrap(
        model_path: &Path,
        dataset_path: Option<&Path>,
        options: &TrainOptions,
    ) -> Result<Self> {
        if model_path.exists() {
            log::debug!("Loading heading model from {}", model_path.display());
            return Self::load(model_path);
        }

        match dataset_path.filter(|p| p.exists()) {
            Some(dataset_path) => {
                log::info!(
                    "No model at {}, training from {}",
                    model_path.display(),
                    dataset_path.display()
                );
                let dataset = Dataset::from_csv_path(dataset_path)?;
                let outcome = Self::train(&dataset, options)?;
                outcome.model.save(model_path)?;
                Ok(outcome.model)
            }
            None => Err(Error::ConfigurationMissing(format!(
                "no heading model at {} and no training dataset available",
                model_path.display()
            ))),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.feature_names.len() != FEATURE_COUNT
            || self
                .feature_names
                .iter()
                .zip(FEATURE_NAMES.iter())
                .any(|(a, b)| a != b)
        {
            return Err(Error::InvalidModel(format!(
                "feature schema mismatch: {:?}",
                self.feature_names
            )));
        }
        if self.labels != Label::ALL {
            return Err(Error::InvalidModel(format!(
                "label set mismatch: {:?}",
                self.labels
            )));
        }
        if self.forest.n_classes() != Label::COUNT || !self.forest.is_well_formed() {
            return Err(Error::InvalidModel("malformed forest".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(font_size: f32, is_bold: f32, label: Label) -> LabeledExample {
        LabeledExample::new(
            FeatureVector {
                font_size,
                is_bold,
                relative_font_size: font_size / 10.0,
                ..Default::default()
            },
            label,
        )
    }

    fn toy_dataset() -> Dataset {
        let mut examples = Vec::new();
        for i in 0..10 {
            let jitter = i as f32 * 0.1;
            examples.push(example(24.0 + jitter, 1.0, Label::Title));
            examples.push(example(18.0 + jitter, 1.0, Label::H1));
            examples.push(example(14.0 + jitter, 1.0, Label::H2));
            examples.push(example(10.0 + jitter, 0.0, Label::Body));
            examples.push(example(10.0 + jitter, 0.0, Label::Body));
        }
        Dataset::from_examples(examples)
    }

    fn options() -> TrainOptions {
        TrainOptions::new().with_trees(15).with_max_features(FEATURE_COUNT)
    }

    #[test]
    fn test_train_and_predict() {
        let outcome = HeadingModel::train(&toy_dataset(), &options()).unwrap();
        assert_eq!(outcome.train_size + outcome.holdout_size, 50);
        assert!(outcome.evaluation.accuracy > 0.9);

        let model = outcome.model;
        let prediction = model.predict(&example(18.2, 1.0, Label::H1).features);
        assert_eq!(prediction.label, Label::H1);
        assert!(prediction.confidence > 0.5 && prediction.confidence <= 1.0);
    }

    #[test]
    fn test_missing_class_reports_zero_recall() {
        let mut dataset = toy_dataset();
        dataset.examples.retain(|e| e.label != Label::Title);

        let outcome = HeadingModel::train(&dataset, &options()).unwrap();
        let title = outcome.evaluation.metrics(Label::Title);
        assert_eq!(title.support, 0);
        assert_eq!(title.recall, 0.0);
    }

    #[test]
    fn test_fit_rejects_empty() {
        assert!(matches!(
            HeadingModel::fit(&[], &TrainOptions::default()),
            Err(Error::InvalidTrainingData(_))
        ));
    }

    #[test]
    fn test_predictions_are_independent() {
        let model = HeadingModel::fit(&toy_dataset().examples, &options()).unwrap();
        let a = example(14.1, 1.0, Label::H2).features;
        let b = example(10.3, 0.0, Label::Body).features;

        let single = model.predict(&a);
        let batch = model.predict_batch(&[b, a, b]);
        assert_eq!(batch[1], single);
    }

    #[test]
    fn test_validate_rejects_schema_mismatch() {
        let mut model = HeadingModel::fit(&toy_dataset().examples, &options()).unwrap();
        model.feature_names[0] = "size".to_string();
        assert!(matches!(model.validate(), Err(Error::InvalidModel(_))));
    }
}
