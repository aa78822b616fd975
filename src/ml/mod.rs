//! Supervised heading classification.
//!
//! A [`HeadingModel`] is a random forest trained offline from labeled line
//! features and loaded read-only for extraction.

mod dataset;
mod evaluate;
mod forest;
mod label;
mod model;

pub use dataset::{Dataset, LabeledExample};
pub use evaluate::{ClassMetrics, EvaluationReport};
pub use forest::{DecisionTree, ForestParams, RandomForest, Sample};
pub use label::Label;
pub use model::{HeadingModel, Prediction, TrainingOutcome};
