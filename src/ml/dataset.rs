//! Labeled training data.
//!
//! Training data is a CSV file with a header row, one row per text line, the
//! [`FEATURE_NAMES`] columns and a `label` column. Other columns such as
//! `text` or `page` may be present and are ignored.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::label::Label;
use crate::error::{Error, Result};
use crate::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::options::{StratifyBy, TrainOptions};

/// Feature vector with its true label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledExample {
    /// Feature values
    pub features: FeatureVector,
    /// True label
    pub label: Label,
}

impl LabeledExample {
    /// Create a new labeled example.
    pub fn new(features: FeatureVector, label: Label) -> Self {
        Self { features, label }
    }
}

/// A set of labeled examples loaded for training.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Usable examples
    pub examples: Vec<LabeledExample>,
    /// Rows skipped because a feature or the label was missing or invalid
    pub malformed_rows: usize,
}

impl Dataset {
    /// Create a dataset from examples.
    pub fn from_examples(examples: Vec<LabeledExample>) -> Self {
        Self {
            examples,
            malformed_rows: 0,
        }
    }

    /// Load a dataset from a CSV file.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_csv_reader(file)
    }

    /// Load a dataset from CSV data.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);

        let label_column = column("label").ok_or_else(|| {
            Error::InvalidTrainingData("missing required column \"label\"".to_string())
        })?;
        let feature_columns: Vec<Option<usize>> =
            FEATURE_NAMES.iter().map(|n| column(*n)).collect();
        for (name, col) in FEATURE_NAMES.iter().zip(&feature_columns) {
            if col.is_none() {
                log::warn!("Training data has no {:?} column", name);
            }
        }

        let mut dataset = Dataset::default();
        // Byte records: undecodable text in an ignored column must not fail the load.
        for (row, record) in reader.byte_records().enumerate() {
            let record = record?;
            match parse_row(&record, label_column, &feature_columns) {
                Ok(example) => dataset.examples.push(example),
                Err(reason) => {
                    log::warn!("Skipping training row {}: {}", row + 1, reason);
                    dataset.malformed_rows += 1;
                }
            }
        }

        if dataset.malformed_rows > 0 {
            log::warn!(
                "Skipped {} malformed training rows, kept {}",
                dataset.malformed_rows,
                dataset.examples.len()
            );
        }

        Ok(dataset)
    }

    /// Number of usable examples.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Check if there are no usable examples.
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Number of examples per label, in [`Label::ALL`] order.
    pub fn label_counts(&self) -> [usize; Label::COUNT] {
        let mut counts = [0; Label::COUNT];
        for example in &self.examples {
            counts[example.label.index()] += 1;
        }
        counts
    }

    /// Split into training and hold-out examples.
    ///
    /// With [`StratifyBy::Label`] every label is split on its own, so a label
    /// with at least two examples always lands in both parts.
    pub fn split(&self, options: &TrainOptions) -> (Vec<LabeledExample>, Vec<LabeledExample>) {
        let mut rng = StdRng::seed_from_u64(options.seed);

        let groups: Vec<Vec<usize>> = match options.stratify {
            StratifyBy::Label => Label::ALL
                .iter()
                .map(|label| {
                    (0..self.examples.len())
                        .filter(|&i| self.examples[i].label == *label)
                        .collect()
                })
                .collect(),
            StratifyBy::None => vec![(0..self.examples.len()).collect()],
        };

        let mut train = Vec::new();
        let mut holdout = Vec::new();
        for mut group in groups {
            group.shuffle(&mut rng);
            let n = group.len();
            let n_train = if n < 2 {
                n
            } else {
                ((n as f64 * options.train_ratio).round() as usize).clamp(1, n - 1)
            };
            train.extend(group[..n_train].iter().map(|&i| self.examples[i].clone()));
            holdout.extend(group[n_train..].iter().map(|&i| self.examples[i].clone()));
        }

        (train, holdout)
    }
}

fn parse_row(
    record: &csv::ByteRecord,
    label_column: usize,
    feature_columns: &[Option<usize>],
) -> std::result::Result<LabeledExample, String> {
    let label = field(record, Some(label_column), "label")?
        .parse::<Label>()
        .map_err(|e| e.to_string())?;

    let mut values = [0.0f32; FEATURE_COUNT];
    for (i, &col) in feature_columns.iter().enumerate() {
        let raw = field(record, col, FEATURE_NAMES[i])?;
        values[i] = parse_value(raw)
            .ok_or_else(|| format!("invalid {} value {:?}", FEATURE_NAMES[i], raw))?;
    }

    Ok(LabeledExample::new(FeatureVector::from_array(values), label))
}

/// Non-empty UTF-8 text of one column.
fn field<'r>(
    record: &'r csv::ByteRecord,
    column: Option<usize>,
    name: &str,
) -> std::result::Result<&'r str, String> {
    let bytes = column
        .and_then(|c| record.get(c))
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("missing {}", name))?;
    std::str::from_utf8(bytes).map_err(|_| format!("{} is not valid UTF-8", name))
}

fn parse_value(raw: &str) -> Option<f32> {
    if raw.eq_ignore_ascii_case("true") {
        return Some(1.0);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Some(0.0);
    }
    raw.parse::<f32>().ok().filter(|v| v.is_finite())
}
