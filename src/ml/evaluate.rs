//! Hold-out evaluation of a trained model.

use std::fmt;

use super::label::Label;

/// Precision and recall of one label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    /// The label
    pub label: Label,
    /// Correct predictions of the label over all predictions of the label
    pub precision: f64,
    /// Correct predictions of the label over all examples of the label
    pub recall: f64,
    /// Examples of the label in the evaluated set
    pub support: usize,
}

/// Accuracy, per-label metrics and confusion matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    /// Number of evaluated examples
    pub samples: usize,
    /// Fraction of correct predictions (0 for an empty set)
    pub accuracy: f64,
    /// Metrics for every label in [`Label::ALL`] order
    pub classes: Vec<ClassMetrics>,
    /// `confusion[actual][predicted]` counts
    pub confusion: [[usize; Label::COUNT]; Label::COUNT],
}

impl EvaluationReport {
    /// Build a report from (actual, predicted) pairs.
    pub fn from_pairs<I: IntoIterator<Item = (Label, Label)>>(pairs: I) -> Self {
        let mut confusion = [[0usize; Label::COUNT]; Label::COUNT];
        for (actual, predicted) in pairs {
            confusion[actual.index()][predicted.index()] += 1;
        }

        let samples: usize = confusion.iter().flatten().sum();
        let correct: usize = (0..Label::COUNT).map(|i| confusion[i][i]).sum();

        let classes = Label::ALL
            .iter()
            .map(|&label| {
                let i = label.index();
                let support: usize = confusion[i].iter().sum();
                let predicted: usize = confusion.iter().map(|row| row[i]).sum();
                ClassMetrics {
                    label,
                    precision: fraction(confusion[i][i], predicted),
                    recall: fraction(confusion[i][i], support),
                    support,
                }
            })
            .collect();

        Self {
            samples,
            accuracy: fraction(correct, samples),
            classes,
            confusion,
        }
    }

    /// Metrics of one label.
    pub fn metrics(&self, label: Label) -> &ClassMetrics {
        &self.classes[label.index()]
    }
}

fn fraction(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Accuracy: {:.3} ({} hold-out samples)",
            self.accuracy, self.samples
        )?;
        writeln!(f, "{:<8}{:>10}{:>10}{:>10}", "label", "precision", "recall", "support")?;
        for m in &self.classes {
            writeln!(
                f,
                "{:<8}{:>10.3}{:>10.3}{:>10}",
                m.label.as_str(),
                m.precision,
                m.recall,
                m.support
            )?;
        }
        Ok(())
    }
}
