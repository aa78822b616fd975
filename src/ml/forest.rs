//! Random forest of CART decision trees.
//!
//! Trees split on a single feature at a time using Gini impurity and store a
//! class probability distribution in every leaf. The forest averages the leaf
//! distributions of its trees. Every tree draws its bootstrap sample and its
//! feature subsets from its own seeded generator, so training is
//! deterministic even though trees are built in parallel.

use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::features::FEATURE_COUNT;

/// One row of feature values.
pub type Sample = [f32; FEATURE_COUNT];

/// Tree-growing parameters.
#[derive(Debug, Clone, Copy)]
pub struct ForestParams {
    /// Number of trees
    pub n_trees: usize,
    /// Maximum depth of a tree (root = depth 0)
    pub max_depth: usize,
    /// Minimum samples a node needs to be split
    pub min_samples_split: usize,
    /// Features tried per split
    pub max_features: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        probabilities: Vec<f32>,
    },
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
}

/// A single classification tree stored as a node arena, root at index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct TreeBuilder<'a> {
    samples: &'a [Sample],
    classes: &'a [usize],
    n_classes: usize,
    params: ForestParams,
    rng: StdRng,
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree over the given sample indices (duplicates allowed).
    pub fn fit(
        samples: &[Sample],
        classes: &[usize],
        n_classes: usize,
        indices: Vec<usize>,
        params: ForestParams,
        rng: StdRng,
    ) -> Self {
        let mut builder = TreeBuilder {
            samples,
            classes,
            n_classes,
            params,
            rng,
            nodes: Vec::new(),
        };
        builder.grow(indices, 0);
        Self {
            nodes: builder.nodes,
        }
    }

    /// Class distribution of the leaf a sample falls into.
    pub fn predict_proba(&self, sample: &Sample) -> &[f32] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { probabilities } => return probabilities,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if sample[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check that every node reference and leaf is consistent.
    pub(crate) fn is_well_formed(&self, n_classes: usize) -> bool {
        !self.nodes.is_empty()
            && self.nodes.iter().enumerate().all(|(i, node)| match node {
                Node::Leaf { probabilities } => probabilities.len() == n_classes,
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    *feature < FEATURE_COUNT
                        && *left > i
                        && *right > i
                        && *left < self.nodes.len()
                        && *right < self.nodes.len()
                }
            })
    }
}

impl TreeBuilder<'_> {
    fn grow(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let counts = self.class_counts(&indices);
        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;

        if is_pure
            || depth >= self.params.max_depth
            || indices.len() < self.params.min_samples_split
        {
            return self.push_leaf(&counts, indices.len());
        }

        let Some((feature, threshold)) = self.best_split(&indices, &counts) else {
            return self.push_leaf(&counts, indices.len());
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.samples[i][feature] <= threshold);
        if left_indices.is_empty() || right_indices.is_empty() {
            return self.push_leaf(&counts, indices.len());
        }

        // Reserve the slot so children get higher indices than their parent.
        let node = self.nodes.len();
        self.nodes.push(Node::Leaf {
            probabilities: Vec::new(),
        });
        let left = self.grow(left_indices, depth + 1);
        let right = self.grow(right_indices, depth + 1);
        self.nodes[node] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        node
    }

    fn push_leaf(&mut self, counts: &[usize], total: usize) -> usize {
        let probabilities = counts
            .iter()
            .map(|&c| if total > 0 { c as f32 / total as f32 } else { 0.0 })
            .collect();
        self.nodes.push(Node::Leaf { probabilities });
        self.nodes.len() - 1
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &i in indices {
            counts[self.classes[i]] += 1;
        }
        counts
    }

    /// Best (feature, threshold) among a random feature subset, if any split
    /// lowers the impurity.
    ///
    /// Features are visited in random order; the search stops after
    /// `max_features` of them once a valid split has been found.
    fn best_split(&mut self, indices: &[usize], counts: &[usize]) -> Option<(usize, f32)> {
        let total = indices.len();
        let parent_impurity = gini(counts, total);
        let features = rand::seq::index::sample(&mut self.rng, FEATURE_COUNT, FEATURE_COUNT);

        let mut best: Option<(usize, f32, f32)> = None;
        let mut sorted = indices.to_vec();

        for (visited, feature) in features.iter().enumerate() {
            if visited >= self.params.max_features && best.is_some() {
                break;
            }
            sorted.sort_by(|&a, &b| {
                self.samples[a][feature]
                    .partial_cmp(&self.samples[b][feature])
                    .unwrap_or(Ordering::Equal)
            });

            let mut left_counts = vec![0usize; self.n_classes];
            let mut right_counts = counts.to_vec();

            for pos in 0..total - 1 {
                let class = self.classes[sorted[pos]];
                left_counts[class] += 1;
                right_counts[class] -= 1;

                let value = self.samples[sorted[pos]][feature];
                let next = self.samples[sorted[pos + 1]][feature];
                if value >= next {
                    continue;
                }

                let n_left = pos + 1;
                let n_right = total - n_left;
                let impurity = (n_left as f32 * gini(&left_counts, n_left)
                    + n_right as f32 * gini(&right_counts, n_right))
                    / total as f32;

                if impurity + 1e-7 < parent_impurity
                    && best.map_or(true, |(_, _, b)| impurity < b)
                {
                    let mid = (value + next) / 2.0;
                    let threshold = if mid < next { mid } else { value };
                    best = Some((feature, threshold, impurity));
                }
            }
        }

        best.map(|(feature, threshold, _)| (feature, threshold))
    }
}

fn gini(counts: &[usize], total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f32;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f32 / total;
            p * p
        })
        .sum::<f32>()
}

/// An ensemble of decision trees averaging their leaf distributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Train a forest. `classes` holds one class index per sample.
    pub fn fit(
        samples: &[Sample],
        classes: &[usize],
        n_classes: usize,
        params: ForestParams,
        seed: u64,
    ) -> Self {
        let n = samples.len();
        let trees = (0..params.n_trees.max(1))
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(samples, classes, n_classes, bootstrap, params, rng)
            })
            .collect();

        Self { n_classes, trees }
    }

    /// Average class distribution over all trees.
    pub fn predict_proba(&self, sample: &Sample) -> Vec<f32> {
        let mut sum = vec![0.0f32; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in sum.iter_mut().zip(tree.predict_proba(sample)) {
                *acc += p;
            }
        }
        let n = self.trees.len().max(1) as f32;
        sum.iter_mut().for_each(|p| *p /= n);
        sum
    }

    /// Number of classes the forest predicts.
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Number of trees.
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        !self.trees.is_empty() && self.trees.iter().all(|t| t.is_well_formed(self.n_classes))
    }
}
