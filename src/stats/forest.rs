//! Random Forest Regressor
//! Bagged regression trees with impurity-decrease feature importances.

use crate::config::ForestSettings;
use crate::data::{FeatureMatrix, TargetVector};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::cmp::Ordering;

/// Anything that can be fit to a feature matrix and report how much each
/// feature contributed.
pub trait ImportanceModel {
    fn fit(&mut self, x: &FeatureMatrix, y: &TargetVector);

    /// One score per feature column, in column order.
    fn feature_importances(&self) -> &[f64];
}

/// Random forest configuration
#[derive(Debug, Clone)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features tried per split (all if None)
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self::from(&ForestSettings::default())
    }
}

impl From<&ForestSettings> for ForestConfig {
    fn from(settings: &ForestSettings) -> Self {
        Self {
            n_trees: settings.n_trees.max(1),
            max_depth: settings.max_depth,
            min_samples_split: settings.min_samples_split.max(2),
            min_samples_leaf: settings.min_samples_leaf.max(1),
            max_features: settings.max_features,
            bootstrap: true,
            seed: settings.seed,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Best split found for a node.
struct Split {
    feature: usize,
    threshold: f64,
    /// Reduction in summed squared error.
    gain: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

/// Sum and sum of squares of the targets at `indices`.
fn moments(y: &[f64], indices: &[usize]) -> (f64, f64) {
    indices
        .iter()
        .fold((0.0, 0.0), |(s, q), &i| (s + y[i], q + y[i] * y[i]))
}

/// Summed squared error around the mean.
fn sse(sum: f64, sum_sq: f64, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    (sum_sq - sum * sum / n as f64).max(0.0)
}

/// CART regression tree
#[derive(Debug, Clone)]
pub struct RegressionTree {
    root: Option<Node>,
    importances: Vec<f64>,
}

impl RegressionTree {
    /// Fit on the rows at `indices` (repeats allowed).
    fn fit(
        x: &FeatureMatrix,
        y: &[f64],
        indices: Vec<usize>,
        config: &ForestConfig,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut tree = Self {
            root: None,
            importances: vec![0.0; x.n_features()],
        };
        let root = tree.build(x, y, indices, 0, config, rng);
        tree.root = Some(root);

        let total: f64 = tree.importances.iter().sum();
        if total > 0.0 {
            tree.importances.iter_mut().for_each(|imp| *imp /= total);
        }
        tree
    }

    fn build(
        &mut self,
        x: &FeatureMatrix,
        y: &[f64],
        indices: Vec<usize>,
        depth: usize,
        config: &ForestConfig,
        rng: &mut ChaCha8Rng,
    ) -> Node {
        let n = indices.len();
        let (sum, sum_sq) = moments(y, &indices);
        let mean = if n > 0 { sum / n as f64 } else { 0.0 };

        let depth_reached = config.max_depth.is_some_and(|max| depth >= max);
        if depth_reached
            || n < config.min_samples_split
            || n < 2 * config.min_samples_leaf
            || sse(sum, sum_sq, n) < 1e-12
        {
            return Node::Leaf { value: mean };
        }

        match Self::best_split(x, y, &indices, config, rng) {
            Some(split) => {
                self.importances[split.feature] += split.gain;
                let left = self.build(x, y, split.left, depth + 1, config, rng);
                let right = self.build(x, y, split.right, depth + 1, config, rng);
                Node::Split {
                    feature: split.feature,
                    threshold: split.threshold,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            None => Node::Leaf { value: mean },
        }
    }

    /// Scan sorted values of each candidate feature, keeping running sums so
    /// every threshold is scored in constant time.
    fn best_split(
        x: &FeatureMatrix,
        y: &[f64],
        indices: &[usize],
        config: &ForestConfig,
        rng: &mut ChaCha8Rng,
    ) -> Option<Split> {
        let n = indices.len();
        let n_features = x.n_features();
        let max_features = config.max_features.unwrap_or(n_features).clamp(1, n_features.max(1));

        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(rng);
        features.truncate(max_features);

        let (sum, sum_sq) = moments(y, indices);
        let parent = sse(sum, sum_sq, n);
        let min_leaf = config.min_samples_leaf;

        let mut best: Option<(usize, f64, f64)> = None;
        let mut order = indices.to_vec();

        for &feature in &features {
            order.sort_by(|&a, &b| {
                x.rows[a][feature]
                    .partial_cmp(&x.rows[b][feature])
                    .unwrap_or(Ordering::Equal)
            });

            let (mut left_sum, mut left_sq) = (0.0, 0.0);
            for k in 1..n {
                let prev = order[k - 1];
                left_sum += y[prev];
                left_sq += y[prev] * y[prev];

                let lo = x.rows[prev][feature];
                let hi = x.rows[order[k]][feature];
                if hi <= lo || k < min_leaf || n - k < min_leaf {
                    continue;
                }

                let children = sse(left_sum, left_sq, k) + sse(sum - left_sum, sum_sq - left_sq, n - k);
                let gain = parent - children;
                if gain > best.map_or(1e-12, |(_, _, g)| g) {
                    best = Some((feature, (lo + hi) / 2.0, gain));
                }
            }
        }

        best.map(|(feature, threshold, gain)| {
            let (left, right): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| x.rows[i][feature] <= threshold);
            Split {
                feature,
                threshold,
                gain,
                left,
                right,
            }
        })
    }

    pub fn predict_one(&self, features: &[f64]) -> f64 {
        let mut node = match &self.root {
            Some(node) => node,
            None => return 0.0,
        };
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold {
                        &**left
                    } else {
                        &**right
                    };
                }
            }
        }
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }
}

/// Random Forest model
#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            feature_importances: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Predict for a single sample
    pub fn predict_one(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.predict_one(features)).sum::<f64>() / self.trees.len() as f64
    }

    /// Predict for multiple samples
    pub fn predict(&self, x: &FeatureMatrix) -> Vec<f64> {
        x.rows.par_iter().map(|row| self.predict_one(row)).collect()
    }
}

impl ImportanceModel for RandomForest {
    fn fit(&mut self, x: &FeatureMatrix, y: &TargetVector) {
        let n_samples = x.n_samples().min(y.len());
        self.feature_importances = vec![0.0; x.n_features()];
        if n_samples == 0 {
            self.trees.clear();
            return;
        }
        let config = &self.config;

        // Per-tree seeds keep the result independent of thread scheduling.
        let trees: Vec<RegressionTree> = (0..config.n_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(i as u64));
                let indices: Vec<usize> = if config.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };
                RegressionTree::fit(x, &y.values, indices, config, &mut rng)
            })
            .collect();
        self.trees = trees;

        for tree in &self.trees {
            for (acc, imp) in self.feature_importances.iter_mut().zip(tree.feature_importances()) {
                *acc += imp;
            }
        }
        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            self.feature_importances.iter_mut().for_each(|imp| *imp /= sum);
        }
    }

    fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}
