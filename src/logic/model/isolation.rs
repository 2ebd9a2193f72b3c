//! Isolation Forest - Unsupervised Anomaly Scorer
//!
//! Random axis-aligned splits isolate outliers in fewer steps than
//! inliers. Score is `-2^(-E[h(x)] / c(psi))`, so values near -1 are
//! anomalous and values near -0.5 or above are normal.
//!
//! Trees are stored as flat node arenas so artifacts stay shallow JSON.

use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{check_input, AnomalyScorer, ModelError, ModelResult};
use crate::constants::DEFAULT_SEED;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Average path length of an unsuccessful BST search over `n` points
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

// ============================================================================
// TREE
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
enum IsolationNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        size: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IsolationTree {
    nodes: Vec<IsolationNode>,
}

impl IsolationTree {
    fn build(data: ArrayView2<'_, f64>, indices: &[usize], height_limit: usize, rng: &mut StdRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(data, indices, 0, height_limit, rng);
        tree
    }

    fn grow(
        &mut self,
        data: ArrayView2<'_, f64>,
        indices: &[usize],
        depth: usize,
        height_limit: usize,
        rng: &mut StdRng,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(IsolationNode::Leaf { size: indices.len() });

        if depth >= height_limit || indices.len() <= 1 {
            return id;
        }

        // only features that still vary inside this node can split it
        let candidates: Vec<(usize, f64, f64)> = (0..data.ncols())
            .filter_map(|feature| {
                let (min, max) = indices.iter().fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(lo, hi), &i| (lo.min(data[[i, feature]]), hi.max(data[[i, feature]])),
                );
                (max > min).then_some((feature, min, max))
            })
            .collect();

        if candidates.is_empty() {
            return id;
        }

        let (feature, min, max) = candidates[rng.gen_range(0..candidates.len())];
        let threshold = rng.gen_range(min..max);

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| data[[i, feature]] <= threshold);

        let left_id = self.grow(data, &left, depth + 1, height_limit, rng);
        let right_id = self.grow(data, &right, depth + 1, height_limit, rng);

        self.nodes[id] = IsolationNode::Split {
            feature,
            threshold,
            left: left_id,
            right: right_id,
        };
        id
    }

    fn path_length(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut node = 0;
        let mut depth = 0.0;

        loop {
            match &self.nodes[node] {
                IsolationNode::Leaf { size } => return depth + average_path_length(*size),
                IsolationNode::Split { feature, threshold, left, right } => {
                    node = if row[*feature] <= *threshold { *left } else { *right };
                    depth += 1.0;
                }
            }
        }
    }
}

// ============================================================================
// FOREST
// ============================================================================

/// Isolation forest over the feature matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    n_estimators: usize,
    max_samples: usize,
    seed: u64,
    n_features: usize,
    /// Sub-sample size actually used (psi)
    sample_size: usize,
    trees: Vec<IsolationTree>,
}

impl IsolationForest {
    pub fn new() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            seed: DEFAULT_SEED,
            n_features: 0,
            sample_size: 0,
            trees: Vec::new(),
        }
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n.max(1);
        self
    }

    pub fn with_max_samples(mut self, n: usize) -> Self {
        self.max_samples = n.max(2);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self::new()
    }
}

impl AnomalyScorer for IsolationForest {
    fn fit(&mut self, data: ArrayView2<'_, f64>) -> ModelResult<()> {
        let n = data.nrows();
        if n < 2 {
            return Err(ModelError::InsufficientData { required: 2, got: n });
        }
        if data.ncols() == 0 {
            return Err(ModelError::InvalidInput("no feature columns".to_string()));
        }
        check_input(data, data.ncols())?;

        let psi = self.max_samples.min(n);
        let height_limit = (psi as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(self.seed);

        self.trees = (0..self.n_estimators)
            .map(|_| {
                let indices = sample(&mut rng, n, psi).into_vec();
                IsolationTree::build(data, &indices, height_limit, &mut rng)
            })
            .collect();
        self.n_features = data.ncols();
        self.sample_size = psi;

        log::debug!(
            "Isolation forest fitted: {} trees, psi={}, height limit={}",
            self.trees.len(),
            psi,
            height_limit
        );
        Ok(())
    }

    fn score(&self, data: ArrayView2<'_, f64>) -> ModelResult<Vec<f64>> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted);
        }
        check_input(data, self.n_features)?;

        let normalizer = average_path_length(self.sample_size);
        let n_trees = self.trees.len() as f64;

        Ok(data
            .rows()
            .into_iter()
            .map(|row| {
                let mean_depth = self.trees.iter().map(|t| t.path_length(row)).sum::<f64>() / n_trees;
                -(2f64.powf(-mean_depth / normalizer))
            })
            .collect())
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}
