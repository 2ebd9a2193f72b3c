//! Random Forest - Fault Classifier
//!
//! Bagged CART trees, `sqrt(n_features)` candidate features per split.
//! Trained on anomalous rows only, so its classes are fault kinds.

use std::collections::BTreeSet;

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::DecisionTree;
use super::{check_input, FaultClassifier, ModelError, ModelResult};
use crate::constants::DEFAULT_SEED;
use crate::logic::fault::FaultType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    n_estimators: usize,
    seed: u64,
    n_features: usize,
    classes: Vec<FaultType>,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new() -> Self {
        Self {
            n_estimators: 100,
            seed: DEFAULT_SEED,
            n_features: 0,
            classes: Vec::new(),
            trees: Vec::new(),
        }
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new()
    }
}

impl FaultClassifier for RandomForest {
    fn fit(&mut self, data: ArrayView2<'_, f64>, labels: &[FaultType]) -> ModelResult<()> {
        let n = data.nrows();
        if n != labels.len() {
            return Err(ModelError::InvalidInput(format!(
                "{} rows but {} labels",
                n,
                labels.len()
            )));
        }
        if n == 0 {
            return Err(ModelError::InsufficientData { required: 1, got: 0 });
        }
        if data.ncols() == 0 {
            return Err(ModelError::InvalidInput("no feature columns".to_string()));
        }
        check_input(data, data.ncols())?;

        if let Some(bad) = labels.iter().find(|l| !FaultType::FAULTS.contains(l)) {
            return Err(ModelError::InvalidInput(format!(
                "'{}' is not a trainable fault label",
                bad
            )));
        }

        let classes: Vec<FaultType> = labels.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let encoded: Vec<usize> = labels
            .iter()
            .map(|l| classes.iter().position(|c| c == l).unwrap_or(0))
            .collect();

        let max_features = ((data.ncols() as f64).sqrt() as usize).max(1);
        let mut rng = StdRng::seed_from_u64(self.seed);

        self.trees = (0..self.n_estimators)
            .map(|_| {
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::grow(data, &encoded, &bootstrap, classes.len(), max_features, &mut rng)
            })
            .collect();
        self.n_features = data.ncols();

        log::debug!(
            "Random forest fitted: {} trees on {} rows, classes {:?}",
            self.trees.len(),
            n,
            classes
        );
        self.classes = classes;
        Ok(())
    }

    fn predict(&self, data: ArrayView2<'_, f64>) -> ModelResult<Vec<FaultType>> {
        let proba = self.predict_proba(data)?;
        Ok(proba
            .iter()
            .map(|row| {
                // first class wins ties
                let best = row
                    .iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |acc, (i, &p)| if p > acc.1 { (i, p) } else { acc });
                self.classes[best.0]
            })
            .collect())
    }

    fn predict_proba(&self, data: ArrayView2<'_, f64>) -> ModelResult<Vec<Vec<f64>>> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted);
        }
        check_input(data, self.n_features)?;

        let n_trees = self.trees.len() as f64;
        Ok(data
            .rows()
            .into_iter()
            .map(|row| {
                let mut acc = vec![0.0; self.classes.len()];
                for tree in &self.trees {
                    for (slot, p) in acc.iter_mut().zip(tree.distribution(row)) {
                        *slot += p;
                    }
                }
                acc.iter_mut().for_each(|p| *p /= n_trees);
                acc
            })
            .collect())
    }

    fn classes(&self) -> &[FaultType] {
        &self.classes
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}
