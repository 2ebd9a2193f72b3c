//! CART Decision Tree
//!
//! Gini-impurity classification tree grown on (possibly bootstrapped)
//! row indices. At each node a random subset of `max_features` features
//! is evaluated; if none of them yields a valid split, the remaining
//! features are tried before the node becomes a leaf.

use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class distribution of the training rows that reached this leaf
    Leaf { distribution: Vec<f64> },
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Classification tree, nodes stored in a flat arena (root at 0)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    n_classes: usize,
    max_features: usize,
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Grow a tree on `indices` (rows of `data`), labels are class indices
    pub fn grow(
        data: ArrayView2<'_, f64>,
        labels: &[usize],
        indices: &[usize],
        n_classes: usize,
        max_features: usize,
        rng: &mut StdRng,
    ) -> Self {
        let mut tree = Self {
            n_classes,
            max_features: max_features.clamp(1, data.ncols().max(1)),
            nodes: Vec::new(),
        };
        tree.grow_node(data, labels, indices, rng);
        tree
    }

    fn grow_node(
        &mut self,
        data: ArrayView2<'_, f64>,
        labels: &[usize],
        indices: &[usize],
        rng: &mut StdRng,
    ) -> usize {
        let mut counts = vec![0usize; self.n_classes];
        for &i in indices {
            counts[labels[i]] += 1;
        }

        let id = self.nodes.len();
        let total = indices.len().max(1) as f64;
        self.nodes.push(TreeNode::Leaf {
            distribution: counts.iter().map(|&c| c as f64 / total).collect(),
        });

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        if pure || indices.len() < 2 {
            return id;
        }

        let Some(split) = self.best_split(data, labels, indices, &counts, rng) else {
            return id;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| data[[i, split.feature]] <= split.threshold);

        let left_id = self.grow_node(data, labels, &left, rng);
        let right_id = self.grow_node(data, labels, &right, rng);

        self.nodes[id] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: left_id,
            right: right_id,
        };
        id
    }

    fn best_split(
        &self,
        data: ArrayView2<'_, f64>,
        labels: &[usize],
        indices: &[usize],
        counts: &[usize],
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..data.ncols()).collect();
        features.shuffle(rng);

        let mut best: Option<SplitCandidate> = None;
        for (visited, &feature) in features.iter().enumerate() {
            if visited >= self.max_features && best.is_some() {
                break;
            }
            if let Some(candidate) = self.best_threshold(data, labels, indices, counts, feature) {
                if best.map_or(true, |b| candidate.impurity < b.impurity) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    /// Sweep sorted values of one feature, midpoints between distinct values
    fn best_threshold(
        &self,
        data: ArrayView2<'_, f64>,
        labels: &[usize],
        indices: &[usize],
        counts: &[usize],
        feature: usize,
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let mut sorted = indices.to_vec();
        sorted.sort_by(|&a, &b| data[[a, feature]].total_cmp(&data[[b, feature]]));

        let mut left_counts = vec![0usize; self.n_classes];
        let mut right_counts = counts.to_vec();
        let mut best: Option<SplitCandidate> = None;

        for pos in 0..n - 1 {
            let class = labels[sorted[pos]];
            left_counts[class] += 1;
            right_counts[class] -= 1;

            let value = data[[sorted[pos], feature]];
            let next = data[[sorted[pos + 1], feature]];
            if next <= value {
                continue;
            }

            let n_left = pos + 1;
            let n_right = n - n_left;
            let impurity = (n_left as f64 * gini(&left_counts, n_left)
                + n_right as f64 * gini(&right_counts, n_right))
                / n as f64;

            if best.map_or(true, |b| impurity < b.impurity) {
                let mut threshold = value + (next - value) / 2.0;
                if threshold >= next {
                    threshold = value;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    impurity,
                });
            }
        }
        best
    }

    /// Leaf class distribution for one row
    pub fn distribution(&self, row: ArrayView1<'_, f64>) -> &[f64] {
        let mut node = 0;
        loop {
            match &self.nodes[node] {
                TreeNode::Leaf { distribution } => return distribution,
                TreeNode::Split { feature, threshold, left, right } => {
                    node = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[4, 0], 4), 0.0);
        assert!((gini(&[2, 2], 4) - 0.5).abs() < 1e-12);
        assert_eq!(gini(&[0, 0], 0), 0.0);
    }

    #[test]
    fn test_separates_two_classes() {
        let data = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0], [10.0, 5.0], [11.0, 5.0], [12.0, 5.0]];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let indices: Vec<usize> = (0..6).collect();
        let mut rng = StdRng::seed_from_u64(1);

        // max_features = 1 may draw the constant column first, the search must go on
        let tree = DecisionTree::grow(data.view(), &labels, &indices, 2, 1, &mut rng);
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.distribution(array![2.5, 5.0].view()), &[1.0, 0.0]);
        assert_eq!(tree.distribution(array![9.0, 5.0].view()), &[0.0, 1.0]);
    }

    #[test]
    fn test_pure_node_is_leaf() {
        let data = array![[1.0], [2.0]];
        let labels = vec![1, 1];
        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::grow(data.view(), &labels, &[0, 1], 2, 1, &mut rng);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.distribution(array![1.5].view()), &[0.0, 1.0]);
    }

    #[test]
    fn test_inseparable_rows_give_mixed_leaf() {
        let data = array![[1.0], [1.0]];
        let labels = vec![0, 1];
        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::grow(data.view(), &labels, &[0, 1], 2, 1, &mut rng);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.distribution(array![1.0].view()), &[0.5, 0.5]);
    }
}
