//! Binary CART decision tree.

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::FeatureMatrix;
use crate::ml::{BinaryClassifier, MLError, check_training_data, check_width};

/// Split quality measure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    #[default]
    Gini,
    Entropy,
}

impl Criterion {
    /// Impurity of a node holding `positives` of `total` samples.
    pub fn impurity(self, positives: usize, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let p = positives as f64 / total as f64;
        let q = 1.0 - p;
        match self {
            Criterion::Gini => 1.0 - p * p - q * q,
            Criterion::Entropy => -[p, q]
                .iter()
                .filter(|&&share| share > 0.0)
                .map(|share| share * share.log2())
                .sum::<f64>(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Criterion::Gini => "gini",
            Criterion::Entropy => "entropy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        class: u8,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict(&self, row: &[f64]) -> u8 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { class } => return *class,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

struct Split {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// Decision tree whose leaves predict the majority class of their samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    criterion: Criterion,
    /// `None` grows the tree until leaves are pure.
    max_depth: Option<usize>,
    min_samples_split: usize,
    /// Features drawn at each split; `None` considers all of them.
    max_features: Option<usize>,
    n_features: usize,
    root: Option<Box<TreeNode>>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new(Criterion::Gini, None)
    }
}

impl DecisionTree {
    pub fn new(criterion: Criterion, max_depth: Option<usize>) -> Self {
        Self {
            criterion,
            max_depth,
            min_samples_split: 2,
            max_features: None,
            n_features: 0,
            root: None,
        }
    }

    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Depth of the fitted tree, 0 for a single leaf.
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.depth())
    }

    /// Fit on the rows of `x` listed in `indices`, drawing the features of
    /// each split with `rng` when `max_features` is set.
    pub(crate) fn fit_rows(
        &mut self,
        x: &FeatureMatrix,
        y: &[u8],
        indices: &[usize],
        rng: Option<&mut StdRng>,
    ) -> Result<()> {
        if self.max_depth == Some(0) {
            return Err(MLError::invalid_parameter("max_depth must be at least 1").into());
        }
        if indices.is_empty() {
            return Err(MLError::InsufficientTrainingData {
                min_samples: 1,
                actual: 0,
            }
            .into());
        }

        let mut builder = Builder {
            tree: self,
            x,
            y,
            rng,
        };
        let root = builder.build(indices.to_vec(), 0);

        self.n_features = x.cols();
        self.root = Some(Box::new(root));
        Ok(())
    }
}

struct Builder<'a> {
    tree: &'a DecisionTree,
    x: &'a FeatureMatrix,
    y: &'a [u8],
    rng: Option<&'a mut StdRng>,
}

impl Builder<'_> {
    fn build(&mut self, indices: Vec<usize>, depth: usize) -> TreeNode {
        let positives = indices.iter().filter(|&&i| self.y[i] == 1).count();
        let total = indices.len();
        // Ties go to class 0.
        let leaf = TreeNode::Leaf {
            class: u8::from(positives * 2 > total),
        };

        let depth_reached = self.tree.max_depth.is_some_and(|max| depth >= max);
        if depth_reached
            || total < self.tree.min_samples_split
            || positives == 0
            || positives == total
        {
            return leaf;
        }

        // Constant features leave nothing to split on.
        let Some(split) = self.best_split(&indices, positives) else {
            return leaf;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.x.get(i, split.feature) <= split.threshold);

        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.build(left, depth + 1)),
            right: Box::new(self.build(right, depth + 1)),
        }
    }

    fn candidate_features(&mut self) -> Vec<usize> {
        let n_features = self.x.cols();
        match (self.tree.max_features, self.rng.as_deref_mut()) {
            (Some(k), Some(rng)) if k < n_features => {
                let mut features = rand::seq::index::sample(rng, n_features, k).into_vec();
                features.sort_unstable();
                features
            }
            _ => (0..n_features).collect(),
        }
    }

    /// Lowest weighted child impurity over the candidate features. Earlier
    /// features win ties.
    fn best_split(&mut self, indices: &[usize], positives: usize) -> Option<Split> {
        let total = indices.len();
        let criterion = self.tree.criterion;
        let mut best: Option<Split> = None;
        let mut column: Vec<(f64, u8)> = Vec::with_capacity(total);

        for feature in self.candidate_features() {
            column.clear();
            column.extend(indices.iter().map(|&i| (self.x.get(i, feature), self.y[i])));
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_pos = 0;
            for split_at in 1..total {
                left_pos += usize::from(column[split_at - 1].1 == 1);
                let (lower, upper) = (column[split_at - 1].0, column[split_at].0);
                if lower == upper {
                    continue;
                }

                let right_total = total - split_at;
                let impurity = (split_at as f64 * criterion.impurity(left_pos, split_at)
                    + right_total as f64 * criterion.impurity(positives - left_pos, right_total))
                    / total as f64;

                if best.as_ref().is_none_or(|b| impurity < b.impurity) {
                    best = Some(Split {
                        feature,
                        threshold: lower + (upper - lower) / 2.0,
                        impurity,
                    });
                }
            }
        }

        best
    }
}

impl BinaryClassifier for DecisionTree {
    fn fit(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<()> {
        check_training_data(x, y)?;
        let indices: Vec<usize> = (0..x.rows()).collect();
        self.fit_rows(x, y, &indices, None)
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<u8>> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| MLError::not_trained(self.name()))?;
        check_width(x, self.n_features)?;
        Ok(x.iter_rows().map(|row| root.predict(row)).collect())
    }

    fn name(&self) -> &str {
        "Decision Tree"
    }

    fn is_trained(&self) -> bool {
        self.root.is_some()
    }
}
