//! Random forest of bootstrapped decision trees.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::FeatureMatrix;
use crate::ml::tree::{Criterion, DecisionTree};
use crate::ml::{BinaryClassifier, DEFAULT_SEED, MLError, check_training_data, check_width};

/// Majority vote over `n_estimators` trees.
///
/// Every tree sees a bootstrap sample of the rows and considers
/// `sqrt(n_features)` randomly drawn features at each split. Tree `i` draws
/// from `StdRng` seeded with `seed + i`, so fitting is reproducible and
/// independent of the thread count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    n_estimators: usize,
    max_depth: Option<usize>,
    criterion: Criterion,
    min_samples_split: usize,
    seed: u64,
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForest {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators,
            max_depth: None,
            criterion: Criterion::Gini,
            min_samples_split: 2,
            seed: DEFAULT_SEED,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    fn fit_tree(&self, x: &FeatureMatrix, y: &[u8], index: usize) -> Result<DecisionTree> {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(index as u64));
        let n = x.rows();
        let bootstrap: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
        let max_features = ((x.cols() as f64).sqrt() as usize).max(1);

        let mut tree = DecisionTree::new(self.criterion, self.max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_max_features(Some(max_features));
        tree.fit_rows(x, y, &bootstrap, Some(&mut rng))?;
        Ok(tree)
    }
}

impl BinaryClassifier for RandomForest {
    fn fit(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(MLError::invalid_parameter("n_estimators must be at least 1").into());
        }
        check_training_data(x, y)?;

        let trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|index| self.fit_tree(x, y, index))
            .collect::<Result<Vec<_>>>()?;
        debug!("random forest fitted {} trees", trees.len());

        self.trees = trees;
        self.n_features = x.cols();
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<u8>> {
        if self.trees.is_empty() {
            return Err(MLError::not_trained(self.name()).into());
        }
        check_width(x, self.n_features)?;

        let mut votes = vec![0usize; x.rows()];
        for tree in &self.trees {
            for (count, label) in votes.iter_mut().zip(tree.predict(x)?) {
                *count += usize::from(label);
            }
        }
        // Ties go to class 0.
        Ok(votes
            .into_iter()
            .map(|count| u8::from(count * 2 > self.trees.len()))
            .collect())
    }

    fn name(&self) -> &str {
        "Random Forest"
    }

    fn is_trained(&self) -> bool {
        !self.trees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> (FeatureMatrix, Vec<u8>) {
        let mut rng = StdRng::seed_from_u64(7);
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..60 {
            let label = (i % 2) as u8;
            let center = if label == 1 { 2.0 } else { -2.0 };
            rows.push(vec![
                center + rng.random_range(-1.0..1.0),
                center + rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
            ]);
            labels.push(label);
        }
        (FeatureMatrix::from_rows(rows).unwrap(), labels)
    }

    #[test]
    fn test_fits_blobs() {
        let (x, y) = blobs();
        let mut forest = RandomForest::new(15);
        forest.fit(&x, &y).unwrap();
        assert_eq!(forest.trees().len(), 15);

        let predicted = forest.predict(&x).unwrap();
        let correct = predicted.iter().zip(&y).filter(|(p, t)| p == t).count();
        assert!(correct >= 57, "only {correct} of 60 correct");
    }

    #[test]
    fn test_same_seed_same_model() {
        let (x, y) = blobs();
        let mut a = RandomForest::new(5).with_seed(3);
        let mut b = RandomForest::new(5).with_seed(3);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        let sample = FeatureMatrix::from_rows(vec![vec![0.1, -0.1, 0.5, 0.5]]).unwrap();
        assert_eq!(a.predict(&sample).unwrap(), b.predict(&sample).unwrap());
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_zero_estimators_rejected() {
        let (x, y) = blobs();
        assert!(RandomForest::new(0).fit(&x, &y).is_err());
    }

    #[test]
    fn test_untrained_predict() {
        let (x, _) = blobs();
        assert!(!RandomForest::default().is_trained());
        assert!(RandomForest::default().predict(&x).is_err());
    }
}
