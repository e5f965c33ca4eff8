//! Linear support vector classifier.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::FeatureMatrix;
use crate::ml::{BinaryClassifier, MLError, check_training_data, check_width};

/// Soft-margin linear SVM fitted by batch subgradient descent.
///
/// Minimises the mean hinge loss plus `||w||² / (2 · c · n)`, the same
/// scaling [`LogisticRegression`](crate::ml::LogisticRegression) uses for
/// its penalty. Labels 0/1 are mapped to -1/+1 for training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvc {
    c: f64,
    max_iter: usize,
    learning_rate: f64,
    weights: Vec<f64>,
    bias: f64,
    trained: bool,
}

impl Default for LinearSvc {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl LinearSvc {
    pub fn new(c: f64) -> Self {
        Self {
            c,
            max_iter: 1000,
            learning_rate: 0.1,
            weights: Vec::new(),
            bias: 0.0,
            trained: false,
        }
    }

    pub fn with_params(c: f64, max_iter: usize, learning_rate: f64) -> Self {
        Self {
            max_iter,
            learning_rate,
            ..Self::new(c)
        }
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Signed distance-like score `w·x + b` for every row.
    pub fn decision_function(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        if !self.trained {
            return Err(MLError::not_trained(self.name()).into());
        }
        check_width(x, self.weights.len())?;
        Ok(x.iter_rows().map(|row| self.decision(row)).collect())
    }

    fn decision(&self, row: &[f64]) -> f64 {
        self.bias
            + row
                .iter()
                .zip(&self.weights)
                .map(|(value, weight)| value * weight)
                .sum::<f64>()
    }

    fn validate_params(&self) -> Result<()> {
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(MLError::invalid_parameter(format!("C must be positive, got {}", self.c)).into());
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(MLError::invalid_parameter(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            ))
            .into());
        }
        Ok(())
    }
}

impl BinaryClassifier for LinearSvc {
    fn fit(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<()> {
        self.validate_params()?;
        check_training_data(x, y)?;

        let n = x.rows() as f64;
        let penalty = 1.0 / (self.c * n);
        let mut weights = vec![0.0; x.cols()];
        let mut bias = 0.0;
        let mut grad_w = vec![0.0; x.cols()];

        let mut iterations = 0;
        let mut violations = 0;
        while iterations < self.max_iter {
            iterations += 1;
            grad_w.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_b = 0.0;
            violations = 0;

            for (row, &label) in x.iter_rows().zip(y) {
                let sign = if label == 1 { 1.0 } else { -1.0 };
                let z = bias + row.iter().zip(&weights).map(|(v, w)| v * w).sum::<f64>();
                if sign * z < 1.0 {
                    violations += 1;
                    for (g, value) in grad_w.iter_mut().zip(row) {
                        *g -= sign * value;
                    }
                    grad_b -= sign;
                }
            }

            // Step size decays so the subgradient iterates settle.
            let step = self.learning_rate / (iterations as f64).sqrt();
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= step * (*g / n + penalty * *w);
            }
            bias -= step * grad_b / n;
        }
        debug!(
            "linear SVC C={} ran {iterations} iterations, {violations} margin violations in the last",
            self.c
        );

        self.weights = weights;
        self.bias = bias;
        self.trained = true;
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<u8>> {
        Ok(self
            .decision_function(x)?
            .into_iter()
            .map(|z| u8::from(z > 0.0))
            .collect())
    }

    fn name(&self) -> &str {
        "SVC"
    }

    fn is_trained(&self) -> bool {
        self.trained
    }
}
