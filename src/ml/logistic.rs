//! L2-regularised logistic regression fitted by batch gradient descent.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::FeatureMatrix;
use crate::ml::{BinaryClassifier, MLError, check_training_data, check_width};

/// Gradient norm below which training stops early.
const TOLERANCE: f64 = 1e-6;

/// Logistic regression with inverse regularisation strength `c`.
///
/// Minimises the mean log-loss plus `||w||² / (2 · c · n)`; the bias is not
/// penalised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    c: f64,
    max_iter: usize,
    learning_rate: f64,
    weights: Vec<f64>,
    bias: f64,
    trained: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl LogisticRegression {
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

    /// Probability of the positive class for every row.
    pub fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        if !self.trained {
            return Err(MLError::not_trained(self.name()).into());
        }
        check_width(x, self.weights.len())?;
        Ok(x.iter_rows().map(|row| sigmoid(self.decision(row))).collect())
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

impl BinaryClassifier for LogisticRegression {
    fn fit(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<()> {
        self.validate_params()?;
        check_training_data(x, y)?;

        let n = x.rows() as f64;
        let penalty = 1.0 / (self.c * n);
        let mut weights = vec![0.0; x.cols()];
        let mut bias = 0.0;
        let mut grad_w = vec![0.0; x.cols()];

        let mut iterations = 0;
        while iterations < self.max_iter {
            iterations += 1;
            grad_w.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_b = 0.0;

            for (row, &label) in x.iter_rows().zip(y) {
                let z = bias + row.iter().zip(&weights).map(|(v, w)| v * w).sum::<f64>();
                let error = sigmoid(z) - f64::from(label);
                for (g, value) in grad_w.iter_mut().zip(row) {
                    *g += error * value;
                }
                grad_b += error;
            }

            let mut max_grad = (grad_b / n).abs();
            for (g, w) in grad_w.iter_mut().zip(&weights) {
                *g = *g / n + penalty * w;
                max_grad = max_grad.max(g.abs());
            }

            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= self.learning_rate * g;
            }
            bias -= self.learning_rate * grad_b / n;

            if max_grad < TOLERANCE {
                break;
            }
        }
        debug!("logistic regression C={} stopped after {iterations} iterations", self.c);

        self.weights = weights;
        self.bias = bias;
        self.trained = true;
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<u8>> {
        if !self.trained {
            return Err(MLError::not_trained(self.name()).into());
        }
        check_width(x, self.weights.len())?;
        Ok(x
            .iter_rows()
            .map(|row| u8::from(self.decision(row) > 0.0))
            .collect())
    }

    fn name(&self) -> &str {
        "Logistic Regression"
    }

    fn is_trained(&self) -> bool {
        self.trained
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
