//! Supervised baselines for stage-direction classification.
//!
//! The rule-based classifier is compared against four model families
//! trained on [`FeatureMatrix`] rows: logistic regression, a decision tree,
//! a random forest and a linear SVC. Each family's hyper-parameters are chosen by a
//! cross-validated grid search ([`selection`]) and the winners are scored on
//! the validation and test splits ([`report`]).

pub mod forest;
pub mod logistic;
pub mod metrics;
pub mod report;
pub mod selection;
pub mod svm;
pub mod tree;

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::FeatureMatrix;

pub use self::forest::RandomForest;
pub use self::logistic::LogisticRegression;
pub use self::metrics::{accuracy, f1_score, precision, recall};
pub use self::report::{ModelReport, ModelReportRow, RuleBasedScore, models_for_type, rule_based_report};
pub use self::selection::{
    GridSearchResult, ModelFamily, ModelSpec, ParamGrid, cross_val_score, grid_search_cv,
    stratified_folds,
};
pub use self::svm::LinearSvc;
pub use self::tree::{Criterion, DecisionTree};

/// Seed used for every random forest unless configured otherwise.
pub const DEFAULT_SEED: u64 = 1968;

/// Machine learning error types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MLError {
    #[error("Model not trained: {message}")]
    ModelNotTrained { message: String },

    #[error("Invalid feature vector: {message}")]
    InvalidFeatureVector { message: String },

    #[error("Training data insufficient: need at least {min_samples} samples, got {actual}")]
    InsufficientTrainingData { min_samples: usize, actual: usize },

    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },
}

impl MLError {
    pub fn not_trained<S: Into<String>>(message: S) -> Self {
        MLError::ModelNotTrained {
            message: message.into(),
        }
    }

    pub fn invalid_features<S: Into<String>>(message: S) -> Self {
        MLError::InvalidFeatureVector {
            message: message.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(message: S) -> Self {
        MLError::InvalidParameter {
            message: message.into(),
        }
    }
}

/// A model mapping feature rows to 0/1 labels.
pub trait BinaryClassifier: Send + Sync + Debug {
    /// Train on `x` with one 0/1 label per row.
    fn fit(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<()>;

    /// Predict one label per row of `x`.
    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<u8>>;

    /// Human readable model name.
    fn name(&self) -> &str;

    fn is_trained(&self) -> bool;
}

/// Settings for grid search and model fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelFittingConfig {
    /// Number of stratified cross-validation folds.
    pub folds: usize,
    /// Candidates per hyper-parameter axis. `None` searches the full grid.
    pub grid_size: Option<usize>,
    /// Families to fit, in report order.
    pub families: Vec<ModelFamily>,
    /// Gradient descent iterations for the linear models.
    pub max_iter: usize,
    /// Gradient descent step for the linear models.
    pub learning_rate: f64,
    /// Smallest node a tree may split.
    pub min_samples_split: usize,
    /// Seed of the random forests.
    pub seed: u64,
}

impl Default for ModelFittingConfig {
    fn default() -> Self {
        Self {
            folds: 5,
            grid_size: None,
            families: ModelFamily::all().to_vec(),
            max_iter: 1000,
            learning_rate: 0.1,
            min_samples_split: 2,
            seed: DEFAULT_SEED,
        }
    }
}

impl ModelFittingConfig {
    /// The hyper-parameter grid this configuration searches.
    pub fn grid(&self) -> ParamGrid {
        match self.grid_size {
            Some(size) => ParamGrid::with_size(size),
            None => ParamGrid::default_grid(),
        }
    }
}

/// Check that `x` and `y` form a usable training set.
pub(crate) fn check_training_data(x: &FeatureMatrix, y: &[u8]) -> Result<()> {
    if x.rows() != y.len() {
        return Err(MLError::invalid_features(format!(
            "{} feature rows but {} labels",
            x.rows(),
            y.len()
        ))
        .into());
    }
    if y.is_empty() {
        return Err(MLError::InsufficientTrainingData {
            min_samples: 1,
            actual: 0,
        }
        .into());
    }
    if let Some(label) = y.iter().find(|&&label| label > 1) {
        return Err(MLError::invalid_features(format!("label {label} is not binary")).into());
    }
    Ok(())
}

/// Check that `x` has the width a model was trained on.
pub(crate) fn check_width(x: &FeatureMatrix, expected: usize) -> Result<()> {
    if x.rows() > 0 && x.cols() != expected {
        return Err(MLError::invalid_features(format!(
            "expected {expected} features, got {}",
            x.cols()
        ))
        .into());
    }
    Ok(())
}
