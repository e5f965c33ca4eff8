//! Hyper-parameter search by stratified cross-validation.

use std::fmt;

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::FeatureMatrix;
use crate::ml::forest::RandomForest;
use crate::ml::logistic::LogisticRegression;
use crate::ml::metrics::f1_score;
use crate::ml::svm::LinearSvc;
use crate::ml::tree::{Criterion, DecisionTree};
use crate::ml::{BinaryClassifier, MLError, ModelFittingConfig, check_training_data};

/// The supervised model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    LogisticRegression,
    DecisionTree,
    RandomForest,
    Svc,
}

impl ModelFamily {
    pub fn all() -> [ModelFamily; 4] {
        [
            ModelFamily::LogisticRegression,
            ModelFamily::DecisionTree,
            ModelFamily::RandomForest,
            ModelFamily::Svc,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            ModelFamily::LogisticRegression => "Logistic Regression",
            ModelFamily::DecisionTree => "Decision Tree",
            ModelFamily::RandomForest => "Random Forest",
            ModelFamily::Svc => "SVC",
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One concrete hyper-parameter setting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelSpec {
    LogisticRegression { c: f64 },
    DecisionTree { criterion: Criterion, max_depth: usize },
    RandomForest { n_estimators: usize },
    Svc { c: f64 },
}

impl ModelSpec {
    pub fn family(&self) -> ModelFamily {
        match self {
            ModelSpec::LogisticRegression { .. } => ModelFamily::LogisticRegression,
            ModelSpec::DecisionTree { .. } => ModelFamily::DecisionTree,
            ModelSpec::RandomForest { .. } => ModelFamily::RandomForest,
            ModelSpec::Svc { .. } => ModelFamily::Svc,
        }
    }

    /// An untrained model with these hyper-parameters.
    pub fn build(&self, config: &ModelFittingConfig) -> Box<dyn BinaryClassifier> {
        match *self {
            ModelSpec::LogisticRegression { c } => Box::new(LogisticRegression::with_params(
                c,
                config.max_iter,
                config.learning_rate,
            )),
            ModelSpec::DecisionTree {
                criterion,
                max_depth,
            } => Box::new(
                DecisionTree::new(criterion, Some(max_depth))
                    .with_min_samples_split(config.min_samples_split),
            ),
            ModelSpec::RandomForest { n_estimators } => Box::new(
                RandomForest::new(n_estimators)
                    .with_seed(config.seed)
                    .with_min_samples_split(config.min_samples_split),
            ),
            ModelSpec::Svc { c } => Box::new(LinearSvc::with_params(
                c,
                config.max_iter,
                config.learning_rate,
            )),
        }
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSpec::LogisticRegression { c } => write!(f, "LogisticRegression(C={c:.4})"),
            ModelSpec::DecisionTree {
                criterion,
                max_depth,
            } => write!(
                f,
                "DecisionTree(criterion={}, max_depth={max_depth})",
                criterion.as_str()
            ),
            ModelSpec::RandomForest { n_estimators } => {
                write!(f, "RandomForest(n_estimators={n_estimators})")
            }
            ModelSpec::Svc { c } => write!(f, "SVC(C={c:.4})"),
        }
    }
}

/// Candidate values for every hyper-parameter axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub logistic_c: Vec<f64>,
    pub tree_criteria: Vec<Criterion>,
    pub tree_depths: Vec<usize>,
    pub forest_estimators: Vec<usize>,
    pub svc_c: Vec<f64>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self::default_grid()
    }
}

impl ParamGrid {
    /// C in `linspace(0.1, 100, 100)` for both linear models, tree depths
    /// `1..100` with both criteria, forests of `1..=100` trees.
    pub fn default_grid() -> Self {
        Self::with_size(100)
    }

    /// The default grid with `size` points per axis.
    pub fn with_size(size: usize) -> Self {
        Self {
            logistic_c: linspace(0.1, 100.0, size),
            tree_criteria: vec![Criterion::Gini, Criterion::Entropy],
            tree_depths: (1..size.max(2)).collect(),
            forest_estimators: (1..=size.max(1)).collect(),
            svc_c: linspace(0.1, 100.0, size),
        }
    }

    /// Every candidate of `family`, in search order.
    pub fn candidates(&self, family: ModelFamily) -> Vec<ModelSpec> {
        match family {
            ModelFamily::LogisticRegression => self
                .logistic_c
                .iter()
                .map(|&c| ModelSpec::LogisticRegression { c })
                .collect(),
            ModelFamily::DecisionTree => self
                .tree_criteria
                .iter()
                .flat_map(|&criterion| {
                    self.tree_depths
                        .iter()
                        .map(move |&max_depth| ModelSpec::DecisionTree {
                            criterion,
                            max_depth,
                        })
                })
                .collect(),
            ModelFamily::RandomForest => self
                .forest_estimators
                .iter()
                .map(|&n_estimators| ModelSpec::RandomForest { n_estimators })
                .collect(),
            ModelFamily::Svc => self.svc_c.iter().map(|&c| ModelSpec::Svc { c }).collect(),
        }
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Test indices of `k` stratified folds, without shuffling.
///
/// The indices of each class, in input order, are cut into `k` contiguous
/// chunks whose sizes differ by at most one (larger chunks first). Fold `i`
/// is the union of chunk `i` of every class, sorted.
pub fn stratified_folds(y: &[u8], k: usize) -> Result<Vec<Vec<usize>>> {
    if k < 2 {
        return Err(MLError::invalid_parameter(format!("need at least 2 folds, got {k}")).into());
    }

    let mut folds = vec![Vec::new(); k];
    for class in [0u8, 1] {
        let members: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
        if members.is_empty() {
            continue;
        }
        if members.len() < k {
            return Err(MLError::invalid_parameter(format!(
                "cannot make {k} folds: class {class} has only {} samples",
                members.len()
            ))
            .into());
        }

        let base = members.len() / k;
        let extra = members.len() % k;
        let mut start = 0;
        for (fold, test) in folds.iter_mut().enumerate() {
            let size = base + usize::from(fold < extra);
            test.extend_from_slice(&members[start..start + size]);
            start += size;
        }
    }

    for fold in &mut folds {
        fold.sort_unstable();
    }
    Ok(folds)
}

/// Every index in `0..n` not listed in `test` (which must be sorted).
fn complement(n: usize, test: &[usize]) -> Vec<usize> {
    (0..n).filter(|i| test.binary_search(i).is_err()).collect()
}

/// Mean F1 of `spec` over the given test folds.
pub fn cross_val_score(
    spec: &ModelSpec,
    x: &FeatureMatrix,
    y: &[u8],
    folds: &[Vec<usize>],
    config: &ModelFittingConfig,
) -> Result<f64> {
    if folds.is_empty() {
        return Err(MLError::invalid_parameter("no folds to score").into());
    }

    let mut total = 0.0;
    for test in folds {
        let train = complement(x.rows(), test);
        let train_y: Vec<u8> = train.iter().map(|&i| y[i]).collect();
        let test_y: Vec<u8> = test.iter().map(|&i| y[i]).collect();

        let mut model = spec.build(config);
        model.fit(&x.select_rows(&train), &train_y)?;
        let predicted = model.predict(&x.select_rows(test))?;
        total += f1_score(&test_y, &predicted);
    }

    let score = total / folds.len() as f64;
    debug!("{spec}: mean F1 {score:.4}");
    Ok(score)
}

/// Outcome of [`grid_search_cv`].
#[derive(Debug)]
pub struct GridSearchResult {
    pub best_spec: ModelSpec,
    pub best_score: f64,
    /// The best candidate refitted on the full training set.
    pub model: Box<dyn BinaryClassifier>,
}

/// Score every candidate by cross-validation and refit the best one.
///
/// Candidates are scored in parallel. When several reach the best score the
/// earliest in `candidates` wins.
pub fn grid_search_cv(
    candidates: &[ModelSpec],
    x: &FeatureMatrix,
    y: &[u8],
    config: &ModelFittingConfig,
) -> Result<GridSearchResult> {
    if candidates.is_empty() {
        return Err(MLError::invalid_parameter("empty parameter grid").into());
    }
    check_training_data(x, y)?;

    let folds = stratified_folds(y, config.folds)?;
    let scores = candidates
        .par_iter()
        .map(|spec| cross_val_score(spec, x, y, &folds, config))
        .collect::<Result<Vec<f64>>>()?;

    let (best_index, best_score) = scores
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, score)| {
            if score > best.1 { (i, score) } else { best }
        });
    let best_spec = candidates[best_index];
    info!(
        "Best {} of {} candidates: {best_spec} with F1 {best_score:.4}",
        best_spec.family(),
        candidates.len()
    );

    let mut model = best_spec.build(config);
    model.fit(x, y)?;

    Ok(GridSearchResult {
        best_spec,
        best_score,
        model,
    })
}
